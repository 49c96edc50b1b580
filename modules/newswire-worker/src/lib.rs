pub mod jobs;

pub use jobs::{cluster_loop, ingest_loop, ingest_once};
