//! Pure similarity math: cosine similarity, vector centroids, and
//! normalized-title comparison. No state, no I/O.

use sha2::{Digest, Sha256};

/// Cosine similarity between two vectors. Returns 0.0 for mismatched
/// lengths, empty vectors, or zero-norm inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Element-wise mean of a set of vectors. Empty input yields an empty vector.
pub fn centroid(vectors: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };
    let dim = first.len();
    let mut acc = vec![0.0f32; dim];
    for v in vectors {
        for (i, x) in v.iter().enumerate().take(dim) {
            acc[i] += x;
        }
    }
    let n = vectors.len() as f32;
    for x in &mut acc {
        *x /= n;
    }
    acc
}

/// Normalize a title for dedup comparison: lowercase, strip punctuation and
/// symbols, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity ratio between two titles after normalization, in [0, 1].
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let na = normalize_title(a);
    let nb = normalize_title(b);
    strsim::normalized_levenshtein(&na, &nb)
}

/// Deterministic dedup fingerprint of normalized title + source. Two fetches
/// of the same story from the same source always collide here.
pub fn article_fingerprint(title: &str, source: &str) -> String {
    let norm = normalize_title(title);
    let digest = Sha256::digest(format!("{norm}|{source}").as_bytes());
    hex::encode(digest)[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_is_symmetric_and_bounded() {
        let a = vec![0.3, -0.7, 0.2, 0.9];
        let b = vec![-0.1, 0.4, 0.8, 0.5];
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let a = vec![0.5, 0.5, 0.1];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_minus_one() {
        let a = vec![1.0, 2.0, -3.0];
        let b: Vec<f32> = a.iter().map(|x| -x).collect();
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn centroid_of_single_vector_is_that_vector() {
        let v = vec![vec![0.2f32, -0.4, 0.6]];
        assert_eq!(centroid(&v), v[0]);
    }

    #[test]
    fn centroid_averages_elementwise() {
        let vs = vec![vec![1.0f32, 0.0], vec![3.0, 2.0]];
        assert_eq!(centroid(&vs), vec![2.0, 1.0]);
    }

    #[test]
    fn centroid_of_empty_set_is_empty() {
        assert!(centroid(&[]).is_empty());
    }

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(
            normalize_title("Breaking: News Update!"),
            normalize_title("breaking - news update")
        );
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_title("  too   many   spaces  "), "too many spaces");
    }

    #[test]
    fn identical_titles_have_ratio_one() {
        assert!((title_similarity("Breaking News Today", "Breaking News Today") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn case_differences_do_not_matter() {
        assert!((title_similarity("BREAKING NEWS", "breaking news") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn similar_titles_score_high() {
        let sim = title_similarity(
            "Major earthquake strikes Pacific region",
            "Major earthquake strikes the Pacific region",
        );
        assert!(sim >= 0.85, "got {sim}");
    }

    #[test]
    fn unrelated_titles_score_low() {
        let sim = title_similarity(
            "Major earthquake strikes Pacific region",
            "Apple announces new AI features for iPhone",
        );
        assert!(sim < 0.4, "got {sim}");
    }

    #[test]
    fn fingerprint_is_case_insensitive_and_deterministic() {
        let a = article_fingerprint("COVID-19 Cases Rise in Europe", "Reuters");
        let b = article_fingerprint("covid-19 cases rise in europe", "Reuters");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn fingerprint_differs_by_source() {
        let a = article_fingerprint("Same headline", "Reuters");
        let b = article_fingerprint("Same headline", "AP");
        assert_ne!(a, b);
    }
}
