//! Search ranking over the in-memory store: relevance tiers, cluster
//! attachment, source-diversity capping, pagination, and caching.

use std::sync::Arc;

use chrono::Utc;

use newswire_common::ArticleDraft;
use newswire_engine::{ClusterEngine, NoopEmbedder, SearchRanker, SuggestionKind, TrendingScorer};
use newswire_store::{Cache, MemoryCache, MemoryStore, NewsStore, NoopCache};

fn draft(title: &str, source: &str, minutes_ago: i64) -> ArticleDraft {
    let mut draft = ArticleDraft::new(
        "newsapi",
        source.to_string(),
        title.to_string(),
        format!("https://example.com/{source}/{}", title.len()),
    );
    draft.published_at = Some(Utc::now() - chrono::Duration::minutes(minutes_ago));
    draft
}

async fn clustered_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .store_articles(vec![
            draft("Major earthquake strikes Pacific region", "Reuters", 10),
            draft("Major earthquake strikes the Pacific region", "AP", 8),
            draft("Major earthquake strikes Pacific region today", "BBC", 5),
            draft("Apple announces new AI features for iPhone", "The Verge", 3),
        ])
        .await
        .unwrap();

    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    let engine = ClusterEngine::new(store.clone(), cache, Arc::new(NoopEmbedder::new()));
    engine.run().await.unwrap();
    TrendingScorer::new(store.clone()).update_scores().await.unwrap();
    store
}

fn ranker(store: Arc<MemoryStore>) -> SearchRanker {
    SearchRanker::new(store, Arc::new(MemoryCache::new()))
}

#[tokio::test]
async fn relevant_results_rank_high_and_offtopic_ones_are_dropped() {
    let store = clustered_store().await;
    let ranker = ranker(store);

    let page = ranker.search("earthquake", None, None, 10, 0).await.unwrap();
    assert_eq!(page.total, 3);
    assert!(page.results.iter().all(|r| r.relevance >= 0.6));
    assert!(page.results.iter().all(|r| !r.title.contains("Apple")));
    assert!(page
        .results
        .windows(2)
        .all(|w| w[0].rank >= w[1].rank));
}

#[tokio::test]
async fn results_carry_their_cluster_and_its_score() {
    let store = clustered_store().await;
    let ranker = ranker(store);

    let page = ranker.search("earthquake", None, None, 10, 0).await.unwrap();
    for result in &page.results {
        let cluster = result.cluster.as_ref().expect("clustered article");
        assert!(cluster.score > 0.0);
    }
}

#[tokio::test]
async fn exact_title_match_outranks_looser_matches() {
    let store = Arc::new(MemoryStore::new());
    store
        .store_articles(vec![
            draft("Earthquake", "Reuters", 30),
            draft("Earthquake relief efforts continue in region", "AP", 30),
            draft("Scientists study earthquake prediction models", "BBC", 30),
        ])
        .await
        .unwrap();
    let ranker = SearchRanker::new(store, Arc::new(NoopCache::new()));

    let page = ranker.search("earthquake", None, None, 10, 0).await.unwrap();
    assert_eq!(page.results[0].title, "Earthquake");
    assert_eq!(page.results[0].relevance, 1.0);
    assert!(page.results[1].relevance < 1.0);
}

#[tokio::test]
async fn one_source_cannot_dominate_a_result_list() {
    let store = Arc::new(MemoryStore::new());
    store
        .store_articles(vec![
            draft("Earthquake damages coastal highway", "Reuters", 5),
            draft("Earthquake relief convoy departs", "Reuters", 6),
            draft("Earthquake aftershocks continue", "Reuters", 7),
            draft("Earthquake insurance claims surge", "Reuters", 8),
            draft("Earthquake response praised by mayor", "Reuters", 9),
            draft("Earthquake shelters reach capacity", "AP", 10),
        ])
        .await
        .unwrap();
    let ranker = SearchRanker::new(store, Arc::new(NoopCache::new()));

    let page = ranker.search("earthquake", None, None, 10, 0).await.unwrap();
    assert_eq!(page.total, 4);
    let reuters = page.results.iter().filter(|r| r.source == "Reuters").count();
    assert_eq!(reuters, 3);
    assert!(page.results.iter().any(|r| r.source == "AP"));
}

#[tokio::test]
async fn pagination_windows_the_capped_list() {
    let store = clustered_store().await;
    let ranker = ranker(store);

    let full = ranker.search("earthquake", None, None, 10, 0).await.unwrap();
    let page = ranker.search("earthquake", None, None, 2, 1).await.unwrap();
    assert_eq!(page.total, full.total);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].article_id, full.results[1].article_id);
}

#[tokio::test]
async fn category_and_country_filters_narrow_candidates() {
    let store = Arc::new(MemoryStore::new());
    let mut tech = draft("Earthquake sensors get AI upgrade", "Wired", 5);
    tech.category = "technology".to_string();
    let mut np = draft("Earthquake drill held in Kathmandu", "Kantipur", 6);
    np.country = "NP".to_string();
    store
        .store_articles(vec![tech, np, draft("Earthquake hits region", "AP", 7)])
        .await
        .unwrap();
    let ranker = SearchRanker::new(store, Arc::new(NoopCache::new()));

    let tech_page = ranker
        .search("earthquake", Some("technology"), None, 10, 0)
        .await
        .unwrap();
    assert_eq!(tech_page.total, 1);
    assert_eq!(tech_page.results[0].source, "Wired");

    let np_page = ranker
        .search("earthquake", None, Some("np"), 10, 0)
        .await
        .unwrap();
    assert_eq!(np_page.total, 1);
    assert_eq!(np_page.results[0].source, "Kantipur");
}

#[tokio::test]
async fn short_queries_return_nothing() {
    let store = clustered_store().await;
    let ranker = ranker(store);

    assert!(ranker.search("e", None, None, 10, 0).await.unwrap().results.is_empty());
    assert!(ranker.suggestions("e").await.unwrap().is_empty());
    assert!(ranker.suggestions("  ").await.unwrap().is_empty());
}

#[tokio::test]
async fn suggestions_prefer_clusters_and_dedup_titles() {
    let store = clustered_store().await;
    let ranker = ranker(store);

    let suggestions = ranker.suggestions("earthquake").await.unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 8);
    assert_eq!(suggestions[0].kind, SuggestionKind::Cluster);

    // The cluster's canonical title shadows the identical article title.
    let normalized: Vec<String> = suggestions
        .iter()
        .map(|s| newswire_common::normalize_title(&s.text))
        .collect();
    let unique: std::collections::HashSet<&String> = normalized.iter().collect();
    assert_eq!(unique.len(), normalized.len());
}

#[tokio::test]
async fn older_exact_match_still_wins_the_suggestion_list() {
    let store = Arc::new(MemoryStore::new());
    let numbers = [
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
    ];
    let mut drafts: Vec<_> = numbers
        .iter()
        .enumerate()
        .map(|(i, n)| draft(&format!("Quake update {n}"), "Reuters", i as i64 + 1))
        .collect();
    // The exact title is an hour older than every loose match.
    drafts.push(draft("Quake", "AP", 60));
    store.store_articles(drafts).await.unwrap();
    let ranker = SearchRanker::new(store, Arc::new(NoopCache::new()));

    let suggestions = ranker.suggestions("quake").await.unwrap();
    assert_eq!(suggestions.len(), 8);
    assert_eq!(suggestions[0].text, "Quake");
}

#[tokio::test]
async fn search_results_are_served_from_cache_within_ttl() {
    let store = clustered_store().await;
    let ranker = SearchRanker::new(store.clone(), Arc::new(MemoryCache::new()));

    let first = ranker.search("earthquake", None, None, 10, 0).await.unwrap();
    store
        .store_articles(vec![draft("Earthquake toll rises", "DPA", 1)])
        .await
        .unwrap();
    let second = ranker.search("earthquake", None, None, 10, 0).await.unwrap();
    assert_eq!(first.total, second.total);
}
