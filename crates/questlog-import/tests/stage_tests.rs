//! Integration tests for the paced multi-query stages

mod common;

use common::FakeIgdb;
use questlog_import::{CompletionTimeFetcher, CrossReferenceResolver, ImportError};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

const PACING: Duration = Duration::from_millis(1000);

fn titles(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Game {}", i)).collect()
}

#[tokio::test(start_paused = true)]
async fn test_cross_reference_chunks_are_paced() {
    let igdb = Arc::new(FakeIgdb::default());
    let resolver = CrossReferenceResolver::new(igdb.clone(), 10, PACING);

    resolver.resolve(&titles(25)).await.unwrap();

    let calls = igdb.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls.iter().map(|c| c.queries.len()).collect::<Vec<_>>(),
        vec![10, 10, 5]
    );
    for pair in calls.windows(2) {
        assert!(pair[1].at - pair[0].at >= PACING);
    }
}

#[tokio::test(start_paused = true)]
async fn test_exact_multiple_has_no_trailing_chunk() {
    let igdb = Arc::new(FakeIgdb::default());
    let resolver = CrossReferenceResolver::new(igdb.clone(), 10, PACING);

    resolver.resolve(&titles(20)).await.unwrap();
    assert_eq!(igdb.calls().len(), 2);
}

#[tokio::test]
async fn test_empty_input_sends_nothing() {
    let igdb = Arc::new(FakeIgdb::default());
    let resolver = CrossReferenceResolver::new(igdb.clone(), 10, PACING);

    let outcome = resolver.resolve(&[]).await.unwrap();
    assert!(outcome.is_complete());
    assert!(igdb.calls().is_empty());
}

#[tokio::test]
async fn test_unmatched_names_resolve_to_none() {
    let mut igdb = FakeIgdb::default();
    igdb.ids.insert("Hades".into(), 113112);
    let resolver = CrossReferenceResolver::new(Arc::new(igdb), 10, Duration::ZERO);

    let names = vec!["Hades".to_string(), "Obscure Jam Game".to_string()];
    let outcome = resolver.resolve(&names).await.unwrap();

    assert_eq!(outcome.data()["Hades"], Some(113112));
    assert_eq!(outcome.data()["Obscure Jam Game"], None);
    assert_eq!(outcome.gaps().len(), 1);
    assert_eq!(outcome.gaps()[0].key, "Obscure Jam Game");
}

#[tokio::test]
async fn test_colliding_names_keep_their_own_ids() {
    let mut igdb = FakeIgdb::default();
    igdb.ids.insert("Half-Life".into(), 231);
    igdb.ids.insert("Half Life".into(), 999);
    let igdb = Arc::new(igdb);
    let resolver = CrossReferenceResolver::new(igdb.clone(), 10, Duration::ZERO);

    let names = vec!["Half-Life".to_string(), "Half Life".to_string()];
    let outcome = resolver.resolve(&names).await.unwrap();

    assert_eq!(outcome.data()["Half-Life"], Some(231));
    assert_eq!(outcome.data()["Half Life"], Some(999));

    let keys: Vec<String> = igdb.calls()[0]
        .queries
        .iter()
        .map(|q| q.name.clone())
        .collect();
    assert_eq!(keys, vec!["HalfLife", "HalfLife_2"]);
}

#[tokio::test]
async fn test_cross_reference_failure_is_fatal() {
    let igdb = FakeIgdb {
        failing_resource: Some("games"),
        ..Default::default()
    };
    let resolver = CrossReferenceResolver::new(Arc::new(igdb), 10, Duration::ZERO);

    let err = resolver.resolve(&titles(3)).await.unwrap_err();
    assert!(matches!(err, ImportError::CrossReference(_)));
    assert!(err.to_string().contains("HTTP 500"));
}

#[tokio::test(start_paused = true)]
async fn test_completion_times_chunked_by_id() {
    let mut igdb = FakeIgdb::default();
    igdb.times.insert(1, (Some(36_000), Some(90_000)));
    igdb.times.insert(2, (None, Some(7_200)));
    igdb.times.insert(3, (None, None));
    let igdb = Arc::new(igdb);
    let fetcher = CompletionTimeFetcher::new(igdb.clone(), 2, PACING);

    let ids: BTreeSet<u64> = [1, 2, 3, 4].into_iter().collect();
    let outcome = fetcher.fetch(&ids).await.unwrap();

    let calls = igdb.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].at - calls[0].at >= PACING);

    assert_eq!(outcome.data()[&1].best_estimate(), Some(10));
    assert_eq!(outcome.data()[&2].best_estimate(), Some(2));
    let mut missing: Vec<String> = outcome.gaps().iter().map(|g| g.key.clone()).collect();
    missing.sort();
    assert_eq!(missing, vec!["3", "4"]);
}

#[tokio::test]
async fn test_completion_failure_is_fatal() {
    let igdb = FakeIgdb {
        failing_resource: Some("game_time_to_beats"),
        ..Default::default()
    };
    let fetcher = CompletionTimeFetcher::new(Arc::new(igdb), 10, Duration::ZERO);

    let ids: BTreeSet<u64> = [7].into_iter().collect();
    let err = fetcher.fetch(&ids).await.unwrap_err();
    assert_eq!(err.kind(), "CompletionTimeError");
}
