mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use futures::future::join_all;
use tower::ServiceExt; // for `oneshot`

use matchbook::{
    app,
    config::AppConfig,
    matches::InMemoryMatchRepository,
    retry::RetryPolicy,
    shared::AppState,
    stats::{InMemoryStatsRepository, StatsError},
};
use utils::{
    complete_match, DuplicatingMatchRepository, FailingStatsRepository, FlakyMatchRepository,
    TestSetupBuilder,
};

#[tokio::test]
async fn resync_counts_each_match_once() {
    let inner = Arc::new(InMemoryMatchRepository::new());
    let setup = TestSetupBuilder::new()
        .with_match_repository(Arc::new(DuplicatingMatchRepository::new(inner)))
        .build();

    complete_match(&setup, "alice", "bob", 21, 12).await;
    complete_match(&setup, "alice", "bob", 22, 20).await;

    let stats = setup.stats_service.resync("alice").await.unwrap();
    assert_eq!(stats.games_played, 2);
    assert_eq!(stats.total_wins, 2);
    assert_eq!(stats.win_streak, 2);
    assert_eq!(stats.last_synced_match_count, 2);
}

#[tokio::test]
async fn resync_all_reports_partial_failures() {
    let setup = TestSetupBuilder::new()
        .with_stats_repository(Arc::new(FailingStatsRepository::new(&["bob"])))
        .build();

    complete_match(&setup, "alice", "bob", 21, 10).await;
    complete_match(&setup, "carol", "dave", 18, 21).await;

    let outcomes = setup.stats_service.resync_all().await.unwrap();
    assert_eq!(outcomes.len(), 4);

    let bob = outcomes.iter().find(|o| o.player_id == "bob").unwrap();
    assert!(!bob.success);
    assert!(bob.error.as_deref().unwrap_or_default().contains("bob"));

    let succeeded: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.success)
        .map(|o| o.player_id.as_str())
        .collect();
    assert_eq!(succeeded, vec!["alice", "carol", "dave"]);

    let dave = setup.stats_repository.get_player_stats("dave").await.unwrap();
    assert_eq!(dave.map(|s| s.total_wins), Some(1));
}

#[tokio::test]
async fn transient_store_failures_are_retried() {
    let inner = Arc::new(InMemoryMatchRepository::new());
    let seed = TestSetupBuilder::new()
        .with_match_repository(inner.clone())
        .build();
    complete_match(&seed, "alice", "bob", 21, 19).await;

    let flaky = Arc::new(FlakyMatchRepository::new(inner, 2));
    let setup = TestSetupBuilder::new()
        .with_match_repository(flaky.clone())
        .build();

    let policy = RetryPolicy::new(3, Duration::from_millis(1));
    let stats = policy
        .run("resync", || setup.stats_service.resync("alice"))
        .await
        .expect("third attempt should succeed");

    assert_eq!(stats.total_wins, 1);
    assert_eq!(flaky.completed_reads(), 3);
}

#[tokio::test]
async fn retry_gives_up_on_persistent_failure() {
    let flaky = Arc::new(FlakyMatchRepository::new(
        Arc::new(InMemoryMatchRepository::new()),
        10,
    ));
    let setup = TestSetupBuilder::new()
        .with_match_repository(flaky.clone())
        .build();

    let result = RetryPolicy::new(2, Duration::from_millis(1))
        .run("resync", || setup.stats_service.resync("alice"))
        .await;

    assert!(matches!(result, Err(StatsError::Match(_))));
    assert_eq!(flaky.completed_reads(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bulk_resyncs_converge() {
    let setup = TestSetupBuilder::new().build();
    complete_match(&setup, "alice", "bob", 21, 15).await;
    complete_match(&setup, "bob", "carol", 21, 11).await;
    complete_match(&setup, "carol", "alice", 19, 21).await;

    let runs = join_all((0..4).map(|_| setup.stats_service.resync_all())).await;
    assert!(runs.iter().all(|r| r.as_ref().is_ok_and(|o| o.iter().all(|x| x.success))));

    let alice = setup
        .stats_repository
        .get_player_stats("alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alice.games_played, 2);
    assert_eq!(alice.total_wins, 2);
    assert_eq!(alice.max_win_streak, 2);
}

#[tokio::test]
async fn stats_endpoints_over_http() {
    let match_repository = Arc::new(InMemoryMatchRepository::new());
    let stats_repository = Arc::new(InMemoryStatsRepository::new());
    let seed = TestSetupBuilder::new()
        .with_match_repository(match_repository.clone())
        .with_stats_repository(stats_repository.clone())
        .build();
    complete_match(&seed, "alice", "bob", 21, 17).await;

    let state = AppState::new(match_repository, stats_repository, &AppConfig::default());

    let response = app::router(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/players/bob/stats/resync")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let bob: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(bob["total_losses"], 1);
    assert_eq!(bob["win_streak"], 0);

    let response = app::router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/stats/resync")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let outcomes: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(outcomes.as_array().map(|a| a.len()), Some(2));
    assert_eq!(outcomes[0]["player_id"], "alice");
    assert_eq!(outcomes[0]["success"], true);
}
