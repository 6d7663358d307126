use matchbook::{
    matches::{Match, MatchStatus, NewMatch, TransitionRequest},
    session::ActorContext,
};

use super::setup::TestSetup;

// ============================================================================
// Match Lifecycle Actions
// ============================================================================

/// Schedules a match between two players and starts it
#[allow(dead_code)]
pub async fn start_match(setup: &TestSetup, player1: &str, player2: &str) -> Match {
    let actor = ActorContext::new(player1);
    let record = setup
        .match_service
        .create_match(
            &actor,
            NewMatch {
                player1_id: player1.to_string(),
                player2_id: player2.to_string(),
                scheduled_date: None,
                location: None,
                notes: None,
            },
        )
        .await
        .expect("match should be created");

    setup
        .match_service
        .apply_transition(&actor, &record.id, TransitionRequest::to(MatchStatus::InProgress))
        .await
        .expect("match should start")
}

/// Plays a full match and completes it with the given final score
#[allow(dead_code)]
pub async fn complete_match(
    setup: &TestSetup,
    player1: &str,
    player2: &str,
    player1_score: i32,
    player2_score: i32,
) -> Match {
    let started = start_match(setup, player1, player2).await;

    setup
        .match_service
        .apply_transition(
            &ActorContext::new(player1),
            &started.id,
            TransitionRequest::to(MatchStatus::Completed).with_scores(player1_score, player2_score),
        )
        .await
        .expect("match should complete")
}
