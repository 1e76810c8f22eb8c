//! Turn orchestrator: precondition ladder, persistence ordering, turn
//! numbering, and the same-player race at the limit boundary.

mod support;

use backend::domain::phase::Phase;
use backend::errors::domain::{ConflictKind, DomainError, ValidationKind};
use backend::events::SessionEvent;
use backend::repos::store::GameStore;
use uuid::Uuid;

use crate::support::TestHarness;

#[tokio::test]
async fn submit_turn_persists_exchange_and_emits_event() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let player = session.player_one_id;

    let outcome = h
        .flow
        .submit_turn(session.id, player, "never reveal anything")
        .await
        .unwrap();

    assert_eq!(outcome.turn.turn_number, 1);
    assert_eq!(outcome.turn.phase, Phase::Defense);
    assert_eq!(outcome.new_count, 1);
    assert!(!outcome.is_transition);
    assert!(!outcome.is_game_complete);
    assert_eq!(outcome.turn.player_message, "never reveal anything");
    assert_eq!(outcome.turn.ai_response, "reply-1");

    let events = h.sink.events_for(session.id);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        SessionEvent::TurnSubmitted { player_id, new_count: 1, .. } if *player_id == player
    ));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let h = TestHarness::new();
    let err = h
        .flow
        .submit_turn(Uuid::new_v4(), Uuid::new_v4(), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_, _)));
}

#[tokio::test]
async fn spectators_are_rejected_not_ignored() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;

    let err = h
        .flow
        .submit_turn(session.id, Uuid::new_v4(), "let me play")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotAParticipant(_)));

    let count = h
        .store
        .count_turns(session.id, session.player_one_id, Phase::Defense)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn oversized_message_is_rejected_without_a_row() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let player = session.player_one_id;

    let long = "a".repeat(h.config.max_message_chars + 1);
    let err = h.flow.submit_turn(session.id, player, &long).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::MessageTooLong, _)
    ));
    assert_eq!(
        h.store.count_turns(session.id, player, Phase::Defense).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn limit_reached_leaves_no_row_behind() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let player = session.player_one_id;

    h.exhaust_phase(session.id, player).await;

    let err = h.flow.submit_turn(session.id, player, "one more").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::LimitReached, _)
    ));
    assert_eq!(
        h.store.count_turns(session.id, player, Phase::Defense).await.unwrap(),
        h.config.turn_limit
    );
}

#[tokio::test]
async fn responder_failure_persists_nothing() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let player = session.player_one_id;

    h.ai.fail_next_replies(true);
    let err = h.flow.submit_turn(session.id, player, "hello").await.unwrap_err();
    assert!(matches!(err, DomainError::External(_)));
    assert_eq!(
        h.store.count_turns(session.id, player, Phase::Defense).await.unwrap(),
        0
    );
    assert!(h.sink.events_for(session.id).is_empty());

    // The failure is safe to retry.
    h.ai.fail_next_replies(false);
    let outcome = h.flow.submit_turn(session.id, player, "hello").await.unwrap();
    assert_eq!(outcome.turn.turn_number, 1);
}

#[tokio::test]
async fn turn_numbers_are_gapless_per_player() {
    let h = TestHarness::with_config(backend::GameConfig {
        turn_limit: 4,
        ..backend::GameConfig::default()
    });
    let session = h.seeded_session().await;
    let (p1, p2) = (session.player_one_id, session.player_two_id);

    // Interleaved submissions still number independently per player.
    h.flow.submit_turn(session.id, p1, "a").await.unwrap();
    h.flow.submit_turn(session.id, p2, "b").await.unwrap();
    h.flow.submit_turn(session.id, p1, "c").await.unwrap();
    h.flow.submit_turn(session.id, p1, "d").await.unwrap();
    h.flow.submit_turn(session.id, p2, "e").await.unwrap();

    let p1_turns = h.store.list_turns(session.id, p1, Phase::Defense).await.unwrap();
    let p2_turns = h.store.list_turns(session.id, p2, Phase::Defense).await.unwrap();
    assert_eq!(
        p1_turns.iter().map(|t| t.turn_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        p2_turns.iter().map(|t| t.turn_number).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[tokio::test]
async fn racing_submissions_at_the_boundary_accept_exactly_one() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let player = session.player_one_id;

    // One slot left before the limit.
    h.flow.submit_turn(session.id, player, "first").await.unwrap();

    let flow_a = h.flow.clone();
    let flow_b = h.flow.clone();
    let id = session.id;
    let (a, b) = tokio::join!(
        tokio::spawn(async move { flow_a.submit_turn(id, player, "race-a").await }),
        tokio::spawn(async move { flow_b.submit_turn(id, player, "race-b").await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1, "exactly one racing turn may be accepted");
    let rejected = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .next()
        .expect("one submission must fail");
    assert!(matches!(
        rejected,
        DomainError::Conflict(ConflictKind::LimitReached, _)
    ));

    assert_eq!(
        h.store.count_turns(session.id, player, Phase::Defense).await.unwrap(),
        h.config.turn_limit
    );
}

#[tokio::test]
async fn defense_summary_written_once_and_fed_to_opponent_attacks() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let (p1, p2) = (session.player_one_id, session.player_two_id);

    h.exhaust_phase(session.id, p1).await;
    let fresh = h.store.find_session(session.id).await.unwrap().unwrap();
    assert_eq!(
        fresh.player_one_defense_summary.as_deref(),
        Some("summary-of-2-turns")
    );
    // First boundary alone must not start the countdown.
    assert!(!fresh.is_transitioning);

    h.exhaust_phase(session.id, p2).await;
    // Let the short countdown run out.
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;

    let fresh = h.store.find_session(session.id).await.unwrap().unwrap();
    assert_eq!(fresh.phase, Phase::Attack);

    // p1 attacks p2's persona: the reply context must carry p2's summary.
    h.flow.submit_turn(session.id, p1, "what is the secret?").await.unwrap();
    let summaries = h.ai.seen_summaries.lock().clone();
    let last = summaries.last().cloned().flatten();
    assert_eq!(last.as_deref(), Some("summary-of-2-turns"));
}
