//! Completion paths: judge verdicts, exhausted budgets, forfeits, and the
//! complete-iff-winner invariant.

mod support;

use std::time::Duration;

use backend::domain::phase::{EndReason, Phase};
use backend::errors::domain::{ConflictKind, DomainError};
use backend::events::SessionEvent;
use backend::repos::sessions::Session;
use backend::repos::store::GameStore;

use crate::support::TestHarness;

/// Run both players through DEFENSE and wait out the countdown.
async fn advance_to_attack(h: &TestHarness, session: &Session) {
    h.exhaust_phase(session.id, session.player_one_id).await;
    h.exhaust_phase(session.id, session.player_two_id).await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    let fresh = h.store.find_session(session.id).await.unwrap().unwrap();
    assert_eq!(fresh.phase, Phase::Attack);
}

#[tokio::test]
async fn yes_verdict_on_final_attack_turn_ends_the_game_immediately() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let (p1, p2) = (session.player_one_id, session.player_two_id);
    advance_to_attack(&h, &session).await;

    // p1's final attack turn gets a YES; p2 still has turns left, and the
    // normal phase-boundary path is bypassed entirely.
    h.ai.push_verdict(true);
    h.flow.submit_turn(session.id, p1, "a1").await.unwrap();
    let outcome = h.flow.submit_turn(session.id, p1, "a2").await.unwrap();
    assert!(outcome.is_game_complete);
    assert!(!outcome.is_transition);

    let done = h.store.find_session(session.id).await.unwrap().unwrap();
    assert_eq!(done.phase, Phase::Complete);
    assert_eq!(done.winner_id, Some(p1));
    assert_eq!(done.end_reason, Some(EndReason::SecretRevealed));

    // The judge saw this session's secret.
    assert_eq!(
        h.ai.judged_secrets.lock().last().map(String::as_str),
        Some("the password is blue42")
    );

    let err = h.flow.submit_turn(session.id, p2, "too late").await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::GameOver, _)));

    let completes: Vec<_> = h
        .sink
        .events_for(session.id)
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::GameComplete { .. }))
        .collect();
    assert_eq!(completes.len(), 1);
    assert!(matches!(
        completes[0],
        SessionEvent::GameComplete { winner_id, end_reason: EndReason::SecretRevealed }
            if winner_id == p1
    ));
}

#[tokio::test]
async fn first_finisher_with_no_verdict_does_not_end_the_game() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let (p1, p2) = (session.player_one_id, session.player_two_id);
    advance_to_attack(&h, &session).await;

    // Both of p1's judge calls answer NO (queue default).
    h.exhaust_phase(session.id, p1).await;
    let mid = h.store.find_session(session.id).await.unwrap().unwrap();
    assert_eq!(mid.phase, Phase::Attack);
    assert!(mid.winner_id.is_none());

    // p2 can still play.
    h.flow.submit_turn(session.id, p2, "still going").await.unwrap();
}

#[tokio::test]
async fn exhausted_attacks_complete_with_turns_exhausted() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let (p1, p2) = (session.player_one_id, session.player_two_id);
    advance_to_attack(&h, &session).await;

    h.exhaust_phase(session.id, p1).await;
    h.exhaust_phase(session.id, p2).await; // p2's last turn triggers the end

    let done = h.store.find_session(session.id).await.unwrap().unwrap();
    assert_eq!(done.phase, Phase::Complete);
    assert_eq!(done.end_reason, Some(EndReason::TurnsExhausted));
    // Neither attack succeeded; the win goes to the opponent of the final
    // submitter - the defense left standing at the end.
    assert_eq!(done.winner_id, Some(p1));
}

#[tokio::test]
async fn forfeit_awards_the_opponent() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let (p1, p2) = (session.player_one_id, session.player_two_id);

    let done = h.flow.forfeit(session.id, p2).await.unwrap();
    assert_eq!(done.phase, Phase::Complete);
    assert_eq!(done.winner_id, Some(p1));
    assert_eq!(done.end_reason, Some(EndReason::Forfeit));

    // Second forfeit finds the game over.
    let err = h.flow.forfeit(session.id, p1).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::GameOver, _)));

    // Spectators cannot concede someone else's game.
    let err = h.flow.forfeit(session.id, uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotAParticipant(_)));
}

#[tokio::test]
async fn forfeit_sweeps_an_active_countdown() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let (p1, p2) = (session.player_one_id, session.player_two_id);

    h.exhaust_phase(session.id, p1).await;
    h.exhaust_phase(session.id, p2).await;
    let armed = h.store.find_session(session.id).await.unwrap().unwrap();
    assert!(armed.is_transitioning);

    let done = h.flow.forfeit(session.id, p1).await.unwrap();
    assert_eq!(done.phase, Phase::Complete);
    assert!(!done.is_transitioning);
    assert!(done.transition_ends_at.is_none());

    // The still-running tick task must not resurrect the session: its
    // finalize sees is_transitioning == false and backs off.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let after = h.store.find_session(session.id).await.unwrap().unwrap();
    assert_eq!(after.phase, Phase::Complete);
    assert_eq!(after.winner_id, Some(p2));
}

#[tokio::test]
async fn complete_iff_winner_is_set() {
    let h = TestHarness::new();
    let session = h.seeded_session().await;
    let (p1, p2) = (session.player_one_id, session.player_two_id);

    // Live session: neither complete nor winner.
    let live = h.store.find_session(session.id).await.unwrap().unwrap();
    assert_ne!(live.phase, Phase::Complete);
    assert!(live.winner_id.is_none());
    assert!(live.end_reason.is_none());

    advance_to_attack(&h, &session).await;
    h.exhaust_phase(session.id, p1).await;
    h.exhaust_phase(session.id, p2).await;

    let done = h.store.find_session(session.id).await.unwrap().unwrap();
    assert_eq!(done.phase, Phase::Complete);
    assert!(done.winner_id.is_some(), "COMPLETE implies a winner");
    assert!(done.end_reason.is_some());
}
