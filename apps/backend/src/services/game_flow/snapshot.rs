//! Pull-based state reconciliation.
//!
//! A client that polls this endpoint must reconstruct exactly the state an
//! event-listening client accumulated, so everything here derives from the
//! store. The countdown is recomputed from the stored deadline, which lets a
//! reconnecting client resume mid-transition without having seen any tick;
//! an overdue deadline is finalized eagerly rather than reported as a
//! negative countdown.

use time::OffsetDateTime;
use uuid::Uuid;

use super::GameFlowService;
use crate::domain::phase::Phase;
use crate::domain::snapshot::{
    remaining_seconds, SessionSnapshot, SessionView, TransitionView, TurnView,
};
use crate::errors::domain::DomainError;
use crate::repos::sessions::{self, Session};

impl GameFlowService {
    /// Build the caller's view of a session. Non-participants get the bare
    /// `Spectating` indicator with no session internals.
    pub async fn read_state(
        &self,
        session_id: Uuid,
        player_id: Uuid,
    ) -> Result<SessionView, DomainError> {
        let mut session = sessions::require_session(self.store.as_ref(), session_id).await?;

        if !session.is_participant(player_id) {
            return Ok(SessionView::Spectating);
        }

        // A deadline in the past means the timer's final write never landed
        // (or the process restarted mid-countdown). The store's deadline is
        // authoritative: finalize now instead of serving a stale window.
        if session.is_transitioning {
            let overdue = session
                .transition_ends_at
                .map(|ends_at| ends_at <= OffsetDateTime::now_utc())
                .unwrap_or(true);
            if overdue {
                self.finalize_transition(session_id).await?;
                session = sessions::require_session(self.store.as_ref(), session_id).await?;
            }
        }

        let opponent = session.opponent_of(player_id).ok_or_else(|| {
            DomainError::not_a_participant(format!(
                "Player {player_id} is spectating session {session_id}"
            ))
        })?;

        let phase = session.phase;
        let my_turn_count = self.store.count_turns(session_id, player_id, phase).await?;
        let opponent_turn_count = self.store.count_turns(session_id, opponent, phase).await?;
        let turns = self
            .store
            .list_turns(session_id, player_id, phase)
            .await?
            .iter()
            .map(TurnView::from)
            .collect();

        Ok(SessionView::Snapshot(SessionSnapshot {
            session_id,
            phase,
            my_turn_count,
            opponent_turn_count,
            turns,
            is_game_complete: phase == Phase::Complete,
            winner_id: session.winner_id,
            end_reason: session.end_reason,
            transition: transition_view(&session),
        }))
    }
}

fn transition_view(session: &Session) -> TransitionView {
    match (session.is_transitioning, session.transition_ends_at) {
        (true, Some(ends_at)) => TransitionView {
            is_transitioning: true,
            countdown: Some(remaining_seconds(ends_at, OffsetDateTime::now_utc())),
            next_phase: session.phase.next(),
        },
        _ => TransitionView::idle(),
    }
}
