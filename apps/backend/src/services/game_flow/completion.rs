//! Game completion paths.
//!
//! A session completes through exactly one of three doors: a YES verdict on
//! a final attack turn, both attack budgets spent without a verdict, or a
//! forfeit. All three converge on `complete`, whose conditional write sets
//! the outcome exactly once and never overwrites an earlier one.

use tracing::info;
use uuid::Uuid;

use super::GameFlowService;
use crate::domain::phase::{EndReason, Phase};
use crate::errors::domain::{ConflictKind, DomainError};
use crate::events::SessionEvent;
use crate::repos::sessions::{self, Session, SessionUpdate};

impl GameFlowService {
    /// Mark the session COMPLETE with its outcome and announce it.
    ///
    /// Idempotent against racing completions: the first write wins and later
    /// callers observe `Phase::Complete` and back off without an event.
    pub(super) async fn complete(
        &self,
        session_id: Uuid,
        winner_id: Uuid,
        end_reason: EndReason,
    ) -> Result<Session, DomainError> {
        loop {
            let session = sessions::require_session(self.store.as_ref(), session_id).await?;
            if session.phase == Phase::Complete {
                return Ok(session);
            }

            let update = SessionUpdate::new(session_id, session.lock_version)
                .with_phase(Phase::Complete)
                .with_outcome(winner_id, end_reason)
                .with_transition_cleared();
            match self.store.update_session(update).await {
                Ok(updated) => {
                    info!(
                        session_id = %session_id,
                        winner = %winner_id,
                        ?end_reason,
                        "session completed"
                    );
                    self.events.publish(
                        session_id,
                        SessionEvent::GameComplete {
                            winner_id,
                            end_reason,
                        },
                    );
                    return Ok(updated);
                }
                Err(DomainError::Conflict(ConflictKind::OptimisticLock, _)) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// A participant concedes. The opponent wins; an active countdown is
    /// simply swept away by the completion write.
    pub async fn forfeit(
        &self,
        session_id: Uuid,
        player_id: Uuid,
    ) -> Result<Session, DomainError> {
        let session = sessions::require_session(self.store.as_ref(), session_id).await?;
        let opponent = session.opponent_of(player_id).ok_or_else(|| {
            DomainError::not_a_participant(format!(
                "Player {player_id} is spectating session {session_id}"
            ))
        })?;
        if session.phase == Phase::Complete {
            return Err(DomainError::conflict(
                ConflictKind::GameOver,
                "Session already completed",
            ));
        }

        info!(session_id = %session_id, loser = %player_id, "forfeit");
        self.complete(session_id, opponent, EndReason::Forfeit).await
    }
}
