//! Turn submission - the orchestrator at the core of the engine.

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::GameFlowService;
use crate::ai::ReplyContext;
use crate::domain::phase::{EndReason, Phase};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::events::SessionEvent;
use crate::repos::sessions::{self, Session, SessionUpdate};
use crate::repos::turns::Turn;

/// What a successful submission produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn: Turn,
    /// The submitting player's turn count in the phase, after this turn.
    pub new_count: u32,
    /// A DEFENSE→ATTACK countdown started because of this turn.
    pub is_transition: bool,
    /// The session reached COMPLETE because of this turn.
    pub is_game_complete: bool,
}

impl GameFlowService {
    /// Validate, invoke the Responder, persist the turn, and decide whether
    /// this submission crossed a phase boundary or ended the game.
    ///
    /// Precondition failures are distinct typed errors and leave no trace;
    /// a Responder failure also leaves no trace (the turn is persisted only
    /// after a successful reply), so callers can simply resubmit.
    pub async fn submit_turn(
        &self,
        session_id: Uuid,
        player_id: Uuid,
        message: &str,
    ) -> Result<TurnOutcome, DomainError> {
        self.validate_message(message)?;

        // Authoritative re-read: phase and counts are never trusted from an
        // earlier call.
        let session = sessions::require_session(self.store.as_ref(), session_id).await?;

        if !session.is_participant(player_id) {
            return Err(DomainError::not_a_participant(format!(
                "Player {player_id} is spectating session {session_id}"
            )));
        }
        if session.phase == Phase::Complete {
            return Err(DomainError::conflict(
                ConflictKind::GameOver,
                "Session already completed",
            ));
        }
        if session.is_transitioning {
            // Turns are rejected, not queued, during the countdown window.
            return Err(DomainError::conflict(
                ConflictKind::TransitionInProgress,
                "Phase transition in progress",
            ));
        }

        let phase = session.phase;
        let limit = self.config.turn_limit;
        let count = self
            .store
            .count_turns(session_id, player_id, phase)
            .await?;
        if count >= limit {
            return Err(limit_reached(limit));
        }

        let history = self.store.list_turns(session_id, player_id, phase).await?;

        // ATTACK context carries the opponent's training summary; the persona
        // and secret are injected server-side only.
        let opponent_summary = match phase {
            Phase::Attack => session
                .opponent_of(player_id)
                .and_then(|opp| session.defense_summary_of(opp))
                .map(str::to_string),
            _ => None,
        };

        let ctx = ReplyContext {
            character: &session.generated_character,
            secret: &session.generated_secret,
            defense_summary: opponent_summary.as_deref(),
            history: &history,
            message,
        };
        let reply = self.responder.reply(&ctx).await?;

        // Persistence happens only after a successful reply. The uniqueness
        // check inside insert_turn is the race-prevention point: of two
        // same-player submissions racing for the same slot, exactly one row
        // is accepted.
        let turn = Turn::new(session_id, player_id, phase, count + 1, message, reply);
        let turn = match self.store.insert_turn(turn).await {
            Ok(turn) => turn,
            Err(DomainError::Conflict(ConflictKind::ConcurrentSubmission, detail)) => {
                let current = self
                    .store
                    .count_turns(session_id, player_id, phase)
                    .await?;
                if current >= limit {
                    return Err(limit_reached(limit));
                }
                return Err(DomainError::conflict(
                    ConflictKind::ConcurrentSubmission,
                    detail,
                ));
            }
            Err(err) => return Err(err),
        };
        let new_count = count + 1;

        debug!(
            session_id = %session_id,
            player_id = %player_id,
            ?phase,
            turn_number = turn.turn_number,
            "turn persisted"
        );

        // Emitted before any boundary handling so the opponent sees the
        // exchange immediately, not only at phase boundaries.
        self.events.publish(
            session_id,
            SessionEvent::TurnSubmitted {
                player_id,
                new_count,
                message: turn.player_message.clone(),
                reply: turn.ai_response.clone(),
            },
        );

        let mut is_transition = false;
        let mut is_game_complete = false;

        if new_count >= limit {
            is_game_complete = self
                .handle_player_boundary(&session, player_id, phase)
                .await?;

            if !is_game_complete {
                // Boundary detection is symmetric: only the second player to
                // reach the limit advances the game.
                let opponent = session.opponent_of(player_id).ok_or_else(|| {
                    DomainError::not_a_participant(format!(
                        "Player {player_id} is spectating session {session_id}"
                    ))
                })?;
                let opponent_count = self
                    .store
                    .count_turns(session_id, opponent, phase)
                    .await?;

                if opponent_count >= limit {
                    match phase {
                        Phase::Defense => {
                            self.begin_transition(session_id).await?;
                            is_transition = true;
                        }
                        Phase::Attack => {
                            // Neither attack produced a YES verdict: the win
                            // goes to the defense that was last left standing.
                            self.complete(session_id, opponent, EndReason::TurnsExhausted)
                                .await?;
                            is_game_complete = true;
                        }
                        Phase::Complete => {}
                    }
                }
            }
        }

        Ok(TurnOutcome {
            turn,
            new_count,
            is_transition,
            is_game_complete,
        })
    }

    /// Side effects of a player spending their final turn in `phase`.
    ///
    /// Returns true when the game completed (attack verdict YES).
    async fn handle_player_boundary(
        &self,
        session: &Session,
        player_id: Uuid,
        phase: Phase,
    ) -> Result<bool, DomainError> {
        match phase {
            Phase::Defense => {
                self.store_defense_summary(session.id, player_id).await?;
                Ok(false)
            }
            Phase::Attack => {
                let attack_turns = self
                    .store
                    .list_turns(session.id, player_id, Phase::Attack)
                    .await?;
                let revealed = self
                    .judge
                    .secret_revealed(&session.generated_secret, &attack_turns)
                    .await?;
                if revealed {
                    info!(
                        session_id = %session.id,
                        winner = %player_id,
                        "judge ruled the secret revealed"
                    );
                    self.complete(session.id, player_id, EndReason::SecretRevealed)
                        .await?;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Phase::Complete => Ok(false),
        }
    }

    /// Summarize the player's finished defense conversation and store it as
    /// their summary, exactly once. Retries version conflicts (the opponent
    /// may be writing their own summary concurrently); gives up silently if
    /// a summary is already present.
    async fn store_defense_summary(
        &self,
        session_id: Uuid,
        player_id: Uuid,
    ) -> Result<(), DomainError> {
        let turns = self
            .store
            .list_turns(session_id, player_id, Phase::Defense)
            .await?;
        let summary = self.responder.summarize_defense(&turns).await?;

        loop {
            let session = sessions::require_session(self.store.as_ref(), session_id).await?;
            if session.defense_summary_of(player_id).is_some() {
                warn!(
                    session_id = %session_id,
                    player_id = %player_id,
                    "defense summary already stored, skipping"
                );
                return Ok(());
            }
            let for_player_one = player_id == session.player_one_id;
            let update = SessionUpdate::new(session_id, session.lock_version)
                .with_defense_summary(for_player_one, summary.clone());
            match self.store.update_session(update).await {
                Ok(_) => {
                    info!(session_id = %session_id, player_id = %player_id, "defense summary stored");
                    return Ok(());
                }
                Err(DomainError::Conflict(ConflictKind::OptimisticLock, _)) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn validate_message(&self, message: &str) -> Result<(), DomainError> {
        if message.trim().is_empty() {
            return Err(DomainError::validation(
                ValidationKind::EmptyMessage,
                "Message must not be empty",
            ));
        }
        let max = self.config.max_message_chars;
        if message.chars().count() > max {
            return Err(DomainError::validation(
                ValidationKind::MessageTooLong,
                format!("Message exceeds {max} characters"),
            ));
        }
        Ok(())
    }
}

fn limit_reached(limit: u32) -> DomainError {
    DomainError::conflict(
        ConflictKind::LimitReached,
        format!("Turn limit of {limit} reached for this phase"),
    )
}
