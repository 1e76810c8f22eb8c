//! Phase transition countdown.
//!
//! State machine per session: IDLE → COUNTING(n) → IDLE. Entry arms the
//! `is_transitioning` flag and the wall-clock deadline in a single
//! conditional write; the spawned task emits ticks whose remaining value is
//! recomputed from that deadline (a late tick reports the true remaining
//! time, it does not drift); the final tick commits the phase advance and
//! clears the countdown in one conditional write. There is no cancellation
//! path.

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::GameFlowService;
use crate::domain::phase::Phase;
use crate::domain::snapshot::remaining_seconds;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::events::SessionEvent;
use crate::repos::sessions::{self, SessionUpdate};

impl GameFlowService {
    /// Arm the countdown for a session sitting on a phase boundary.
    ///
    /// The `is_transitioning` guard in `submit_turn` makes a second start
    /// unreachable in normal flow; a race on entry loses the version check
    /// here and is treated as already-started.
    pub(super) async fn begin_transition(&self, session_id: Uuid) -> Result<(), DomainError> {
        let ends_at = OffsetDateTime::now_utc() + self.config.transition_window();

        loop {
            let session = sessions::require_session(self.store.as_ref(), session_id).await?;
            if session.is_transitioning {
                // Lost the entry race; the winner's timer is already running.
                return Ok(());
            }

            let update = SessionUpdate::new(session_id, session.lock_version)
                .with_transition_started(ends_at);
            match self.store.update_session(update).await {
                Ok(_) => {
                    info!(session_id = %session_id, %ends_at, "transition countdown started");
                    self.spawn_countdown(session_id, ends_at);
                    return Ok(());
                }
                // A benign version bump (e.g. a defense summary landing) or
                // the racing entry; re-read and decide again.
                Err(DomainError::Conflict(ConflictKind::OptimisticLock, _)) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Tick loop. Runs detached; tick delivery failures are non-fatal and the
    /// countdown always runs to completion once started.
    fn spawn_countdown(&self, session_id: Uuid, ends_at: OffsetDateTime) {
        let flow = self.clone();
        let interval = self.config.tick_interval;
        tokio::spawn(async move {
            loop {
                let remaining = remaining_seconds(ends_at, OffsetDateTime::now_utc());
                flow.events
                    .publish(session_id, SessionEvent::TransitionTick { remaining });
                if remaining == 0 {
                    break;
                }
                // Wake when the reported value decrements, anchored to the
                // deadline rather than to this tick's send time: a delayed
                // wake skips values instead of repeating them.
                let next_target = ends_at - interval * (u32::from(remaining) - 1);
                let sleep_for = next_target - OffsetDateTime::now_utc();
                if sleep_for > time::Duration::ZERO {
                    tokio::time::sleep(sleep_for.unsigned_abs()).await;
                }
            }

            if let Err(err) = flow.finalize_transition(session_id).await {
                warn!(
                    session_id = %session_id,
                    error = %err,
                    "transition finalization failed; a later read will finalize"
                );
            }
        });
    }

    /// Commit the phase advance and clear the countdown, exactly once.
    ///
    /// Idempotent: callers racing here (the timer task and an eager read of
    /// an overdue deadline) all converge on one successful write. Returns
    /// whether this call was the one that committed.
    pub(crate) async fn finalize_transition(&self, session_id: Uuid) -> Result<bool, DomainError> {
        loop {
            let session = sessions::require_session(self.store.as_ref(), session_id).await?;
            if !session.is_transitioning {
                return Ok(false);
            }
            let Some(next) = session.phase.next() else {
                return Ok(false);
            };
            if next == Phase::Complete {
                // Attack never ends through the timer; completion has its own
                // write path. Clear the stray flag without touching the phase.
                warn!(session_id = %session_id, "countdown active past DEFENSE, clearing flag only");
                let update = SessionUpdate::new(session_id, session.lock_version)
                    .with_transition_cleared();
                match self.store.update_session(update).await {
                    Ok(_) => return Ok(false),
                    Err(DomainError::Conflict(ConflictKind::OptimisticLock, _)) => continue,
                    Err(err) => return Err(err),
                }
            }

            let update = SessionUpdate::new(session_id, session.lock_version)
                .with_phase(next)
                .with_transition_cleared();
            match self.store.update_session(update).await {
                Ok(_) => {
                    info!(session_id = %session_id, ?next, "transition committed");
                    self.events.publish(session_id, SessionEvent::TransitionEnded);
                    return Ok(true);
                }
                Err(DomainError::Conflict(ConflictKind::OptimisticLock, _)) => continue,
                Err(err) => return Err(err),
            }
        }
    }
}
