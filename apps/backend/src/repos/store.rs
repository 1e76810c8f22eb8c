//! The abstract repository the engine runs against.
//!
//! The store is the single serialization point for a session: check-then-act
//! sequences are made effectively atomic by conditional writes
//! (`lock_version` on sessions, turn-number uniqueness on turns), not by the
//! caller holding locks across external round trips.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::phase::Phase;
use crate::errors::domain::DomainError;
use crate::repos::sessions::{Session, SessionUpdate};
use crate::repos::turns::Turn;

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn insert_session(&self, session: Session) -> Result<Session, DomainError>;

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>, DomainError>;

    /// Conditional write. Fails with `Conflict(OptimisticLock)` when the
    /// stored `lock_version` no longer matches the update's expectation;
    /// bumps the version on success and returns the updated row.
    async fn update_session(&self, update: SessionUpdate) -> Result<Session, DomainError>;

    /// Append a turn. Fails with `Conflict(ConcurrentSubmission)` when a row
    /// with the same (session, player, phase, turn_number) already exists,
    /// and with `NotFound` when the session does not.
    async fn insert_turn(&self, turn: Turn) -> Result<Turn, DomainError>;

    async fn count_turns(
        &self,
        session_id: Uuid,
        player_id: Uuid,
        phase: Phase,
    ) -> Result<u32, DomainError>;

    /// Ordered by `turn_number`, ascending.
    async fn list_turns(
        &self,
        session_id: Uuid,
        player_id: Uuid,
        phase: Phase,
    ) -> Result<Vec<Turn>, DomainError>;
}
