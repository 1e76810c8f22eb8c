//! In-memory `GameStore` adapter.
//!
//! Each session's row and turn log live in one dashmap entry, so an entry
//! guard makes the version check in `update_session` and the uniqueness
//! check in `insert_turn` atomic per session while leaving other sessions
//! fully concurrent.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::phase::Phase;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::repos::sessions::{Session, SessionUpdate};
use crate::repos::store::GameStore;
use crate::repos::turns::Turn;

#[derive(Default)]
pub struct MemoryStore {
    sessions: DashMap<Uuid, SessionRecord>,
}

struct SessionRecord {
    session: Session,
    turns: Vec<Turn>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn insert_session(&self, session: Session) -> Result<Session, DomainError> {
        let id = session.id;
        match self.sessions.entry(id) {
            Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::Other("DUPLICATE_SESSION".into()),
                format!("Session {id} already exists"),
            )),
            Entry::Vacant(slot) => {
                slot.insert(SessionRecord {
                    session: session.clone(),
                    turns: Vec::new(),
                });
                Ok(session)
            }
        }
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.get(&id).map(|r| r.session.clone()))
    }

    async fn update_session(&self, update: SessionUpdate) -> Result<Session, DomainError> {
        let mut record = self.sessions.get_mut(&update.id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Session, format!("Session {} not found", update.id))
        })?;
        let session = &mut record.session;

        if session.lock_version != update.expected_lock_version {
            return Err(DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!(
                    "Session {} was modified concurrently (expected version {}, actual version {})",
                    update.id, update.expected_lock_version, session.lock_version
                ),
            ));
        }

        if let Some(phase) = update.phase {
            session.phase = phase;
        }
        if let Some(flag) = update.is_transitioning {
            session.is_transitioning = flag;
        }
        if let Some(ends_at) = update.transition_ends_at {
            session.transition_ends_at = ends_at;
        }
        if let Some(winner_id) = update.winner_id {
            session.winner_id = Some(winner_id);
        }
        if let Some(end_reason) = update.end_reason {
            session.end_reason = Some(end_reason);
        }
        if let Some(summary) = update.player_one_defense_summary {
            session.player_one_defense_summary = Some(summary);
        }
        if let Some(summary) = update.player_two_defense_summary {
            session.player_two_defense_summary = Some(summary);
        }
        session.lock_version += 1;

        Ok(session.clone())
    }

    async fn insert_turn(&self, turn: Turn) -> Result<Turn, DomainError> {
        let mut record = self.sessions.get_mut(&turn.session_id).ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Session,
                format!("Session {} not found", turn.session_id),
            )
        })?;

        let taken = record.turns.iter().any(|t| {
            t.player_id == turn.player_id
                && t.phase == turn.phase
                && t.turn_number == turn.turn_number
        });
        if taken {
            return Err(DomainError::conflict(
                ConflictKind::ConcurrentSubmission,
                format!(
                    "Turn {} for player {} in {:?} already exists",
                    turn.turn_number, turn.player_id, turn.phase
                ),
            ));
        }

        record.turns.push(turn.clone());
        Ok(turn)
    }

    async fn count_turns(
        &self,
        session_id: Uuid,
        player_id: Uuid,
        phase: Phase,
    ) -> Result<u32, DomainError> {
        let record = self.sessions.get(&session_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Session, format!("Session {session_id} not found"))
        })?;
        let count = record
            .turns
            .iter()
            .filter(|t| t.player_id == player_id && t.phase == phase)
            .count();
        Ok(count as u32)
    }

    async fn list_turns(
        &self,
        session_id: Uuid,
        player_id: Uuid,
        phase: Phase,
    ) -> Result<Vec<Turn>, DomainError> {
        let record = self.sessions.get(&session_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Session, format!("Session {session_id} not found"))
        })?;
        let mut turns: Vec<Turn> = record
            .turns
            .iter()
            .filter(|t| t.player_id == player_id && t.phase == phase)
            .cloned()
            .collect();
        turns.sort_by_key(|t| t.turn_number);
        Ok(turns)
    }
}
