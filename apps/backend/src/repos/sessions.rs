//! Session domain model and store helpers.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::phase::{EndReason, Phase};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::store::GameStore;

/// One adversarial match between two players and an AI persona.
///
/// The store is the single source of truth; services re-read this model
/// immediately before every decision and never hold it across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub player_one_id: Uuid,
    pub player_two_id: Uuid,
    pub phase: Phase,
    /// Persona the Responder plays. Server-side only, never sent to clients.
    pub generated_character: String,
    /// The value attackers must extract. Server-side only.
    pub generated_secret: String,
    pub player_one_defense_summary: Option<String>,
    pub player_two_defense_summary: Option<String>,
    pub is_transitioning: bool,
    pub transition_ends_at: Option<OffsetDateTime>,
    pub winner_id: Option<Uuid>,
    pub end_reason: Option<EndReason>,
    /// Bumped on every write; conditional writes carry the expected value.
    pub lock_version: i32,
    pub created_at: OffsetDateTime,
}

impl Session {
    pub fn new(player_one_id: Uuid, player_two_id: Uuid, character: String, secret: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_one_id,
            player_two_id,
            phase: Phase::Defense,
            generated_character: character,
            generated_secret: secret,
            player_one_defense_summary: None,
            player_two_defense_summary: None,
            is_transitioning: false,
            transition_ends_at: None,
            winner_id: None,
            end_reason: None,
            lock_version: 0,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn is_participant(&self, player_id: Uuid) -> bool {
        player_id == self.player_one_id || player_id == self.player_two_id
    }

    /// The other participant. `None` when `player_id` is a spectator.
    pub fn opponent_of(&self, player_id: Uuid) -> Option<Uuid> {
        if player_id == self.player_one_id {
            Some(self.player_two_id)
        } else if player_id == self.player_two_id {
            Some(self.player_one_id)
        } else {
            None
        }
    }

    pub fn defense_summary_of(&self, player_id: Uuid) -> Option<&str> {
        if player_id == self.player_one_id {
            self.player_one_defense_summary.as_deref()
        } else if player_id == self.player_two_id {
            self.player_two_defense_summary.as_deref()
        } else {
            None
        }
    }
}

/// Conditional session update.
///
/// Only the fields set via `with_*` are applied; the write fails with an
/// `OPTIMISTIC_LOCK` conflict unless the stored `lock_version` still equals
/// `expected_lock_version`, and every successful write bumps the version.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub id: Uuid,
    pub expected_lock_version: i32,
    pub phase: Option<Phase>,
    pub is_transitioning: Option<bool>,
    /// Outer Option = "apply this field"; inner Option = the new value.
    pub transition_ends_at: Option<Option<OffsetDateTime>>,
    pub winner_id: Option<Uuid>,
    pub end_reason: Option<EndReason>,
    pub player_one_defense_summary: Option<String>,
    pub player_two_defense_summary: Option<String>,
}

impl SessionUpdate {
    pub fn new(id: Uuid, expected_lock_version: i32) -> Self {
        Self {
            id,
            expected_lock_version,
            ..Self::default()
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Arm the countdown: flag on, deadline set.
    pub fn with_transition_started(mut self, ends_at: OffsetDateTime) -> Self {
        self.is_transitioning = Some(true);
        self.transition_ends_at = Some(Some(ends_at));
        self
    }

    /// Clear the countdown: flag off, deadline gone.
    pub fn with_transition_cleared(mut self) -> Self {
        self.is_transitioning = Some(false);
        self.transition_ends_at = Some(None);
        self
    }

    pub fn with_outcome(mut self, winner_id: Uuid, end_reason: EndReason) -> Self {
        self.winner_id = Some(winner_id);
        self.end_reason = Some(end_reason);
        self
    }

    pub fn with_defense_summary(mut self, for_player_one: bool, summary: String) -> Self {
        if for_player_one {
            self.player_one_defense_summary = Some(summary);
        } else {
            self.player_two_defense_summary = Some(summary);
        }
        self
    }
}

/// Find a session or convert the miss into a `DomainError`, eliminating the
/// repetitive `ok_or_else` pattern when a session must exist.
pub async fn require_session(store: &dyn GameStore, id: Uuid) -> Result<Session, DomainError> {
    store.find_session(id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Session, format!("Session {id} not found"))
    })
}
