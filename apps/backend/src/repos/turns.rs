//! Turn domain model.
//!
//! Turns are the only record of play: per-phase counts are derived by
//! counting rows, never kept in a separate counter that could drift from
//! the log. Rows are append-only and immutable.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::phase::Phase;

/// One message/response exchange, scoped to (session, player, phase).
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: Uuid,
    pub session_id: Uuid,
    pub player_id: Uuid,
    pub phase: Phase,
    /// 1-based, gapless per (session, player, phase). Uniqueness of the full
    /// triple + number is enforced by the store and is what serializes two
    /// same-player submissions racing past the limit check.
    pub turn_number: u32,
    pub player_message: String,
    pub ai_response: String,
    pub created_at: OffsetDateTime,
}

impl Turn {
    pub fn new(
        session_id: Uuid,
        player_id: Uuid,
        phase: Phase,
        turn_number: u32,
        player_message: impl Into<String>,
        ai_response: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            player_id,
            phase,
            turn_number,
            player_message: player_message.into(),
            ai_response: ai_response.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
