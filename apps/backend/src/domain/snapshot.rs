//! Client-facing session views.
//!
//! A snapshot is always rebuilt from the authoritative store, never from
//! in-memory counters, so a client that only polls reconstructs exactly the
//! state an event-listening client accumulated. The countdown is recomputed
//! from the stored deadline, which is what lets a reconnecting client resume
//! mid-transition without having seen any tick.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::phase::{EndReason, Phase};
use crate::repos::turns::Turn;

/// What a participant sees; spectators get the bare indicator instead.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionView {
    Snapshot(SessionSnapshot),
    Spectating,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    /// Stored phase; lags the countdown target while `transition.is_transitioning`.
    pub phase: Phase,
    pub my_turn_count: u32,
    pub opponent_turn_count: u32,
    /// The requesting player's turns for the current phase, in order.
    pub turns: Vec<TurnView>,
    pub is_game_complete: bool,
    pub winner_id: Option<Uuid>,
    pub end_reason: Option<EndReason>,
    pub transition: TransitionView,
}

/// One message/reply exchange as shown to its author.
#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub turn_number: u32,
    pub player_message: String,
    pub ai_response: String,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        Self {
            turn_number: turn.turn_number,
            player_message: turn.player_message.clone(),
            ai_response: turn.ai_response.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionView {
    pub is_transitioning: bool,
    /// Remaining whole seconds, recomputed from the deadline; absent when idle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_phase: Option<Phase>,
}

impl TransitionView {
    pub fn idle() -> Self {
        Self {
            is_transitioning: false,
            countdown: None,
            next_phase: None,
        }
    }
}

/// Whole seconds until `ends_at`, rounded up, clamped at zero.
///
/// Successive calls can only return equal or smaller values as time passes,
/// which is what keeps a polling client's countdown monotonic.
pub fn remaining_seconds(ends_at: OffsetDateTime, now: OffsetDateTime) -> u8 {
    let remaining = ends_at - now;
    let millis = remaining.whole_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis as u128).div_ceil(1000).min(u8::MAX as u128) as u8
}
