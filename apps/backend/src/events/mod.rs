//! Realtime event fanout seam.
//!
//! Services publish through `EventSink` and never wait on delivery:
//! fanout is best-effort, fire-and-forget, with no acknowledgment, retry,
//! or backlog. A participant who is disconnected at publish time misses the
//! event and reconciles via a full state read on reconnect.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::phase::EndReason;

/// State-change notifications delivered to both participants' channels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    TurnSubmitted {
        player_id: Uuid,
        new_count: u32,
        message: String,
        reply: String,
    },
    TransitionTick {
        remaining: u8,
    },
    TransitionEnded,
    GameComplete {
        winner_id: Uuid,
        end_reason: EndReason,
    },
}

/// Delivery seam between the session engine and the realtime layer.
///
/// The production implementation is the websocket channel registry; tests
/// substitute a collector. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn publish(&self, session_id: Uuid, event: SessionEvent);
}

/// Sink for contexts with no realtime layer attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _session_id: Uuid, _event: SessionEvent) {}
}
