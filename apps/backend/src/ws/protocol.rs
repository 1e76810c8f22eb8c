use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::phase::{EndReason, Phase};
use crate::events::SessionEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    JoinQueue,
    LeaveQueue,
    JoinSession { session_id: Uuid },
    LeaveSession { session_id: Uuid },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    Ack {
        message: &'static str,
    },

    QueueJoined {
        position: usize,
    },

    GameFound {
        session_id: Uuid,
        opponent_id: Uuid,
        phase: Phase,
    },

    TurnSubmitted {
        session_id: Uuid,
        player_id: Uuid,
        new_count: u32,
        message: String,
        reply: String,
    },

    TransitionTick {
        session_id: Uuid,
        remaining: u8,
    },

    TransitionEnded {
        session_id: Uuid,
    },

    GameComplete {
        session_id: Uuid,
        winner_id: Uuid,
        end_reason: EndReason,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

impl ServerMsg {
    /// Wire rendering of an engine event for one session topic.
    pub fn from_event(session_id: Uuid, event: SessionEvent) -> Self {
        match event {
            SessionEvent::TurnSubmitted {
                player_id,
                new_count,
                message,
                reply,
            } => ServerMsg::TurnSubmitted {
                session_id,
                player_id,
                new_count,
                message,
                reply,
            },
            SessionEvent::TransitionTick { remaining } => ServerMsg::TransitionTick {
                session_id,
                remaining,
            },
            SessionEvent::TransitionEnded => ServerMsg::TransitionEnded { session_id },
            SessionEvent::GameComplete {
                winner_id,
                end_reason,
            } => ServerMsg::GameComplete {
                session_id,
                winner_id,
                end_reason,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    Forbidden,
    NotFound,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::Forbidden => "forbidden",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Internal => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_msgs_parse_from_tagged_json() {
        let msg: ClientMsg = serde_json::from_str(r#"{"type":"join_queue"}"#).unwrap();
        assert!(matches!(msg, ClientMsg::JoinQueue));

        let id = Uuid::new_v4();
        let raw = format!(r#"{{"type":"join_session","session_id":"{id}"}}"#);
        let msg: ClientMsg = serde_json::from_str(&raw).unwrap();
        assert!(matches!(msg, ClientMsg::JoinSession { session_id } if session_id == id));
    }

    #[test]
    fn events_render_with_session_scope() {
        let session_id = Uuid::new_v4();
        let msg = ServerMsg::from_event(session_id, SessionEvent::TransitionTick { remaining: 3 });
        let raw = serde_json::to_value(&msg).unwrap();
        assert_eq!(raw["type"], "transition_tick");
        assert_eq!(raw["remaining"], 3);
        assert_eq!(raw["session_id"], session_id.to_string());
    }
}
