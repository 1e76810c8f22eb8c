//! Per-session channel registry - the production `EventSink`.
//!
//! Connections subscribe per session topic (participants only, enforced at
//! subscribe time in the session actor). Delivery uses `do_send` and ignores
//! errors: a full or closed mailbox means a missed event, and the client
//! reconciles via a full state read.

use actix::prelude::*;
use dashmap::DashMap;
use uuid::Uuid;

use crate::events::{EventSink, SessionEvent};

/// Engine event scoped to one session topic, as delivered to connections.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct SessionEventMsg {
    pub session_id: Uuid,
    pub event: SessionEvent,
}

/// session_id → (connection id → mailbox)
#[derive(Default)]
pub struct ChannelRegistry {
    channels: DashMap<Uuid, DashMap<Uuid, Recipient<SessionEventMsg>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, session_id: Uuid, conn_id: Uuid, recipient: Recipient<SessionEventMsg>) {
        let entry = self.channels.entry(session_id).or_default();
        entry.insert(conn_id, recipient);
    }

    pub fn unsubscribe(&self, session_id: Uuid, conn_id: Uuid) {
        if let Some(entry) = self.channels.get(&session_id) {
            entry.remove(&conn_id);
            if entry.is_empty() {
                drop(entry);
                self.channels.remove_if(&session_id, |_, conns| conns.is_empty());
            }
        }
    }

    /// Drop a closed connection from every topic it joined.
    pub fn unsubscribe_all(&self, conn_id: Uuid) {
        for entry in self.channels.iter() {
            entry.value().remove(&conn_id);
        }
        self.channels.retain(|_, conns| !conns.is_empty());
    }

    pub fn subscriber_count(&self, session_id: Uuid) -> usize {
        self.channels
            .get(&session_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}

impl EventSink for ChannelRegistry {
    fn publish(&self, session_id: Uuid, event: SessionEvent) {
        if let Some(entry) = self.channels.get(&session_id) {
            for recipient in entry.iter() {
                let _ = recipient.value().do_send(SessionEventMsg {
                    session_id,
                    event: event.clone(),
                });
            }
        }
    }
}
