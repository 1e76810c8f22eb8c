//! FIFO matchmaking queue.
//!
//! The queue is an explicit component with a single internal mutex; every
//! mutation goes through `enqueue`/`cancel`. Entries are ephemeral — they
//! live only until pairing or cancellation and are never persisted. There is
//! no priority, region, or skill matching: any two players pair in arrival
//! order.
//!
//! The queue issues no notifications. On a match the caller creates the
//! session and notifies both entries through their channel handles; the
//! handle type is generic so the queue has no dependency on the realtime
//! layer.

use std::collections::VecDeque;

use parking_lot::Mutex;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct QueueEntry<C> {
    pub player_id: Uuid,
    /// Realtime-delivery address for the eventual match notification.
    pub channel: C,
    pub joined_at: OffsetDateTime,
}

/// Outcome of an `enqueue` call.
#[derive(Debug)]
pub enum Enqueued<C> {
    /// The two oldest entries were removed and paired; the caller is one of
    /// them. Caller creates the session and notifies both channels.
    Matched {
        player_one: QueueEntry<C>,
        player_two: QueueEntry<C>,
    },
    /// Caller's 1-based position in the queue.
    Waiting { position: usize },
}

pub struct Matchmaker<C> {
    queue: Mutex<VecDeque<QueueEntry<C>>>,
}

impl<C> Default for Matchmaker<C> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl<C> Matchmaker<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and try to pair. A player already in the queue has their stale
    /// entry replaced first, so a reconnecting socket cannot be matched
    /// against its own ghost.
    pub fn enqueue(&self, player_id: Uuid, channel: C) -> Enqueued<C> {
        let mut queue = self.queue.lock();
        queue.retain(|entry| entry.player_id != player_id);
        queue.push_back(QueueEntry {
            player_id,
            channel,
            joined_at: OffsetDateTime::now_utc(),
        });

        if queue.len() >= 2 {
            // Pop the two oldest; the oldest becomes player one.
            let player_one = queue.pop_front();
            let player_two = queue.pop_front();
            if let (Some(player_one), Some(player_two)) = (player_one, player_two) {
                debug!(
                    player_one = %player_one.player_id,
                    player_two = %player_two.player_id,
                    "queue matched"
                );
                return Enqueued::Matched {
                    player_one,
                    player_two,
                };
            }
        }

        Enqueued::Waiting {
            position: queue.len(),
        }
    }

    /// Remove all entries for a player. Idempotent; absent players are fine.
    pub fn cancel(&self, player_id: Uuid) {
        let mut queue = self.queue.lock();
        queue.retain(|entry| entry.player_id != player_id);
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
