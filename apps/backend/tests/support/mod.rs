//! Shared helpers for integration tests: a scripted AI, a collecting event
//! sink, and a harness that wires them into a `GameFlowService` over the
//! in-memory store.

#![allow(dead_code)] // each test binary uses a different subset

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use backend::ai::{AiError, Judge, ReplyContext, Responder};
use backend::config::GameConfig;
use backend::events::{EventSink, SessionEvent};
use backend::repos::sessions::Session;
use backend::repos::store::GameStore;
use backend::repos::turns::Turn;
use backend::{GameFlowService, MemoryStore};

/// Deterministic Responder/Judge double.
///
/// Replies are numbered so tests can assert ordering; judge verdicts pop
/// from a queue (defaulting to NO); a flag simulates a Responder outage.
#[derive(Default)]
pub struct ScriptedAi {
    reply_count: AtomicU32,
    fail_replies: AtomicBool,
    verdicts: Mutex<VecDeque<bool>>,
    /// The `defense_summary` seen by each reply call, in order.
    pub seen_summaries: Mutex<Vec<Option<String>>>,
    /// Secrets the judge was asked about, in order.
    pub judged_secrets: Mutex<Vec<String>>,
}

impl ScriptedAi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_replies(&self, fail: bool) {
        self.fail_replies.store(fail, Ordering::SeqCst);
    }

    pub fn push_verdict(&self, revealed: bool) {
        self.verdicts.lock().push_back(revealed);
    }

    pub fn replies_served(&self) -> u32 {
        self.reply_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Responder for ScriptedAi {
    async fn reply(&self, ctx: &ReplyContext<'_>) -> Result<String, AiError> {
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(AiError::Transport("scripted outage".into()));
        }
        self.seen_summaries
            .lock()
            .push(ctx.defense_summary.map(str::to_string));
        let n = self.reply_count.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("reply-{n}"))
    }

    async fn summarize_defense(&self, turns: &[Turn]) -> Result<String, AiError> {
        Ok(format!("summary-of-{}-turns", turns.len()))
    }
}

#[async_trait]
impl Judge for ScriptedAi {
    async fn secret_revealed(&self, secret: &str, _attack_turns: &[Turn]) -> Result<bool, AiError> {
        self.judged_secrets.lock().push(secret.to_string());
        Ok(self.verdicts.lock().pop_front().unwrap_or(false))
    }
}

/// EventSink that records everything it is asked to deliver.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<(Uuid, SessionEvent)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_for(&self, session_id: Uuid) -> Vec<SessionEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(id, _)| *id == session_id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn ticks_for(&self, session_id: Uuid) -> Vec<u8> {
        self.events_for(session_id)
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::TransitionTick { remaining } => Some(remaining),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectingSink {
    fn publish(&self, session_id: Uuid, event: SessionEvent) {
        self.events.lock().push((session_id, event));
    }
}

/// Everything an engine test needs, pre-wired.
pub struct TestHarness {
    pub flow: GameFlowService,
    pub store: Arc<MemoryStore>,
    pub ai: Arc<ScriptedAi>,
    pub sink: Arc<CollectingSink>,
    pub config: GameConfig,
}

impl TestHarness {
    pub fn with_config(config: GameConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let ai = Arc::new(ScriptedAi::new());
        let sink = Arc::new(CollectingSink::new());
        let flow = GameFlowService::new(
            store.clone(),
            ai.clone(),
            ai.clone(),
            sink.clone(),
            config.clone(),
        );
        Self {
            flow,
            store,
            ai,
            sink,
            config,
        }
    }

    /// Default harness: a small turn limit and a fast countdown so phase
    /// lifecycle tests finish quickly.
    pub fn new() -> Self {
        Self::with_config(GameConfig {
            turn_limit: 2,
            countdown_start: 2,
            tick_interval: std::time::Duration::from_millis(50),
            ..GameConfig::default()
        })
    }

    pub async fn seeded_session(&self) -> Session {
        let store: &dyn GameStore = self.store.as_ref();
        let session = Session::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "a suspicious guard".into(),
            "the password is blue42".into(),
        );
        store
            .insert_session(session)
            .await
            .expect("session insert must succeed")
    }

    /// Drive one player through their whole budget for the current phase.
    pub async fn exhaust_phase(&self, session_id: Uuid, player_id: Uuid) {
        for _ in 0..self.config.turn_limit {
            self.flow
                .submit_turn(session_id, player_id, "go")
                .await
                .expect("scripted submission must succeed");
        }
    }
}
