//! Game session engine - the phase state machine behind turn submission,
//! transition timing, win-condition evaluation, and event fanout.
//!
//! The service holds no session state of its own: every operation re-reads
//! the authoritative store immediately before deciding and writes
//! conditionally, so concurrent submissions race at the store, not in here.

mod completion;
mod snapshot;
mod submit;
mod transition;

use std::sync::Arc;

use tracing::info;

use crate::ai::{Judge, Responder};
use crate::config::GameConfig;
use crate::domain::scenario;
use crate::errors::domain::DomainError;
use crate::events::EventSink;
use crate::repos::sessions::Session;
use crate::repos::store::GameStore;

pub use submit::TurnOutcome;

/// Session engine. Cheap to clone; the countdown task holds a clone.
#[derive(Clone)]
pub struct GameFlowService {
    store: Arc<dyn GameStore>,
    responder: Arc<dyn Responder>,
    judge: Arc<dyn Judge>,
    events: Arc<dyn EventSink>,
    config: GameConfig,
}

impl GameFlowService {
    pub fn new(
        store: Arc<dyn GameStore>,
        responder: Arc<dyn Responder>,
        judge: Arc<dyn Judge>,
        events: Arc<dyn EventSink>,
        config: GameConfig,
    ) -> Self {
        Self {
            store,
            responder,
            judge,
            events,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Create a DEFENSE-phase session for a freshly matched pair. The persona
    /// and secret are fixed here and never change for the session's lifetime.
    pub async fn create_from_match(
        &self,
        player_one_id: uuid::Uuid,
        player_two_id: uuid::Uuid,
    ) -> Result<Session, DomainError> {
        let (character, secret) = scenario::generate();
        let session = Session::new(player_one_id, player_two_id, character, secret);
        let session = self.store.insert_session(session).await?;
        info!(
            session_id = %session.id,
            player_one = %player_one_id,
            player_two = %player_two_id,
            "session created"
        );
        Ok(session)
    }
}
