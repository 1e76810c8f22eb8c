use std::sync::Arc;

use actix::prelude::Recipient;

use crate::ai::{Judge, Responder};
use crate::config::GameConfig;
use crate::repos::store::GameStore;
use crate::services::game_flow::GameFlowService;
use crate::services::matchmaking::Matchmaker;
use crate::ws::hub::ChannelRegistry;
use crate::ws::session::QueueNotice;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    pub flow: GameFlowService,
    pub matchmaking: Arc<Matchmaker<Recipient<QueueNotice>>>,
    pub registry: Arc<ChannelRegistry>,
}

impl AppState {
    /// Wire the engine to the websocket registry as its event sink.
    pub fn new(
        store: Arc<dyn GameStore>,
        responder: Arc<dyn Responder>,
        judge: Arc<dyn Judge>,
        config: GameConfig,
    ) -> Self {
        let registry = Arc::new(ChannelRegistry::new());
        let flow = GameFlowService::new(store, responder, judge, registry.clone(), config);
        Self {
            flow,
            matchmaking: Arc::new(Matchmaker::new()),
            registry,
        }
    }

    /// Assemble from pre-built parts (tests swap in their own sink/flow).
    pub fn from_parts(flow: GameFlowService, registry: Arc<ChannelRegistry>) -> Self {
        Self {
            flow,
            matchmaking: Arc::new(Matchmaker::new()),
            registry,
        }
    }
}
