#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod ai;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod events;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod ws;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use adapters::memory::MemoryStore;
pub use config::GameConfig;
pub use error::AppError;
pub use middleware::cors::cors_middleware;
pub use services::game_flow::{GameFlowService, TurnOutcome};
pub use services::matchmaking::{Enqueued, Matchmaker};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
