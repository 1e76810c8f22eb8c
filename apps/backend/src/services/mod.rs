//! Application services: matchmaking and the game session engine.

pub mod game_flow;
pub mod matchmaking;

pub use game_flow::{GameFlowService, TurnOutcome};
pub use matchmaking::{Enqueued, Matchmaker, QueueEntry};
