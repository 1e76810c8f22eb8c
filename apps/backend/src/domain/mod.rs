//! Pure domain types: phases, outcomes, scenarios, and client views.

pub mod phase;
pub mod scenario;
pub mod snapshot;

pub use phase::{EndReason, Phase};
