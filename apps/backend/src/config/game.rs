//! Game pacing configuration.

use std::env;
use std::time::Duration;

/// Engine constants, env-overridable for deployments and scenario tests.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Per-player turn budget for each of DEFENSE and ATTACK.
    pub turn_limit: u32,
    /// Upper bound on a single player message, in characters.
    pub max_message_chars: usize,
    /// Countdown start value; the transition window lasts
    /// `countdown_start * tick_interval`.
    pub countdown_start: u32,
    pub tick_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turn_limit: 5,
            max_message_chars: 250,
            countdown_start: 5,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl GameConfig {
    /// Environment overrides: `GAME_TURN_LIMIT`, `GAME_MAX_MESSAGE_CHARS`.
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            turn_limit: env_u32("GAME_TURN_LIMIT").unwrap_or(defaults.turn_limit),
            max_message_chars: env_u32("GAME_MAX_MESSAGE_CHARS")
                .map(|v| v as usize)
                .unwrap_or(defaults.max_message_chars),
            ..defaults
        }
    }

    /// Total countdown duration from entry write to the finalizing write.
    pub fn transition_window(&self) -> Duration {
        self.tick_interval * self.countdown_start
    }
}

fn env_u32(key: &str) -> Option<u32> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
