use serde::{Deserialize, Serialize};

/// Overall session progression phases.
///
/// Turn submission is only legal in `Defense` and `Attack`; `Complete` is
/// terminal. The countdown window between `Defense` and `Attack` is not a
/// phase of its own — it is the `is_transitioning` flag on the session, and
/// the stored phase stays at `Defense` until the countdown commits.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Both players train their own persona.
    Defense,
    /// Both players try to extract the opponent's secret.
    Attack,
    /// Terminal; `winner_id` and `end_reason` are set.
    Complete,
}

impl Phase {
    /// The phase a countdown out of `self` commits into.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Defense => Some(Phase::Attack),
            Phase::Attack => Some(Phase::Complete),
            Phase::Complete => None,
        }
    }

    /// Whether turns may be submitted in this phase.
    pub fn accepts_turns(self) -> bool {
        matches!(self, Phase::Defense | Phase::Attack)
    }
}

/// Why a session reached `Complete`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndReason {
    /// The Judge ruled the winner's attack conversation extracted the secret.
    SecretRevealed,
    /// Both players used every attack turn without a YES verdict.
    TurnsExhausted,
    /// The loser conceded.
    Forfeit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_progression_is_linear() {
        assert_eq!(Phase::Defense.next(), Some(Phase::Attack));
        assert_eq!(Phase::Attack.next(), Some(Phase::Complete));
        assert_eq!(Phase::Complete.next(), None);
    }

    #[test]
    fn wire_format_is_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::Defense).unwrap(), "\"DEFENSE\"");
        assert_eq!(
            serde_json::to_string(&EndReason::SecretRevealed).unwrap(),
            "\"SECRET_REVEALED\""
        );
    }
}
