//! Responder and Judge capability traits.
//!
//! Both are black boxes to the engine: "given a prompt and history, produce
//! a reply" and "given a conversation, produce a verdict". Failures map to
//! `EXTERNAL_SERVICE_FAILURE` and never leave partial state behind.

use std::fmt;

use async_trait::async_trait;

use crate::errors::domain::DomainError;
use crate::repos::turns::Turn;

/// Errors that can occur during a Responder or Judge round trip.
#[derive(Debug)]
pub enum AiError {
    /// The call did not complete within the client timeout
    Timeout,
    /// Transport or HTTP-level failure
    Transport(String),
    /// The service answered but the payload was unusable
    Malformed(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Timeout => write!(f, "AI call timed out"),
            AiError::Transport(msg) => write!(f, "AI transport error: {msg}"),
            AiError::Malformed(msg) => write!(f, "AI malformed response: {msg}"),
        }
    }
}

impl std::error::Error for AiError {}

impl From<AiError> for DomainError {
    fn from(err: AiError) -> Self {
        DomainError::external(err.to_string())
    }
}

/// Everything the Responder needs to produce the persona's next reply.
///
/// `defense_summary` is the opponent's stored training summary and is only
/// present during the attack phase.
pub struct ReplyContext<'a> {
    pub character: &'a str,
    pub secret: &'a str,
    pub defense_summary: Option<&'a str>,
    /// Prior exchanges for (session, player, phase), oldest first.
    pub history: &'a [Turn],
    pub message: &'a str,
}

/// Produces the persona's replies and the end-of-defense training summary.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, ctx: &ReplyContext<'_>) -> Result<String, AiError>;

    /// Condense a finished defense conversation into the summary that will
    /// frame the opponent's attack phase.
    async fn summarize_defense(&self, turns: &[Turn]) -> Result<String, AiError>;
}

/// Rules whether an attack conversation extracted the secret.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn secret_revealed(&self, secret: &str, attack_turns: &[Turn]) -> Result<bool, AiError>;
}
