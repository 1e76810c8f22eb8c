//! Error codes for the promptduel backend API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the promptduel backend API.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string that appears
/// in HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Resource Not Found
    /// Session not found
    NotFound,

    // Authorization
    /// Caller is not one of the session's two participants
    NotAParticipant,

    // Turn Preconditions
    /// Session already completed
    GameOver,
    /// A phase transition countdown is active
    TransitionInProgress,
    /// Player already used every turn in the current phase
    LimitReached,

    // Request Validation
    /// Message exceeds the per-message character limit
    MessageTooLong,
    /// Empty or otherwise malformed message body
    ValidationError,
    /// General bad request error
    BadRequest,

    // Conflicts
    /// Two submissions from the same player raced; retry
    ConcurrentSubmission,
    /// Optimistic lock conflict on a session write
    OptimisticLock,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Responder or Judge call failed
    ExternalServiceFailure,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    ///
    /// This is the exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::NotAParticipant => "NOT_A_PARTICIPANT",
            Self::GameOver => "GAME_OVER",
            Self::TransitionInProgress => "TRANSITION_IN_PROGRESS",
            Self::LimitReached => "LIMIT_REACHED",
            Self::MessageTooLong => "MESSAGE_TOO_LONG",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::ConcurrentSubmission => "CONCURRENT_SUBMISSION",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::Conflict => "CONFLICT",
            Self::ExternalServiceFailure => "EXTERNAL_SERVICE_FAILURE",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
