//! Domain-level error type used across services and adapters.
//!
//! This error type is HTTP-agnostic. Handlers should return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Domain-level not found entities (minimal set; extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Session,
    Other(String),
}

/// Input validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    MessageTooLong,
    EmptyMessage,
    Other(String),
}

/// Domain-level conflict kinds.
///
/// The first three are the turn-submission precondition failures; the last
/// two are retryable write races surfaced by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    GameOver,
    TransitionInProgress,
    LimitReached,
    ConcurrentSubmission,
    OptimisticLock,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Caller is neither of the session's participants
    NotAParticipant(String),
    /// Responder or Judge round trip failed
    External(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::NotAParticipant(d) => write!(f, "not a participant: {d}"),
            DomainError::External(d) => write!(f, "external service failure: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn not_a_participant(detail: impl Into<String>) -> Self {
        Self::NotAParticipant(detail.into())
    }
    pub fn external(detail: impl Into<String>) -> Self {
        Self::External(detail.into())
    }
}
