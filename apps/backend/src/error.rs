use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{ConflictKind, DomainError};
use crate::errors::ErrorCode;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("External service failure: {detail}")]
    BadGateway { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// Helper method to extract the error code from any variant
    fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Forbidden { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::BadGateway { code, .. } => *code,
            AppError::Internal { .. } => ErrorCode::Internal,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Helper method to extract the error detail from any variant
    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::BadGateway { detail, .. }
            | AppError::Internal { detail }
            | AppError::Config { detail } => detail.clone(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self::BadGateway {
            code: ErrorCode::ExternalServiceFailure,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                use crate::errors::domain::ValidationKind;
                let code = match kind {
                    ValidationKind::MessageTooLong => ErrorCode::MessageTooLong,
                    _ => ErrorCode::ValidationError,
                };
                AppError::validation(code, detail)
            }
            DomainError::NotFound(_, detail) => AppError::not_found(ErrorCode::NotFound, detail),
            DomainError::NotAParticipant(detail) => {
                AppError::forbidden(ErrorCode::NotAParticipant, detail)
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::GameOver => ErrorCode::GameOver,
                    ConflictKind::TransitionInProgress => ErrorCode::TransitionInProgress,
                    ConflictKind::LimitReached => ErrorCode::LimitReached,
                    ConflictKind::ConcurrentSubmission => ErrorCode::ConcurrentSubmission,
                    ConflictKind::OptimisticLock => ErrorCode::OptimisticLock,
                    _ => ErrorCode::Conflict,
                };
                AppError::conflict(code, detail)
            }
            DomainError::External(detail) => AppError::bad_gateway(detail),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().to_string();
        let detail = self.detail();

        let problem_details = ProblemDetails {
            type_: format!("https://promptduel.app/errors/{code}"),
            title: Self::humanize_code(&code),
            status: status.as_u16(),
            detail,
            code,
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .json(problem_details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_conflicts_map_to_http_409() {
        for kind in [
            ConflictKind::GameOver,
            ConflictKind::TransitionInProgress,
            ConflictKind::LimitReached,
        ] {
            let err: AppError = DomainError::conflict(kind, "x").into();
            assert_eq!(err.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn spectator_rejection_is_forbidden() {
        let err: AppError = DomainError::not_a_participant("stranger").into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), ErrorCode::NotAParticipant);
    }

    #[test]
    fn external_failure_is_bad_gateway() {
        let err: AppError = DomainError::external("responder down").into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), ErrorCode::ExternalServiceFailure);
    }

    #[test]
    fn humanize_code_title_cases_words() {
        assert_eq!(AppError::humanize_code("LIMIT_REACHED"), "Limit Reached");
    }
}
