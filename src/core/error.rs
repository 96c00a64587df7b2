use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ErrorResponse, MatchStatus};
use crate::services::StoreError;

/// Errors surfaced by the matching core.
///
/// NotFound-class and Conflict-class errors are terminal for the request;
/// only `Store` failures are transient and worth a caller-side retry.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("person {0} not found")]
    PersonNotFound(String),

    #[error("candidate {0} not found")]
    CandidateNotFound(String),

    #[error("match {0} not found")]
    MatchNotFound(Uuid),

    #[error("candidate {0} is not taking match requests right now")]
    CandidateUnavailable(String),

    #[error("group {0} is at full capacity")]
    GroupFull(String),

    #[error("a match request with candidate {0} is already pending")]
    DuplicatePending(String),

    #[error("a {from:?} match cannot move to {to:?}")]
    InvalidTransition { from: MatchStatus, to: MatchStatus },

    #[error("store failure: {0}")]
    Store(StoreError),
}

impl MatchError {
    fn label(&self) -> &'static str {
        match self {
            MatchError::PersonNotFound(_)
            | MatchError::CandidateNotFound(_)
            | MatchError::MatchNotFound(_) => "not_found",
            MatchError::CandidateUnavailable(_)
            | MatchError::GroupFull(_)
            | MatchError::DuplicatePending(_)
            | MatchError::InvalidTransition { .. } => "conflict",
            MatchError::Store(_) => "store_unavailable",
        }
    }
}

impl actix_web::ResponseError for MatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            MatchError::PersonNotFound(_)
            | MatchError::CandidateNotFound(_)
            | MatchError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            MatchError::CandidateUnavailable(_)
            | MatchError::GroupFull(_)
            | MatchError::DuplicatePending(_)
            | MatchError::InvalidTransition { .. } => StatusCode::CONFLICT,
            MatchError::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.label().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
