use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Domain failures, converted exactly once into a JSON body at the boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    /// Missing credentials or an identity that no longer resolves.
    #[error("{0}")]
    Unauthenticated(String),
    /// A token was presented but failed verification. Distinct status from
    /// the missing-header case.
    #[error("{0}")]
    TokenRejected(String),
    #[error("{0}")]
    Locked(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Duplicate email. Surfaced as 400, matching the register contract.
    #[error("{0}")]
    Conflict(String),
    /// Anything that went wrong while talking to the identity provider.
    /// The detail stays in the logs.
    #[error("Authentication with the identity provider failed")]
    Upstream,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) | ApiError::Forbidden(_) | ApiError::Upstream => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::TokenRejected(_) => StatusCode::FORBIDDEN,
            ApiError::Locked(_) => StatusCode::LOCKED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(e) => {
                error!(error = %e, "unhandled internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthenticated("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::TokenRejected("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::Locked("x".into()).status(), StatusCode::LOCKED);
        assert_eq!(
            ApiError::Forbidden("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Upstream.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_message_is_opaque() {
        let msg = ApiError::Upstream.to_string();
        assert!(!msg.contains("reqwest"));
        assert!(!msg.contains("timeout"));
    }

    #[test]
    fn internal_errors_hide_their_detail() {
        let response = ApiError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
