//! HTTP error responses
//!
//! Client failures become `{"status":"fail","message":...}` with the
//! message returned verbatim. Server faults become
//! `{"status":"error","message":"Internal server error"}` and the detail is
//! only logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use openmusic_common::Error;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unverified identity headers, or unknown user (401)
    #[error("Missing or unknown user identity")]
    Unauthenticated,

    /// Request body failed to parse or validate (400)
    #[error("{0}")]
    InvalidPayload(String),

    /// Store or service failure
    #[error(transparent)]
    Common(#[from] Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Common(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Common(Error::Authorization(_)) => StatusCode::FORBIDDEN,
            ApiError::Common(Error::Invariant(_)) => StatusCode::BAD_REQUEST,
            ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if status.is_server_error() {
            error!(error = %self, "Request failed with server error");
            json!({
                "status": "error",
                "message": "Internal server error",
            })
        } else {
            warn!(status = status.as_u16(), message = %self, "Request rejected");
            json!({
                "status": "fail",
                "message": self.to_string(),
            })
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InvalidPayload("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::not_found("x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(Error::authorization("x")).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(Error::invariant("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::Internal("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
