//! Error types for lunacy-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lunacy_core::{CoreError, ErrorCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

/// JSON error body
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<String>,
}

impl ErrorBody {
    fn plain(code: &str, error: &ApiError) -> Self {
        Self {
            code: code.to_string(),
            message: error.to_string(),
            details: None,
            suggestions: vec![],
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(e) => match e.code() {
                ErrorCode::FeedUnavailable => StatusCode::BAD_GATEWAY,
                ErrorCode::InvalidFeed => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::TransactionNotFound => StatusCode::NOT_FOUND,
                ErrorCode::InvalidTableState => StatusCode::BAD_REQUEST,
            },
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Core(e) => {
                let details = e.to_details();
                ErrorBody {
                    code: details.code.to_string(),
                    message: details.message,
                    details: details.details,
                    suggestions: details.suggestions,
                }
            }
            ApiError::NotFound { .. } => ErrorBody::plain("NOT_FOUND", self),
            ApiError::InternalError { .. } => ErrorBody::plain("INTERNAL_ERROR", self),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{} {}", status, self);
        } else {
            log::debug!("{} {}", status, self);
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let fetch = ApiError::from(CoreError::FeedUnavailable {
            origin: "feed.json".to_string(),
            message: "gone".to_string(),
        });
        assert_eq!(fetch.status(), StatusCode::BAD_GATEWAY);

        let schema = ApiError::from(CoreError::InvalidFeed { violations: vec![] });
        assert_eq!(schema.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = ApiError::from(CoreError::TransactionNotFound { id: "x".to_string() });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        assert_eq!(
            ApiError::NotFound { resource: "a".to_string() }.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_body_carries_core_details() {
        let error = ApiError::from(CoreError::InvalidFeed {
            violations: vec!["transactions[0].amount: expected number, found string".to_string()],
        });
        let body = serde_json::to_value(error.body()).unwrap();
        assert_eq!(body["code"], "INVALID_FEED");
        assert_eq!(body["details"]["violations"][0], "transactions[0].amount: expected number, found string");
        assert!(body["suggestions"].as_array().is_some());
    }
}
