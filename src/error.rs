//! Typed errors and the centralized HTTP translation stage.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Route-table configuration errors. Any of these at startup must prevent the
/// process from serving.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("controller '{controller}' does not support action '{action}'")]
    UnsupportedAction {
        controller: &'static str,
        action: &'static str,
    },
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute {
        method: &'static str,
        path: &'static str,
    },
}

/// One field-level validation failure.
#[derive(Clone, Debug, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Violation {
        Violation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("{message}")]
    Validation {
        message: String,
        violations: Vec<Violation>,
    },
    #[error("Action not allowed")]
    ActionNotAllowed,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal: {0}")]
    Internal(String),
}

impl HttpError {
    /// Validation failure carrying every field violation found.
    pub fn input_error(violations: Vec<Violation>) -> HttpError {
        HttpError::Validation {
            message: "Input validation failed".into(),
            violations,
        }
    }

    pub fn action_not_allowed() -> HttpError {
        HttpError::ActionNotAllowed
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::ActionNotAllowed | HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Conflict(_) => StatusCode::CONFLICT,
            HttpError::Store(_) | HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            HttpError::Validation { .. } => "validation_error",
            HttpError::ActionNotAllowed | HttpError::Unauthorized(_) => "unauthorized",
            HttpError::BadRequest(_) => "bad_request",
            HttpError::Conflict(_) => "conflict",
            HttpError::Store(_) => "database_error",
            HttpError::Internal(_) => "internal_error",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error-body constructor shared with the unknown-route stage.
pub fn error_body(code: &str, message: String, details: Option<serde_json::Value>) -> ErrorBody {
    ErrorBody {
        error: ErrorDetail {
            code: code.to_string(),
            message,
            details,
        },
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let details = match &self {
            HttpError::Validation { violations, .. } => {
                serde_json::to_value(violations).ok()
            }
            _ => None,
        };
        // Internal causes stay in the logs; clients get the generic message.
        let message = match &self {
            HttpError::Store(_) | HttpError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        let body = error_body(self.code(), message, details);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            HttpError::input_error(vec![]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(HttpError::action_not_allowed().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            HttpError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HttpError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(HttpError::Conflict("x".into()).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn action_not_allowed_message() {
        assert_eq!(HttpError::action_not_allowed().to_string(), "Action not allowed");
    }
}
