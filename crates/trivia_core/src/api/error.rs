//! Status-code policy for the API boundary.

use crate::api::auth::AuthError;
use crate::service::trivia_service::ServiceError;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Boundary error carrying the status code returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    /// Internal detail for logs; never sent to the caller.
    pub detail: String,
}

impl ApiError {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, detail)
    }

    pub fn method_not_allowed(detail: impl Into<String>) -> Self {
        Self::new(405, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(422, detail)
    }

    /// Public message for this status.
    pub fn message(&self) -> &'static str {
        status_message(self.status)
    }

    /// `{success: false, error, message}` envelope.
    pub fn to_body(&self) -> Value {
        json!({
            "success": false,
            "error": self.status,
            "message": self.message(),
        })
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.message(), self.detail)
    }
}

impl Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        let status = if value.is_not_found() {
            404
        } else if matches!(value, ServiceError::Unprocessable(_)) {
            422
        } else {
            500
        };
        Self::new(status, value.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        Self::new(value.status(), value.to_string())
    }
}

/// Public message for a status code.
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "bad request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "resource not found",
        405 => "method not allowed",
        422 => "unprocessable",
        _ => "internal server error",
    }
}
