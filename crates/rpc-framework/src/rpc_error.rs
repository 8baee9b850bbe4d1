//! # RPC Errors
//!
//! The error taxonomy every procedure failure is reduced to before it leaves the
//! router, and the envelope a transport renders it into.

use crate::schema::Violation;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant a client can match on programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input failed schema validation; the handler never ran.
    BadInput,
    /// A lookup by id (or by procedure name) found nothing.
    NotFound,
    /// A uniqueness constraint would be violated.
    Conflict,
    /// A query was invoked as a mutation or the other way round.
    MethodNotSupported,
    /// Anything else, including a handler breaking its own output schema.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadInput => "BAD_INPUT",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::BadInput => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed procedure call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct RpcError {
    pub code: ErrorCode,
    pub message: String,
    /// Field-level detail; only populated for [`ErrorCode::BadInput`].
    pub issues: Vec<Violation>,
}

/// Message sent in place of an internal error's own when details are hidden.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub fn bad_input(message: impl Into<String>, issues: Vec<Violation>) -> Self {
        Self {
            issues,
            ..Self::new(ErrorCode::BadInput, message)
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn method_not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MethodNotSupported, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Renders the wire envelope. Internal messages are replaced by
    /// [`INTERNAL_MESSAGE`] unless `expose_internal` is set.
    pub fn to_envelope(&self, expose_internal: bool) -> ErrorEnvelope {
        let message = if self.code == ErrorCode::Internal && !expose_internal {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.message.clone()
        };
        ErrorEnvelope {
            code: self.code,
            message,
            issues: self.issues.clone(),
        }
    }
}

/// Error body returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Violation>,
}
