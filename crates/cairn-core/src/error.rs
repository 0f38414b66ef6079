//! Error types for Cairn.
//!
//! This module provides the [`CairnError`] type, the single error type that
//! crosses every boundary in the resource server: store operations, patchers,
//! authorization stages and operation handlers all fail with exactly one of
//! its kinds.
//!
//! | `ErrorCategory` | Status | Raised when |
//! |---|---|---|
//! | `NotFound` | 404 | The target resource does not exist |
//! | `PreconditionFailed` | 412 | Request [`Conditions`](crate::Conditions) were violated |
//! | `Validation` | 400 | A representation, patch or identifier is malformed |
//! | `Unauthorized` | 401 | No usable identity where one is required |
//! | `Forbidden` | 403 | Identity present but the grant is insufficient |
//! | `Conflict` | 409 | The request conflicts with the current resource state |
//! | `Internal` | 500 | Unexpected backend failure |
//!
//! Decorators may add context to an error with [`CairnError::with_context`],
//! which never changes the error's category.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`CairnError`].
pub type CairnResult<T> = Result<T, CairnError>;

/// Categories of errors for classification and transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Target resource is absent.
    NotFound,
    /// Preconditions on the current resource state were not met.
    PreconditionFailed,
    /// Malformed patch, representation or identifier.
    Validation,
    /// Anonymous caller where identity is required.
    Unauthorized,
    /// Authenticated caller without a sufficient grant.
    Forbidden,
    /// Conflict with the current resource state.
    Conflict,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::PreconditionFailed => "PRECONDITION_FAILED",
            Self::Validation => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Standard error type for Cairn.
///
/// # Example
///
/// ```
/// use cairn_core::{CairnError, ErrorCategory};
///
/// fn check_slug(slug: &str) -> Result<(), CairnError> {
///     if slug.contains('/') {
///         return Err(CairnError::validation("slug must not contain '/'"));
///     }
///     Ok(())
/// }
///
/// let err = check_slug("a/b").unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// ```
#[derive(Error, Debug)]
pub enum CairnError {
    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The identifier that was not found.
        identifier: Option<String>,
    },

    /// Conditions were violated; nothing was changed.
    #[error("Precondition failed: {message}")]
    PreconditionFailed {
        /// Human-readable error message.
        message: String,
    },

    /// Malformed input.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Credentials are required.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message.
        message: String,
    },

    /// Credentials are present but do not grant access.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable error message.
        message: String,
    },

    /// Request conflicts with the current state of the resource.
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl CairnError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            identifier: None,
        }
    }

    /// Creates a not found error for a specific identifier.
    #[must_use]
    pub fn not_found_resource(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self::NotFound {
            message: format!("resource '{identifier}' does not exist"),
            identifier: Some(identifier),
        }
    }

    /// Creates a precondition failed error.
    #[must_use]
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::PreconditionFailed { .. } => ErrorCategory::PreconditionFailed,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Unauthorized { .. } => ErrorCategory::Unauthorized,
            Self::Forbidden { .. } => ErrorCategory::Forbidden,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns `true` if this is a [`CairnError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Prefixes the message with `context`, keeping the category unchanged.
    #[must_use]
    pub fn with_context(self, context: impl std::fmt::Display) -> Self {
        match self {
            Self::NotFound {
                message,
                identifier,
            } => Self::NotFound {
                message: format!("{context}: {message}"),
                identifier,
            },
            Self::PreconditionFailed { message } => Self::PreconditionFailed {
                message: format!("{context}: {message}"),
            },
            Self::Validation { message } => Self::Validation {
                message: format!("{context}: {message}"),
            },
            Self::Unauthorized { message } => Self::Unauthorized {
                message: format!("{context}: {message}"),
            },
            Self::Forbidden { message } => Self::Forbidden {
                message: format!("{context}: {message}"),
            },
            Self::Conflict { message } => Self::Conflict {
                message: format!("{context}: {message}"),
            },
            Self::Internal { message, source } => Self::Internal {
                message: format!("{context}: {message}"),
                source,
            },
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let category = self.category();
        ErrorEnvelope {
            error: ErrorDetail {
                code: category.code().to_string(),
                message: self.to_string(),
                category,
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::NotFound {
                identifier: Some(identifier),
                ..
            } => Some(serde_json::json!({ "identifier": identifier })),
            _ => None,
        }
    }
}

/// Serializable error envelope for transport responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
