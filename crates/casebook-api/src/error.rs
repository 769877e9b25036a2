//! # API Error Types
//!
//! Every failure in the gateway is one of two shapes:
//!
//! - [`HttpError`] — a *recognized* HTTP error carrying the status code and
//!   message the raiser intends the client to see.
//! - an opaque [`anyhow::Error`] — anything else (bugs, caught panics,
//!   unexpected collaborator failures).
//!
//! Handlers and extractors never render error bodies themselves. Turning an
//! [`ApiError`] into a response only attaches a [`Failure`] marker to a
//! placeholder response; the error normalizer middleware
//! ([`crate::middleware::normalize`]) is the single place that decides the
//! final status and JSON envelope.

use std::sync::Arc;

use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use casebook_core::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A recognized HTTP error: an intended status code plus a client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Create an error with an explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Create an error whose message is the status' canonical reason phrase.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Unknown Error"))
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401 Unauthorized.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 409 Conflict.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// 415 Unsupported Media Type.
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    /// 422 Unprocessable Entity.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// The intended HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the message is meant for clients (all 4xx errors).
    pub fn expose(&self) -> bool {
        self.status.is_client_error()
    }

    /// Structured form of the error, attached to envelopes in development mode.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status.as_u16(),
            "statusCode": self.status.as_u16(),
            "expose": self.expose(),
            "message": self.message,
        })
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for HttpError {}

/// Application-level failure, distinguishing recognized HTTP errors from opaque ones.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Recognized HTTP error with a declared status and message.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Any other failure. Its detail is logged, never sent to clients in production.
    #[error(transparent)]
    Opaque(#[from] anyhow::Error),
}

impl ApiError {
    /// Wrap an arbitrary error as an opaque failure.
    pub fn opaque<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Opaque(anyhow::Error::new(err))
    }

    /// The recognized HTTP error, if this is one.
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            Self::Opaque(_) => None,
        }
    }
}

/// Result type for handlers and extractors.
pub type ApiResult<T> = Result<T, ApiError>;

/// Marker carried in response extensions from the failing handler to the normalizer.
#[derive(Debug, Clone)]
pub struct Failure(pub Arc<ApiError>);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(Failure(Arc::new(self)));
        response
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        ApiError::Http(self).into_response()
    }
}

/// JSON error envelope returned for every normalized failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Raw error object; present only in development mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub error: Option<serde_json::Value>,
    /// Human-readable message.
    pub message: String,
}

// -- Conversions ---------------------------------------------------------------

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        Self::unprocessable(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Http(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::new(rejection.status(), rejection.body_text()).into()
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        HttpError::new(rejection.status(), rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        HttpError::new(rejection.status(), rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        HttpError::new(rejection.status(), rejection.body_text()).into()
    }
}
