//! # Error Normalizer
//!
//! The terminal stage of the chain. Every failure, whether returned by a
//! handler, raised by an extractor, or caught as a panic, reaches this
//! middleware as a [`Failure`] marker on the response and leaves as a
//! JSON [`ErrorEnvelope`].
//!
//! For each failure a fresh [`ResponseContext`] is filled in:
//!
//! 1. A recognized [`HttpError`](crate::error::HttpError) records its message and status; in
//!    development the structured error object is attached as well.
//! 2. The raw error is logged.
//! 3. In production, a missing or empty message is replaced by
//!    `"ApplicationError"` with status 500, so unrecognized failures never
//!    leak detail.
//! 4. If a status is now known, the envelope is sent with that status.
//! 5. Otherwise the failure is deferred to [`defer`], the catch-all, which
//!    still answers with a JSON 500.

use std::any::Any;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use casebook_core::Environment;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::{ApiError, ErrorEnvelope, Failure};
use crate::supervisor::panic_message;

/// Message substituted for unrecognized failures in production.
pub const FALLBACK_MESSAGE: &str = "ApplicationError";

/// Message used by the catch-all when no status was determined.
pub const DEFERRED_MESSAGE: &str = "Internal Server Error";

/// Per-request scratch state staged before the error response is sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseContext {
    /// Text for the envelope's `message`.
    pub message: Option<String>,
    /// Response status; left empty for failures the catch-all must answer.
    pub status: Option<StatusCode>,
    /// Raw error object, staged in development only.
    pub error: Option<serde_json::Value>,
}

impl ResponseContext {
    /// Stage the envelope for `err` under `environment` (steps 1-3).
    pub fn stage(err: &ApiError, environment: &Environment) -> Self {
        let mut ctx = Self::default();

        if let ApiError::Http(http) = err {
            ctx.message = Some(http.message().to_string());
            ctx.status = Some(http.status());
            if environment.is_development() {
                ctx.error = Some(http.to_json());
            }
        }

        log_failure(err);

        if environment.is_production() && ctx.message.as_deref().map_or(true, str::is_empty) {
            ctx.message = Some(FALLBACK_MESSAGE.to_string());
            ctx.status = Some(StatusCode::INTERNAL_SERVER_ERROR);
        }

        ctx
    }

    /// Build the response if a status was determined (step 4).
    pub fn into_response(self) -> Option<Response> {
        let status = self.status?;
        let envelope = ErrorEnvelope {
            error: self.error,
            message: self.message.unwrap_or_default(),
        };
        Some((status, Json(envelope)).into_response())
    }
}

/// Normalize one failure; `None` means no status was determined.
pub fn normalize(err: &ApiError, environment: &Environment) -> Option<Response> {
    ResponseContext::stage(err, environment).into_response()
}

/// Catch-all for failures the normalizer left without a status.
///
/// Answers 500 with [`DEFERRED_MESSAGE`]; in development the error's
/// display chain is attached for local debugging.
pub fn defer(err: &ApiError, environment: &Environment) -> Response {
    let envelope = ErrorEnvelope {
        error: environment
            .is_development()
            .then(|| serde_json::Value::String(format!("{err:#}"))),
        message: DEFERRED_MESSAGE.to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
}

/// Middleware converting [`Failure`] markers into envelopes.
pub async fn normalize_errors(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(Failure(err)) = response.extensions_mut().remove::<Failure>() else {
        return response;
    };
    normalize(&err, &environment).unwrap_or_else(|| defer(&err, &environment))
}

/// Panic-catching layer type.
pub type CatchPanics = CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response>;

/// Layer turning handler panics into opaque failures.
pub fn catch_panics() -> CatchPanics {
    CatchPanicLayer::custom(panic_failure as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn panic_failure(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_message(payload.as_ref());
    ApiError::Opaque(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

fn log_failure(err: &ApiError) {
    match err {
        ApiError::Http(http) if http.status().is_client_error() => {
            tracing::warn!(status = http.status().as_u16(), error = %http, "request failed");
        }
        ApiError::Http(http) => {
            tracing::error!(status = http.status().as_u16(), error = %http, "request failed");
        }
        ApiError::Opaque(inner) => {
            tracing::error!(error = ?inner, "unrecognized failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;
    use crate::error::HttpError;

    fn recognized(status: StatusCode, message: &str) -> ApiError {
        HttpError::new(status, message).into()
    }

    fn opaque() -> ApiError {
        ApiError::Opaque(anyhow::anyhow!("connection reset by collaborator"))
    }

    async fn envelope(response: Response) -> (StatusCode, ErrorEnvelope) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn recognized_error_staged_in_every_mode() {
        for env in [
            Environment::Production,
            Environment::Development,
            Environment::Unset,
            Environment::Other("test".into()),
        ] {
            let ctx = ResponseContext::stage(&recognized(StatusCode::NOT_FOUND, "no case"), &env);
            assert_eq!(ctx.status, Some(StatusCode::NOT_FOUND), "{env}");
            assert_eq!(ctx.message.as_deref(), Some("no case"), "{env}");
            assert_eq!(ctx.error.is_some(), env.is_development(), "{env}");
        }
    }

    #[test]
    fn development_attaches_error_object() {
        let err = HttpError::conflict("duplicate tag");
        let ctx = ResponseContext::stage(&err.clone().into(), &Environment::Development);
        assert_eq!(ctx.error, Some(err.to_json()));
    }

    #[test]
    fn production_masks_unrecognized() {
        let ctx = ResponseContext::stage(&opaque(), &Environment::Production);
        assert_eq!(ctx.status, Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(ctx.message.as_deref(), Some(FALLBACK_MESSAGE));
        assert_eq!(ctx.error, None);
    }

    #[test]
    fn production_masks_empty_message() {
        let ctx = ResponseContext::stage(
            &recognized(StatusCode::BAD_REQUEST, ""),
            &Environment::Production,
        );
        assert_eq!(ctx.status, Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(ctx.message.as_deref(), Some(FALLBACK_MESSAGE));
    }

    #[test]
    fn unrecognized_outside_production_has_no_status() {
        for env in [Environment::Development, Environment::Unset] {
            let ctx = ResponseContext::stage(&opaque(), &env);
            assert_eq!(ctx, ResponseContext::default());
            assert!(normalize(&opaque(), &env).is_none());
        }
    }

    #[tokio::test]
    async fn normalized_response_has_declared_status() {
        let response = normalize(
            &recognized(StatusCode::UNPROCESSABLE_ENTITY, "title must not be empty"),
            &Environment::Production,
        )
        .unwrap();
        let (status, body) = envelope(response).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.message, "title must not be empty");
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn deferred_response_is_json_500() {
        let (status, body) = envelope(defer(&opaque(), &Environment::Unset)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, DEFERRED_MESSAGE);
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn deferred_response_shows_detail_in_development() {
        let (_, body) = envelope(defer(&opaque(), &Environment::Development)).await;
        let detail = body.error.unwrap();
        assert!(detail.as_str().unwrap().contains("connection reset"));
    }

    #[test]
    fn panic_becomes_opaque_failure() {
        let response = panic_failure(Box::new("index out of bounds"));
        let Failure(err) = response.extensions().get::<Failure>().cloned().unwrap();
        assert!(err.as_http().is_none());
        assert!(err.to_string().contains("index out of bounds"));
    }
}
