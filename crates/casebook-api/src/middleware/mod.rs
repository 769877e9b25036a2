//! # Middleware Chain
//!
//! Request-transforming stages applied to every API request, outermost
//! first:
//!
//! ```text
//! (docs bypass) → security headers → body limit (JSON) → CORS → access log
//!   → (URL-encoded decoding in extractors) → cookies → error normalizer
//!   → panic catcher → handler
//! ```
//!
//! The documentation publisher is merged in front of the chain by
//! [`crate::app`]; the normalizer and panic catcher sit innermost so every
//! failure leaves the handler as a [`crate::error::Failure`] and comes back
//! out as a JSON envelope that the outer stages still decorate with
//! security and CORS headers.

pub mod cookies;
pub mod cors;
pub mod normalize;
pub mod security_headers;
pub mod tracing_layer;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use casebook_core::Environment;

use crate::state::AppState;

/// Wrap `router` in the full chain.
///
/// `Router::layer` wraps everything added before it, so the stages are
/// listed innermost first.
pub fn apply(router: Router<AppState>, environment: Environment, body_limit: usize) -> Router<AppState> {
    router
        .layer(normalize::catch_panics())
        .layer(from_fn_with_state(environment, normalize::normalize_errors))
        .layer(from_fn(cookies::parse_cookies))
        .layer(tracing_layer::layer())
        .layer(cors::layer())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(security_headers::security_headers))
}
