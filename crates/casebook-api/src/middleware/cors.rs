//! # Cross-Origin Policy
//!
//! Every origin is permitted. Preflight requests are answered here and
//! never reach the handlers.

use tower_http::cors::{Any, CorsLayer};

/// Build the wildcard CORS layer.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
