//! # Health Endpoint
//!
//! Unauthenticated liveness probe at the root path.

use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// Always `"up"`.
    #[schema(example = "up")]
    pub api: String,
}

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

/// GET / — Liveness probe.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is reachable", body = HealthStatus),
    ),
    tag = "health"
)]
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        api: "up".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_up() {
        let Json(status) = health().await;
        assert_eq!(serde_json::to_value(status).unwrap(), serde_json::json!({"api": "up"}));
    }
}
