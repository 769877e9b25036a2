//! # casebook-api — REST Gateway for the Casebook Service
//!
//! Declares the HTTP surface for users, cases, tags, categories and
//! collections, wraps it in a fixed middleware chain, and funnels every
//! failure through a single error normalizer so clients always receive a
//! JSON envelope.
//!
//! ## API Surface
//!
//! | Prefix                        | Module                                 |
//! |-------------------------------|----------------------------------------|
//! | `/api-docs`                   | [`openapi`] (bypasses the chain)       |
//! | `/api/users`, `/user`         | [`routes::users`]                      |
//! | `/api/cases`                  | [`routes::cases`]                      |
//! | `/api/tags`                   | [`routes::tags`]                       |
//! | `/api/tags_by_cases`          | [`routes::tags_by_cases`]              |
//! | `/api/main_categories`        | [`routes::main_categories`]            |
//! | `/api/sub_categories`         | [`routes::sub_categories`]             |
//! | `/api/collections`            | [`routes::collections`]                |
//! | `/api/cases_by_collections`   | [`routes::cases_by_collections`]       |
//! | `/` (GET)                     | [`routes::health`]                     |
//!
//! ## Middleware Chain
//!
//! See [`middleware`] for the stage order.

pub mod config;
pub mod env;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod supervisor;
pub mod telemetry;

use axum::Router;

use crate::routes::table::{route_table, MountError, RouteTable};
use crate::state::AppState;

/// Assemble the full application router from the canonical route table.
pub fn app(state: AppState) -> Result<Router, MountError> {
    Ok(app_with(route_table()?, state))
}

/// Assemble the application around an arbitrary route table.
///
/// Documentation routes are merged outside the middleware chain; the
/// health endpoint, unmatched paths and unsupported methods go through it.
pub fn app_with(table: RouteTable, state: AppState) -> Router {
    let api = table
        .into_router()
        .merge(routes::health::router())
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed);

    let api = middleware::apply(
        api,
        state.environment().clone(),
        state.config.body_limit,
    );

    Router::new()
        .merge(openapi::router())
        .merge(api)
        .with_state(state)
}
