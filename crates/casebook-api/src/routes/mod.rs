//! # API Route Modules
//!
//! - `table` — prefix → router mounting and the service's canonical table.
//! - `health` — liveness probe at `/`.
//! - `users` — user accounts and the cookie-identified current user.
//! - `cases` — case studies, optionally categorized.
//! - `tags` — free-form labels.
//! - `tags_by_cases` — tag ↔ case links.
//! - `main_categories` — top-level categories.
//! - `sub_categories` — categories nested under a main category.
//! - `collections` — named sets of cases.
//! - `cases_by_collections` — case ↔ collection links.
//!
//! Resource routers declare paths relative to their mount point; the
//! OpenAPI annotations carry the canonical `/api/...` paths.

pub mod cases;
pub mod cases_by_collections;
pub mod collections;
pub mod health;
pub mod main_categories;
pub mod sub_categories;
pub mod table;
pub mod tags;
pub mod tags_by_cases;
pub mod users;

use axum::http::StatusCode;

use crate::error::HttpError;

/// Fallback for paths no router claims.
pub async fn not_found() -> HttpError {
    HttpError::from_status(StatusCode::NOT_FOUND)
}

/// Fallback for known paths requested with an unsupported method.
pub async fn method_not_allowed() -> HttpError {
    HttpError::from_status(StatusCode::METHOD_NOT_ALLOWED)
}
