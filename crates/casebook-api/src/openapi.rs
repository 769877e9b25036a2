//! # Documentation Publisher
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1
//! document. Serves the document at `/api-docs/openapi.json` and an
//! interactive explorer at `/api-docs`.
//!
//! The explorer page loads the hosted swagger-ui bundle and points it at
//! the JSON document. These routes are merged in front of the middleware
//! chain, so documentation responses carry none of the API's security
//! headers and the page's external scripts are not blocked.

use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Path of the interactive explorer.
pub const DOCS_PATH: &str = "/api-docs";

/// Path of the JSON document.
pub const SPEC_PATH: &str = "/api-docs/openapi.json";

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Casebook API",
        description = "REST gateway for users, cases, tags, categories and collections. Every failure is returned as a JSON envelope `{error?, message}`.",
    ),
    paths(
        crate::routes::health::health,
        // Users
        crate::routes::users::list_users,
        crate::routes::users::create_user,
        crate::routes::users::current_user,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        // Cases
        crate::routes::cases::list_cases,
        crate::routes::cases::create_case,
        crate::routes::cases::get_case,
        crate::routes::cases::update_case,
        crate::routes::cases::delete_case,
        // Tags
        crate::routes::tags::list_tags,
        crate::routes::tags::create_tag,
        crate::routes::tags::get_tag,
        crate::routes::tags::update_tag,
        crate::routes::tags::delete_tag,
        crate::routes::tags_by_cases::list_tag_cases,
        crate::routes::tags_by_cases::link_tag_case,
        crate::routes::tags_by_cases::unlink_tag_case,
        // Categories
        crate::routes::main_categories::list_main_categories,
        crate::routes::main_categories::create_main_category,
        crate::routes::main_categories::get_main_category,
        crate::routes::main_categories::update_main_category,
        crate::routes::main_categories::delete_main_category,
        crate::routes::sub_categories::list_sub_categories,
        crate::routes::sub_categories::create_sub_category,
        crate::routes::sub_categories::get_sub_category,
        crate::routes::sub_categories::update_sub_category,
        crate::routes::sub_categories::delete_sub_category,
        // Collections
        crate::routes::collections::list_collections,
        crate::routes::collections::create_collection,
        crate::routes::collections::get_collection,
        crate::routes::collections::update_collection,
        crate::routes::collections::delete_collection,
        crate::routes::cases_by_collections::list_case_collections,
        crate::routes::cases_by_collections::link_case_collection,
        crate::routes::cases_by_collections::unlink_case_collection,
    ),
    components(schemas(
        crate::error::ErrorEnvelope,
        crate::routes::health::HealthStatus,
        // Records
        crate::state::User,
        crate::state::Case,
        crate::state::Tag,
        crate::state::TagCase,
        crate::state::MainCategory,
        crate::state::SubCategory,
        crate::state::Collection,
        crate::state::CaseCollection,
        // Request bodies
        crate::routes::users::UserRequest,
        crate::routes::cases::CaseRequest,
        crate::routes::tags::TagRequest,
        crate::routes::tags_by_cases::TagCaseRequest,
        crate::routes::main_categories::MainCategoryRequest,
        crate::routes::sub_categories::SubCategoryRequest,
        crate::routes::collections::CollectionRequest,
        crate::routes::cases_by_collections::CaseCollectionRequest,
    )),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "users", description = "User accounts; also mounted under /user"),
        (name = "cases", description = "Case studies"),
        (name = "tags", description = "Free-form labels"),
        (name = "tags_by_cases", description = "Tag to case links"),
        (name = "main_categories", description = "Top-level categories"),
        (name = "sub_categories", description = "Categories nested under a main category"),
        (name = "collections", description = "Named sets of cases"),
        (name = "cases_by_collections", description = "Case to collection links"),
    )
)]
pub struct ApiDoc;

/// Build the documentation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(DOCS_PATH, get(explorer))
        .route("/api-docs/", get(explorer))
        .route(SPEC_PATH, get(openapi_json))
}

/// GET /api-docs/openapi.json — Return the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /api-docs — Interactive explorer.
async fn explorer() -> Html<String> {
    Html(explorer_page(SPEC_PATH))
}

fn explorer_page(spec_url: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Casebook API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{
        url: "{spec_url}",
        dom_id: "#swagger-ui",
        deepLinking: true,
        presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
        layout: "StandaloneLayout",
      }});
    }};
  </script>
</body>
</html>
"##
    )
}
