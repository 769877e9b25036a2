//! # Main Categories
//!
//! Top-level categories. A main category cannot be deleted while sub
//! categories or cases still reference it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use casebook_core::validate::{self, NAME_MAX_LEN};
use casebook_core::ValidationError;
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiResult, ErrorEnvelope, HttpError};
use crate::extractors::{PathParam, Valid, Validate};
use crate::state::{AppState, MainCategory, StoreError};

/// Create or replace a main category.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MainCategoryRequest {
    #[schema(example = "Public law")]
    pub name: String,
}

impl Validate for MainCategoryRequest {
    fn validate(&mut self) -> Result<(), ValidationError> {
        self.name = validate::required("name", &self.name, NAME_MAX_LEN)?;
        Ok(())
    }
}

/// Build the main categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_main_categories).post(create_main_category))
        .route(
            "/{id}",
            get(get_main_category)
                .put(update_main_category)
                .delete(delete_main_category),
        )
}

fn same_name(a: &MainCategory, b: &MainCategory) -> bool {
    a.name.eq_ignore_ascii_case(&b.name)
}

/// GET /api/main_categories — List main categories.
#[utoipa::path(
    get,
    path = "/api/main_categories",
    responses(
        (status = 200, description = "All main categories", body = Vec<MainCategory>),
    ),
    tag = "main_categories"
)]
pub async fn list_main_categories(State(state): State<AppState>) -> Json<Vec<MainCategory>> {
    Json(state.main_categories.list())
}

/// POST /api/main_categories — Create a main category.
#[utoipa::path(
    post,
    path = "/api/main_categories",
    request_body = MainCategoryRequest,
    responses(
        (status = 201, description = "Main category created", body = MainCategory),
        (status = 409, description = "Name already taken", body = ErrorEnvelope),
        (status = 422, description = "Invalid name", body = ErrorEnvelope),
    ),
    tag = "main_categories"
)]
pub async fn create_main_category(
    State(state): State<AppState>,
    Valid(req): Valid<MainCategoryRequest>,
) -> ApiResult<(StatusCode, Json<MainCategory>)> {
    let now = Utc::now();
    let category = MainCategory {
        id: Uuid::new_v4(),
        name: req.name,
        created_at: now,
        updated_at: now,
    };
    let category = state
        .main_categories
        .insert_unique(category, same_name)
        .map_err(|e| e.describe("main category"))?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/main_categories/{id} — Fetch one main category.
#[utoipa::path(
    get,
    path = "/api/main_categories/{id}",
    params(("id" = Uuid, Path, description = "Main category ID")),
    responses(
        (status = 200, description = "Main category found", body = MainCategory),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "main_categories"
)]
pub async fn get_main_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<MainCategory>> {
    state
        .main_categories
        .get(&id)
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(id).describe("main category").into())
}

/// PUT /api/main_categories/{id} — Rename a main category.
#[utoipa::path(
    put,
    path = "/api/main_categories/{id}",
    params(("id" = Uuid, Path, description = "Main category ID")),
    request_body = MainCategoryRequest,
    responses(
        (status = 200, description = "Main category updated", body = MainCategory),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Name already taken", body = ErrorEnvelope),
    ),
    tag = "main_categories"
)]
pub async fn update_main_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    Valid(req): Valid<MainCategoryRequest>,
) -> ApiResult<Json<MainCategory>> {
    let category = state
        .main_categories
        .update_unique(
            &id,
            |category| {
                category.name = req.name;
                category.updated_at = Utc::now();
            },
            same_name,
        )
        .map_err(|e| e.describe("main category"))?;
    Ok(Json(category))
}

/// DELETE /api/main_categories/{id} — Delete an unreferenced main category.
#[utoipa::path(
    delete,
    path = "/api/main_categories/{id}",
    params(("id" = Uuid, Path, description = "Main category ID")),
    responses(
        (status = 204, description = "Main category deleted"),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Still referenced", body = ErrorEnvelope),
    ),
    tag = "main_categories"
)]
pub async fn delete_main_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<StatusCode> {
    let _relations = state.relations();
    if !state.main_categories.contains(&id) {
        return Err(StoreError::NotFound(id).describe("main category").into());
    }
    if state.sub_categories.any(|sub| sub.main_category_id == id) {
        return Err(HttpError::conflict(format!(
            "main category {id} still has sub categories"
        ))
        .into());
    }
    if state.cases.any(|case| case.main_category_id == Some(id)) {
        return Err(HttpError::conflict(format!("main category {id} is still used by cases")).into());
    }
    state.main_categories.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}
