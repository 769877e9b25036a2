//! # Sub Categories
//!
//! Categories nested under a main category. Names are unique within their
//! parent. Moving a sub category to another parent moves the cases filed
//! under it along with it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use casebook_core::validate::{self, NAME_MAX_LEN};
use casebook_core::ValidationError;
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ApiResult, ErrorEnvelope, HttpError};
use crate::extractors::{require_exists, PathParam, QueryParams, Valid, Validate};
use crate::state::{AppState, StoreError, SubCategory};

/// Create or replace a sub category.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubCategoryRequest {
    #[schema(example = "Judicial review")]
    pub name: String,
    pub main_category_id: Uuid,
}

impl Validate for SubCategoryRequest {
    fn validate(&mut self) -> Result<(), ValidationError> {
        self.name = validate::required("name", &self.name, NAME_MAX_LEN)?;
        Ok(())
    }
}

/// Listing filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubCategoryFilter {
    /// Only sub categories of this main category.
    pub main_category_id: Option<Uuid>,
}

/// Build the sub categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sub_categories).post(create_sub_category))
        .route(
            "/{id}",
            get(get_sub_category)
                .put(update_sub_category)
                .delete(delete_sub_category),
        )
}

fn same_name_and_parent(a: &SubCategory, b: &SubCategory) -> bool {
    a.main_category_id == b.main_category_id && a.name.eq_ignore_ascii_case(&b.name)
}

/// GET /api/sub_categories — List sub categories.
#[utoipa::path(
    get,
    path = "/api/sub_categories",
    params(SubCategoryFilter),
    responses(
        (status = 200, description = "Matching sub categories", body = Vec<SubCategory>),
        (status = 400, description = "Malformed filter", body = ErrorEnvelope),
    ),
    tag = "sub_categories"
)]
pub async fn list_sub_categories(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<SubCategoryFilter>,
) -> Json<Vec<SubCategory>> {
    Json(state.sub_categories.filter(|sub| {
        filter
            .main_category_id
            .map_or(true, |parent| sub.main_category_id == parent)
    }))
}

/// POST /api/sub_categories — Create a sub category.
#[utoipa::path(
    post,
    path = "/api/sub_categories",
    request_body = SubCategoryRequest,
    responses(
        (status = 201, description = "Sub category created", body = SubCategory),
        (status = 404, description = "Main category not found", body = ErrorEnvelope),
        (status = 409, description = "Name already taken in this main category", body = ErrorEnvelope),
    ),
    tag = "sub_categories"
)]
pub async fn create_sub_category(
    State(state): State<AppState>,
    Valid(req): Valid<SubCategoryRequest>,
) -> ApiResult<(StatusCode, Json<SubCategory>)> {
    let _relations = state.relations();
    require_exists(
        state.main_categories.contains(&req.main_category_id),
        "main category",
        req.main_category_id,
    )?;
    let now = Utc::now();
    let sub = SubCategory {
        id: Uuid::new_v4(),
        name: req.name,
        main_category_id: req.main_category_id,
        created_at: now,
        updated_at: now,
    };
    let sub = state
        .sub_categories
        .insert_unique(sub, same_name_and_parent)
        .map_err(|e| e.describe("sub category"))?;
    Ok((StatusCode::CREATED, Json(sub)))
}

/// GET /api/sub_categories/{id} — Fetch one sub category.
#[utoipa::path(
    get,
    path = "/api/sub_categories/{id}",
    params(("id" = Uuid, Path, description = "Sub category ID")),
    responses(
        (status = 200, description = "Sub category found", body = SubCategory),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "sub_categories"
)]
pub async fn get_sub_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<SubCategory>> {
    state
        .sub_categories
        .get(&id)
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(id).describe("sub category").into())
}

/// PUT /api/sub_categories/{id} — Replace a sub category.
#[utoipa::path(
    put,
    path = "/api/sub_categories/{id}",
    params(("id" = Uuid, Path, description = "Sub category ID")),
    request_body = SubCategoryRequest,
    responses(
        (status = 200, description = "Sub category updated", body = SubCategory),
        (status = 404, description = "Sub category or main category not found", body = ErrorEnvelope),
        (status = 409, description = "Name already taken in this main category", body = ErrorEnvelope),
    ),
    tag = "sub_categories"
)]
pub async fn update_sub_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    Valid(req): Valid<SubCategoryRequest>,
) -> ApiResult<Json<SubCategory>> {
    let _relations = state.relations();
    require_exists(
        state.main_categories.contains(&req.main_category_id),
        "main category",
        req.main_category_id,
    )?;
    let parent = req.main_category_id;
    let sub = state
        .sub_categories
        .update_unique(
            &id,
            |sub| {
                sub.name = req.name;
                sub.main_category_id = parent;
                sub.updated_at = Utc::now();
            },
            same_name_and_parent,
        )
        .map_err(|e| e.describe("sub category"))?;

    let moved = state.cases.update_where(
        |case| case.sub_category_id == Some(id) && case.main_category_id != Some(parent),
        |case| {
            case.main_category_id = Some(parent);
            case.updated_at = Utc::now();
        },
    );
    if moved > 0 {
        tracing::info!(sub_category_id = %id, moved, "cases moved with their sub category");
    }
    Ok(Json(sub))
}

/// DELETE /api/sub_categories/{id} — Delete an unreferenced sub category.
#[utoipa::path(
    delete,
    path = "/api/sub_categories/{id}",
    params(("id" = Uuid, Path, description = "Sub category ID")),
    responses(
        (status = 204, description = "Sub category deleted"),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Still used by cases", body = ErrorEnvelope),
    ),
    tag = "sub_categories"
)]
pub async fn delete_sub_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<StatusCode> {
    let _relations = state.relations();
    if !state.sub_categories.contains(&id) {
        return Err(StoreError::NotFound(id).describe("sub category").into());
    }
    if state.cases.any(|case| case.sub_category_id == Some(id)) {
        return Err(HttpError::conflict(format!("sub category {id} is still used by cases")).into());
    }
    state.sub_categories.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}
