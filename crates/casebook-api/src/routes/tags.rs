//! # Tags
//!
//! Free-form labels attached to cases through `tags_by_cases`. Tag names
//! are unique ignoring ASCII case; deleting a tag detaches it from every
//! case.

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

use crate::error::{ApiResult, ErrorEnvelope};
use crate::extractors::{PathParam, Valid, Validate};
use crate::state::{AppState, StoreError, Tag};

/// Create or replace a tag.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TagRequest {
    #[schema(example = "constitutional")]
    pub name: String,
}

impl Validate for TagRequest {
    fn validate(&mut self) -> Result<(), ValidationError> {
        self.name = validate::required("name", &self.name, NAME_MAX_LEN)?;
        Ok(())
    }
}

/// Build the tags router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(create_tag))
        .route("/{id}", get(get_tag).put(update_tag).delete(delete_tag))
}

fn same_name(a: &Tag, b: &Tag) -> bool {
    a.name.eq_ignore_ascii_case(&b.name)
}

/// GET /api/tags — List tags.
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "All tags, oldest first", body = Vec<Tag>),
    ),
    tag = "tags"
)]
pub async fn list_tags(State(state): State<AppState>) -> Json<Vec<Tag>> {
    Json(state.tags.list())
}

/// POST /api/tags — Create a tag.
#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = TagRequest,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 409, description = "Name already taken", body = ErrorEnvelope),
        (status = 422, description = "Invalid name", body = ErrorEnvelope),
    ),
    tag = "tags"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    Valid(req): Valid<TagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let now = Utc::now();
    let tag = Tag {
        id: Uuid::new_v4(),
        name: req.name,
        created_at: now,
        updated_at: now,
    };
    let tag = state
        .tags
        .insert_unique(tag, same_name)
        .map_err(|e| e.describe("tag"))?;
    tracing::info!(tag_id = %tag.id, "tag created");
    Ok((StatusCode::CREATED, Json(tag)))
}

/// GET /api/tags/{id} — Fetch one tag.
#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag found", body = Tag),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "tags"
)]
pub async fn get_tag(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Tag>> {
    let tag = state
        .tags
        .get(&id)
        .ok_or_else(|| StoreError::NotFound(id).describe("tag"))?;
    Ok(Json(tag))
}

/// PUT /api/tags/{id} — Rename a tag.
#[utoipa::path(
    put,
    path = "/api/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Tag updated", body = Tag),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Name already taken", body = ErrorEnvelope),
    ),
    tag = "tags"
)]
pub async fn update_tag(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    Valid(req): Valid<TagRequest>,
) -> ApiResult<Json<Tag>> {
    let tag = state
        .tags
        .update_unique(
            &id,
            |tag| {
                tag.name = req.name;
                tag.updated_at = Utc::now();
            },
            same_name,
        )
        .map_err(|e| e.describe("tag"))?;
    Ok(Json(tag))
}

/// DELETE /api/tags/{id} — Delete a tag and its case links.
#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<StatusCode> {
    let _relations = state.relations();
    state
        .tags
        .remove(&id)
        .ok_or_else(|| StoreError::NotFound(id).describe("tag"))?;
    let unlinked = state.tag_cases.retain(|link| link.tag_id != id);
    tracing::info!(tag_id = %id, unlinked, "tag deleted");
    Ok(StatusCode::NO_CONTENT)
}
