//! # Tag ↔ Case Links
//!
//! Each link attaches one tag to one case. Both sides must exist and a
//! pair can be linked only once. Links have no update operation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use casebook_core::ValidationError;
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ApiResult, ErrorEnvelope};
use crate::extractors::{require_exists, PathParam, QueryParams, Valid, Validate};
use crate::state::{AppState, StoreError, TagCase};

/// Link a tag to a case.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TagCaseRequest {
    pub tag_id: Uuid,
    pub case_id: Uuid,
}

impl Validate for TagCaseRequest {
    fn validate(&mut self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Listing filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TagCaseFilter {
    /// Only links of this case.
    pub case_id: Option<Uuid>,
    /// Only links of this tag.
    pub tag_id: Option<Uuid>,
}

/// Build the tag ↔ case link router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tag_cases).post(link_tag_case))
        .route("/{id}", delete(unlink_tag_case))
}

/// GET /api/tags_by_cases — List links.
#[utoipa::path(
    get,
    path = "/api/tags_by_cases",
    params(TagCaseFilter),
    responses(
        (status = 200, description = "Matching links", body = Vec<TagCase>),
        (status = 400, description = "Malformed filter", body = ErrorEnvelope),
    ),
    tag = "tags_by_cases"
)]
pub async fn list_tag_cases(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<TagCaseFilter>,
) -> Json<Vec<TagCase>> {
    Json(state.tag_cases.filter(|link| {
        filter.case_id.map_or(true, |id| link.case_id == id)
            && filter.tag_id.map_or(true, |id| link.tag_id == id)
    }))
}

/// POST /api/tags_by_cases — Tag a case.
#[utoipa::path(
    post,
    path = "/api/tags_by_cases",
    request_body = TagCaseRequest,
    responses(
        (status = 201, description = "Link created", body = TagCase),
        (status = 404, description = "Tag or case not found", body = ErrorEnvelope),
        (status = 409, description = "Already linked", body = ErrorEnvelope),
    ),
    tag = "tags_by_cases"
)]
pub async fn link_tag_case(
    State(state): State<AppState>,
    Valid(req): Valid<TagCaseRequest>,
) -> ApiResult<(StatusCode, Json<TagCase>)> {
    let _relations = state.relations();
    require_exists(state.tags.contains(&req.tag_id), "tag", req.tag_id)?;
    require_exists(state.cases.contains(&req.case_id), "case", req.case_id)?;
    let now = Utc::now();
    let link = TagCase {
        id: Uuid::new_v4(),
        tag_id: req.tag_id,
        case_id: req.case_id,
        created_at: now,
        updated_at: now,
    };
    let link = state
        .tag_cases
        .insert_unique(link, |a, b| a.tag_id == b.tag_id && a.case_id == b.case_id)
        .map_err(|e| e.describe("tag link"))?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// DELETE /api/tags_by_cases/{id} — Remove a link.
#[utoipa::path(
    delete,
    path = "/api/tags_by_cases/{id}",
    params(("id" = Uuid, Path, description = "Link ID")),
    responses(
        (status = 204, description = "Link removed"),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "tags_by_cases"
)]
pub async fn unlink_tag_case(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .tag_cases
        .remove(&id)
        .ok_or_else(|| StoreError::NotFound(id).describe("tag link"))?;
    Ok(StatusCode::NO_CONTENT)
}
