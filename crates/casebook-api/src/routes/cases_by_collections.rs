//! # Case ↔ Collection Links
//!
//! Each link files one case into one collection; a case appears in a
//! collection at most once.

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
use crate::state::{AppState, CaseCollection, StoreError};

/// File a case into a collection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CaseCollectionRequest {
    pub case_id: Uuid,
    pub collection_id: Uuid,
}

impl Validate for CaseCollectionRequest {
    fn validate(&mut self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Listing filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CaseCollectionFilter {
    /// Only links of this case.
    pub case_id: Option<Uuid>,
    /// Only links into this collection.
    pub collection_id: Option<Uuid>,
}

/// Build the case ↔ collection link router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_case_collections).post(link_case_collection))
        .route("/{id}", delete(unlink_case_collection))
}

/// GET /api/cases_by_collections — List links.
#[utoipa::path(
    get,
    path = "/api/cases_by_collections",
    params(CaseCollectionFilter),
    responses(
        (status = 200, description = "Matching links", body = Vec<CaseCollection>),
        (status = 400, description = "Malformed filter", body = ErrorEnvelope),
    ),
    tag = "cases_by_collections"
)]
pub async fn list_case_collections(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CaseCollectionFilter>,
) -> Json<Vec<CaseCollection>> {
    Json(state.case_collections.filter(|link| {
        filter.case_id.map_or(true, |id| link.case_id == id)
            && filter
                .collection_id
                .map_or(true, |id| link.collection_id == id)
    }))
}

/// POST /api/cases_by_collections — File a case into a collection.
#[utoipa::path(
    post,
    path = "/api/cases_by_collections",
    request_body = CaseCollectionRequest,
    responses(
        (status = 201, description = "Link created", body = CaseCollection),
        (status = 404, description = "Case or collection not found", body = ErrorEnvelope),
        (status = 409, description = "Already filed", body = ErrorEnvelope),
    ),
    tag = "cases_by_collections"
)]
pub async fn link_case_collection(
    State(state): State<AppState>,
    Valid(req): Valid<CaseCollectionRequest>,
) -> ApiResult<(StatusCode, Json<CaseCollection>)> {
    let _relations = state.relations();
    require_exists(state.cases.contains(&req.case_id), "case", req.case_id)?;
    require_exists(
        state.collections.contains(&req.collection_id),
        "collection",
        req.collection_id,
    )?;
    let now = Utc::now();
    let link = CaseCollection {
        id: Uuid::new_v4(),
        case_id: req.case_id,
        collection_id: req.collection_id,
        created_at: now,
        updated_at: now,
    };
    let link = state
        .case_collections
        .insert_unique(link, |a, b| {
            a.case_id == b.case_id && a.collection_id == b.collection_id
        })
        .map_err(|e| e.describe("collection link"))?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// DELETE /api/cases_by_collections/{id} — Remove a case from a collection.
#[utoipa::path(
    delete,
    path = "/api/cases_by_collections/{id}",
    params(("id" = Uuid, Path, description = "Link ID")),
    responses(
        (status = 204, description = "Link removed"),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "cases_by_collections"
)]
pub async fn unlink_case_collection(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .case_collections
        .remove(&id)
        .ok_or_else(|| StoreError::NotFound(id).describe("collection link"))?;
    Ok(StatusCode::NO_CONTENT)
}
