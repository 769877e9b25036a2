//! # Collections
//!
//! Named sets of cases, optionally owned by a user. Deleting a collection
//! removes its case links but never the cases themselves.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use casebook_core::validate::{self, NAME_MAX_LEN, TEXT_MAX_LEN};
use casebook_core::ValidationError;
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ApiResult, ErrorEnvelope};
use crate::extractors::{require_exists, PathParam, QueryParams, Valid, Validate};
use crate::state::{AppState, Collection, StoreError};

/// Create or replace a collection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CollectionRequest {
    #[schema(example = "Landmark rulings")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

impl Validate for CollectionRequest {
    fn validate(&mut self) -> Result<(), ValidationError> {
        self.name = validate::required("name", &self.name, NAME_MAX_LEN)?;
        self.description = Some(validate::optional(
            "description",
            self.description.as_deref(),
            TEXT_MAX_LEN,
        )?);
        Ok(())
    }
}

/// Listing filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CollectionFilter {
    /// Only collections owned by this user.
    pub owner_id: Option<Uuid>,
}

/// Build the collections router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_collections).post(create_collection))
        .route(
            "/{id}",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
}

fn check_owner(state: &AppState, owner_id: Option<Uuid>) -> ApiResult<()> {
    if let Some(owner) = owner_id {
        require_exists(state.users.contains(&owner), "user", owner)?;
    }
    Ok(())
}

/// GET /api/collections — List collections.
#[utoipa::path(
    get,
    path = "/api/collections",
    params(CollectionFilter),
    responses(
        (status = 200, description = "Matching collections", body = Vec<Collection>),
        (status = 400, description = "Malformed filter", body = ErrorEnvelope),
    ),
    tag = "collections"
)]
pub async fn list_collections(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CollectionFilter>,
) -> Json<Vec<Collection>> {
    Json(state.collections.filter(|collection| {
        filter
            .owner_id
            .map_or(true, |owner| collection.owner_id == Some(owner))
    }))
}

/// POST /api/collections — Create a collection.
#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = CollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = Collection),
        (status = 404, description = "Owner not found", body = ErrorEnvelope),
        (status = 422, description = "Invalid fields", body = ErrorEnvelope),
    ),
    tag = "collections"
)]
pub async fn create_collection(
    State(state): State<AppState>,
    Valid(req): Valid<CollectionRequest>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let _relations = state.relations();
    check_owner(&state, req.owner_id)?;
    let now = Utc::now();
    let collection = Collection {
        id: Uuid::new_v4(),
        name: req.name,
        description: req.description.unwrap_or_default(),
        owner_id: req.owner_id,
        created_at: now,
        updated_at: now,
    };
    state.collections.insert(collection.clone());
    Ok((StatusCode::CREATED, Json(collection)))
}

/// GET /api/collections/{id} — Fetch one collection.
#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection found", body = Collection),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "collections"
)]
pub async fn get_collection(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Collection>> {
    state
        .collections
        .get(&id)
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(id).describe("collection").into())
}

/// PUT /api/collections/{id} — Replace a collection.
#[utoipa::path(
    put,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    request_body = CollectionRequest,
    responses(
        (status = 200, description = "Collection updated", body = Collection),
        (status = 404, description = "Collection or owner not found", body = ErrorEnvelope),
    ),
    tag = "collections"
)]
pub async fn update_collection(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    Valid(req): Valid<CollectionRequest>,
) -> ApiResult<Json<Collection>> {
    let _relations = state.relations();
    check_owner(&state, req.owner_id)?;
    state
        .collections
        .update(&id, |collection| {
            collection.name = req.name;
            collection.description = req.description.unwrap_or_default();
            collection.owner_id = req.owner_id;
            collection.updated_at = Utc::now();
        })
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(id).describe("collection").into())
}

/// DELETE /api/collections/{id} — Delete a collection and its case links.
#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    responses(
        (status = 204, description = "Collection deleted"),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "collections"
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<StatusCode> {
    let _relations = state.relations();
    state
        .collections
        .remove(&id)
        .ok_or_else(|| StoreError::NotFound(id).describe("collection"))?;
    state
        .case_collections
        .retain(|link| link.collection_id != id);
    Ok(StatusCode::NO_CONTENT)
}
