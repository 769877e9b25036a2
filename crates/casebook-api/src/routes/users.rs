//! # Users
//!
//! User accounts, reachable under both `/api/users` and the legacy `/user`
//! prefix. Emails are stored lowercased and are unique.
//!
//! `GET /me` identifies the caller by the `user_id` cookie. Deleting a user
//! leaves their collections in place without an owner.

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
use crate::middleware::cookies::Cookies;
use crate::state::{AppState, StoreError, User};

/// Cookie carrying the signed-in user's ID.
pub const USER_COOKIE: &str = "user_id";

/// Create or replace a user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserRequest {
    #[schema(example = "clerk@example.org")]
    pub email: String,
    #[schema(example = "Court Clerk")]
    pub name: String,
}

impl Validate for UserRequest {
    fn validate(&mut self) -> Result<(), ValidationError> {
        self.email = validate::email(&self.email)?;
        self.name = validate::required("name", &self.name, NAME_MAX_LEN)?;
        Ok(())
    }
}

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(current_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

fn same_email(a: &User, b: &User) -> bool {
    a.email == b.email
}

/// GET /api/users — List users.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users, oldest first", body = Vec<User>),
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.list())
}

/// POST /api/users — Register a user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Email already registered", body = ErrorEnvelope),
        (status = 422, description = "Invalid email or name", body = ErrorEnvelope),
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Valid(req): Valid<UserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: req.email,
        name: req.name,
        created_at: now,
        updated_at: now,
    };
    let user = state
        .users
        .insert_unique(user, same_email)
        .map_err(|e| e.describe("user"))?;
    tracing::info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/me — The user named by the `user_id` cookie.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Signed-in user", body = User),
        (status = 401, description = "Missing or unknown user cookie", body = ErrorEnvelope),
    ),
    tag = "users"
)]
pub async fn current_user(State(state): State<AppState>, cookies: Cookies) -> ApiResult<Json<User>> {
    let raw = cookies
        .get(USER_COOKIE)
        .ok_or_else(|| HttpError::unauthorized("not signed in"))?;
    let id = Uuid::parse_str(raw)
        .map_err(|_| HttpError::unauthorized("malformed user cookie"))?;
    let user = state
        .users
        .get(&id)
        .ok_or_else(|| HttpError::unauthorized("unknown user"))?;
    Ok(Json(user))
}

/// GET /api/users/{id} — Fetch one user.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<User>> {
    state
        .users
        .get(&id)
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(id).describe("user").into())
}

/// PUT /api/users/{id} — Replace a user.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Email already registered", body = ErrorEnvelope),
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    Valid(req): Valid<UserRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .update_unique(
            &id,
            |user| {
                user.email = req.email;
                user.name = req.name;
                user.updated_at = Utc::now();
            },
            same_email,
        )
        .map_err(|e| e.describe("user"))?;
    Ok(Json(user))
}

/// DELETE /api/users/{id} — Delete a user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<StatusCode> {
    let _relations = state.relations();
    state
        .users
        .remove(&id)
        .ok_or_else(|| StoreError::NotFound(id).describe("user"))?;
    let orphaned = state.collections.update_where(
        |collection| collection.owner_id == Some(id),
        |collection| {
            collection.owner_id = None;
            collection.updated_at = Utc::now();
        },
    );
    tracing::info!(user_id = %id, orphaned, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
