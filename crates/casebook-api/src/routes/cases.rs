//! # Cases
//!
//! Case studies, optionally filed under a main category and one of its sub
//! categories. When only a sub category is given its parent is filled in;
//! a sub category that belongs to a different main category is rejected.
//! Deleting a case detaches it from every tag and collection.

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

use crate::error::{ApiResult, ErrorEnvelope, HttpError};
use crate::extractors::{require_exists, PathParam, QueryParams, Valid, Validate};
use crate::state::{AppState, Case, StoreError};

/// Create or replace a case.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CaseRequest {
    #[schema(example = "Marbury v. Madison")]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub main_category_id: Option<Uuid>,
    #[serde(default)]
    pub sub_category_id: Option<Uuid>,
}

impl Validate for CaseRequest {
    fn validate(&mut self) -> Result<(), ValidationError> {
        self.title = validate::required("title", &self.title, NAME_MAX_LEN)?;
        self.summary = Some(validate::optional(
            "summary",
            self.summary.as_deref(),
            TEXT_MAX_LEN,
        )?);
        Ok(())
    }
}

/// Listing filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CaseFilter {
    /// Only cases filed under this main category.
    pub main_category_id: Option<Uuid>,
    /// Only cases filed under this sub category.
    pub sub_category_id: Option<Uuid>,
}

impl CaseFilter {
    fn matches(&self, case: &Case) -> bool {
        self.main_category_id
            .map_or(true, |id| case.main_category_id == Some(id))
            && self
                .sub_category_id
                .map_or(true, |id| case.sub_category_id == Some(id))
    }
}

/// Build the cases router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cases).post(create_case))
        .route("/{id}", get(get_case).put(update_case).delete(delete_case))
}

/// Check category references and derive the main category from the sub
/// category when it was omitted.
fn resolve_categories(
    state: &AppState,
    main_category_id: Option<Uuid>,
    sub_category_id: Option<Uuid>,
) -> Result<(Option<Uuid>, Option<Uuid>), HttpError> {
    if let Some(main) = main_category_id {
        require_exists(state.main_categories.contains(&main), "main category", main)?;
    }
    let Some(sub_id) = sub_category_id else {
        return Ok((main_category_id, None));
    };
    let sub = state
        .sub_categories
        .get(&sub_id)
        .ok_or_else(|| StoreError::NotFound(sub_id).describe("sub category"))?;
    match main_category_id {
        Some(main) if main != sub.main_category_id => Err(HttpError::unprocessable(format!(
            "sub category {sub_id} does not belong to main category {main}"
        ))),
        _ => Ok((Some(sub.main_category_id), Some(sub_id))),
    }
}

/// GET /api/cases — List cases.
#[utoipa::path(
    get,
    path = "/api/cases",
    params(CaseFilter),
    responses(
        (status = 200, description = "Matching cases, oldest first", body = Vec<Case>),
        (status = 400, description = "Malformed filter", body = ErrorEnvelope),
    ),
    tag = "cases"
)]
pub async fn list_cases(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CaseFilter>,
) -> Json<Vec<Case>> {
    Json(state.cases.filter(|case| filter.matches(case)))
}

/// POST /api/cases — Create a case.
#[utoipa::path(
    post,
    path = "/api/cases",
    request_body = CaseRequest,
    responses(
        (status = 201, description = "Case created", body = Case),
        (status = 404, description = "Category not found", body = ErrorEnvelope),
        (status = 422, description = "Invalid fields or mismatched categories", body = ErrorEnvelope),
    ),
    tag = "cases"
)]
pub async fn create_case(
    State(state): State<AppState>,
    Valid(req): Valid<CaseRequest>,
) -> ApiResult<(StatusCode, Json<Case>)> {
    let _relations = state.relations();
    let (main_category_id, sub_category_id) =
        resolve_categories(&state, req.main_category_id, req.sub_category_id)?;
    let now = Utc::now();
    let case = Case {
        id: Uuid::new_v4(),
        title: req.title,
        summary: req.summary.unwrap_or_default(),
        main_category_id,
        sub_category_id,
        created_at: now,
        updated_at: now,
    };
    state.cases.insert(case.clone());
    tracing::info!(case_id = %case.id, "case created");
    Ok((StatusCode::CREATED, Json(case)))
}

/// GET /api/cases/{id} — Fetch one case.
#[utoipa::path(
    get,
    path = "/api/cases/{id}",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case found", body = Case),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "cases"
)]
pub async fn get_case(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Case>> {
    state
        .cases
        .get(&id)
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(id).describe("case").into())
}

/// PUT /api/cases/{id} — Replace a case.
#[utoipa::path(
    put,
    path = "/api/cases/{id}",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = CaseRequest,
    responses(
        (status = 200, description = "Case updated", body = Case),
        (status = 404, description = "Case or category not found", body = ErrorEnvelope),
        (status = 422, description = "Invalid fields or mismatched categories", body = ErrorEnvelope),
    ),
    tag = "cases"
)]
pub async fn update_case(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    Valid(req): Valid<CaseRequest>,
) -> ApiResult<Json<Case>> {
    let _relations = state.relations();
    if !state.cases.contains(&id) {
        return Err(StoreError::NotFound(id).describe("case").into());
    }
    let (main_category_id, sub_category_id) =
        resolve_categories(&state, req.main_category_id, req.sub_category_id)?;
    state
        .cases
        .update(&id, |case| {
            case.title = req.title;
            case.summary = req.summary.unwrap_or_default();
            case.main_category_id = main_category_id;
            case.sub_category_id = sub_category_id;
            case.updated_at = Utc::now();
        })
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(id).describe("case").into())
}

/// DELETE /api/cases/{id} — Delete a case and its tag and collection links.
#[utoipa::path(
    delete,
    path = "/api/cases/{id}",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 204, description = "Case deleted"),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tag = "cases"
)]
pub async fn delete_case(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<StatusCode> {
    let _relations = state.relations();
    state
        .cases
        .remove(&id)
        .ok_or_else(|| StoreError::NotFound(id).describe("case"))?;
    let tags = state.tag_cases.retain(|link| link.case_id != id);
    let collections = state.case_collections.retain(|link| link.case_id != id);
    tracing::info!(case_id = %id, tags, collections, "case deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MainCategory, SubCategory, TagCase};
    use std::time::Duration;

    fn seeded() -> (AppState, Uuid, Uuid) {
        let state = AppState::new();
        let now = Utc::now();
        let main = MainCategory {
            id: Uuid::new_v4(),
            name: "Public law".into(),
            created_at: now,
            updated_at: now,
        };
        let sub = SubCategory {
            id: Uuid::new_v4(),
            name: "Judicial review".into(),
            main_category_id: main.id,
            created_at: now,
            updated_at: now,
        };
        state.main_categories.insert(main.clone());
        state.sub_categories.insert(sub.clone());
        (state, main.id, sub.id)
    }

    #[test]
    fn sub_category_fills_in_parent() {
        let (state, main, sub) = seeded();
        assert_eq!(
            resolve_categories(&state, None, Some(sub)).unwrap(),
            (Some(main), Some(sub))
        );
    }

    #[test]
    fn mismatched_parent_is_unprocessable() {
        let (state, _, sub) = seeded();
        let now = Utc::now();
        let other = MainCategory {
            id: Uuid::new_v4(),
            name: "Private law".into(),
            created_at: now,
            updated_at: now,
        };
        state.main_categories.insert(other.clone());
        let err = resolve_categories(&state, Some(other.id), Some(sub)).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unknown_references_are_not_found() {
        let (state, main, _) = seeded();
        let missing = Uuid::new_v4();
        let err = resolve_categories(&state, Some(missing), None).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err = resolve_categories(&state, Some(main), Some(missing)).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn uncategorized_is_fine() {
        let (state, _, _) = seeded();
        assert_eq!(resolve_categories(&state, None, None).unwrap(), (None, None));
    }

    #[test]
    fn filter_matches_both_levels() {
        let (_, main, sub) = seeded();
        let now = Utc::now();
        let case = Case {
            id: Uuid::new_v4(),
            title: "t".into(),
            summary: String::new(),
            main_category_id: Some(main),
            sub_category_id: Some(sub),
            created_at: now,
            updated_at: now,
        };
        assert!(CaseFilter::default().matches(&case));
        assert!(CaseFilter {
            main_category_id: Some(main),
            sub_category_id: None
        }
        .matches(&case));
        assert!(!CaseFilter {
            main_category_id: None,
            sub_category_id: Some(Uuid::new_v4())
        }
        .matches(&case));
    }

    #[test]
    fn delete_waits_for_pending_link() {
        let (state, _, _) = seeded();
        let now = Utc::now();
        let case = Case {
            id: Uuid::new_v4(),
            title: "Donoghue v Stevenson".into(),
            summary: String::new(),
            main_category_id: None,
            sub_category_id: None,
            created_at: now,
            updated_at: now,
        };
        state.cases.insert(case.clone());

        // A link writer has seen the case and not yet inserted.
        let gate = state.relations();
        assert!(state.cases.contains(&case.id));

        let deleting = std::thread::spawn({
            let state = state.clone();
            let id = case.id;
            move || {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                rt.block_on(delete_case(State(state), PathParam(id)))
                    .map_err(|e| e.to_string())
            }
        });
        std::thread::sleep(Duration::from_millis(50));
        assert!(state.cases.contains(&case.id), "delete ran past the gate");

        state.tag_cases.insert(TagCase {
            id: Uuid::new_v4(),
            tag_id: Uuid::new_v4(),
            case_id: case.id,
            created_at: now,
            updated_at: now,
        });
        drop(gate);

        assert_eq!(deleting.join().unwrap(), Ok(StatusCode::NO_CONTENT));
        assert!(!state.cases.contains(&case.id));
        assert!(state.tag_cases.is_empty());
    }
}
