//! # Custom Extractors & Validation
//!
//! Wrappers around Axum's body, path and query extractors whose rejections
//! become recognized [`HttpError`]s, so malformed input flows through the
//! error normalizer like any other failure instead of producing Axum's
//! plain-text rejection bodies.
//!
//! Body decoding honours the chain's body limit. URL-encoded bodies are
//! decoded flat: a key such as `case[title]` is taken literally, never
//! expanded into a nested object.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::{Form, Json};
use casebook_core::ValidationError;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, HttpError};

/// Trait for request types that validate and normalize their fields
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules, normalizing fields in place (e.g. trimming).
    fn validate(&mut self) -> Result<(), ValidationError>;
}

/// JSON request body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `application/x-www-form-urlencoded` request body.
#[derive(Debug, Clone)]
pub struct FormBody<T>(pub T);

impl<T, S> FromRequest<S> for FormBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Request body accepted as either a form or JSON, chosen by `Content-Type`.
///
/// Form bodies are recognized by their media type; everything else is
/// handed to the JSON decoder, which rejects non-JSON types with 415.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let FormBody(value) = FormBody::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

/// A [`Payload`] that has passed [`Validate`].
#[derive(Debug, Clone)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Payload(mut value) = Payload::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Path parameters.
#[derive(Debug, Clone)]
pub struct PathParam<T>(pub T);

impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query string parameters.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
        .unwrap_or(false)
}

/// Require a record referenced by a request field to exist.
pub fn require_exists(exists: bool, resource: &str, id: uuid::Uuid) -> Result<(), HttpError> {
    if exists {
        Ok(())
    } else {
        Err(HttpError::not_found(format!("{resource} {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    impl Validate for Named {
        fn validate(&mut self) -> Result<(), ValidationError> {
            self.name = casebook_core::validate::required("name", &self.name, 10)?;
            Ok(())
        }
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = HttpRequest::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn status_of(err: ApiError) -> StatusCode {
        err.as_http().expect("recognized").status()
    }

    #[tokio::test]
    async fn payload_accepts_json() {
        let req = request(Some("application/json"), r#"{"name":"torts"}"#);
        let Payload(named) = Payload::<Named>::from_request(req, &()).await.unwrap();
        assert_eq!(named.name, "torts");
    }

    #[tokio::test]
    async fn payload_accepts_form() {
        let req = request(
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            "name=torts",
        );
        let Payload(named) = Payload::<Named>::from_request(req, &()).await.unwrap();
        assert_eq!(named.name, "torts");
    }

    #[tokio::test]
    async fn form_keys_are_not_nested() {
        #[derive(Debug, Deserialize)]
        struct Flat {
            #[serde(rename = "case[title]")]
            title: String,
        }
        let req = request(
            Some("application/x-www-form-urlencoded"),
            "case%5Btitle%5D=Marbury",
        );
        let FormBody(flat) = FormBody::<Flat>::from_request(req, &()).await.unwrap();
        assert_eq!(flat.title, "Marbury");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let req = request(Some("application/json"), r#"{"name": "#);
        let err = JsonBody::<Named>::from_request(req, &()).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_shape_is_unprocessable() {
        let req = request(Some("application/json"), r#"{"title":"x"}"#);
        let err = JsonBody::<Named>::from_request(req, &()).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported() {
        let req = request(None, r#"{"name":"x"}"#);
        let err = Payload::<Named>::from_request(req, &()).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn valid_runs_validation() {
        let req = request(Some("application/json"), r#"{"name":"  "}"#);
        let err = Valid::<Named>::from_request(req, &()).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);

        let req = request(Some("application/json"), r#"{"name":"  ok "}"#);
        let Valid(named) = Valid::<Named>::from_request(req, &()).await.unwrap();
        assert_eq!(named.name, "ok");
    }

    #[test]
    fn require_exists_reports_missing() {
        let id = uuid::Uuid::nil();
        assert!(require_exists(true, "tag", id).is_ok());
        let err = require_exists(false, "tag", id).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.message().contains("tag"));
    }
}
