#![deny(missing_docs)]

//! # casebook-core — Foundational Types for the Casebook API
//!
//! Types shared by every layer of the gateway that do not depend on the
//! web framework:
//!
//! - [`Environment`] — the runtime mode (`development`, `production`, other)
//!   that gates error exposure and startup strictness.
//! - [`validate`] — field-level validation for resource payloads.
//! - [`ValidationError`] — structured validation failures, built with `thiserror`.

pub mod environment;
pub mod error;
pub mod validate;

pub use environment::Environment;
pub use error::ValidationError;
