//! # Error Hierarchy
//!
//! Validation failures for resource payloads, built with `thiserror`.
//! Each variant names the offending field so the API layer can return an
//! actionable message without extra context.

use thiserror::Error;

/// A request field failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty after trimming whitespace.
    #[error("{field} must not be empty")]
    Empty {
        /// Field name as it appears in the request body.
        field: &'static str,
    },

    /// A field exceeded its maximum length (in characters).
    #[error("{field} must not exceed {max} characters (got {actual})")]
    TooLong {
        /// Field name as it appears in the request body.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
        /// Length of the submitted value.
        actual: usize,
    },

    /// An email address is not of the form `local@domain.tld`.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),
}

impl ValidationError {
    /// The field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
            Self::InvalidEmail(_) => "email",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        let err = ValidationError::Empty { field: "title" };
        assert_eq!(err.to_string(), "title must not be empty");

        let err = ValidationError::TooLong {
            field: "name",
            max: 255,
            actual: 300,
        };
        assert!(err.to_string().contains("name"));
        assert!(err.to_string().contains("255"));
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn invalid_email_field() {
        let err = ValidationError::InvalidEmail("nope".into());
        assert_eq!(err.field(), "email");
        assert!(err.to_string().contains("nope"));
    }
}
