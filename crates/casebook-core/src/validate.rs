//! # Field Validation
//!
//! Normalizing validators for resource payload fields. Each validator
//! returns the cleaned value (trimmed, and lowercased for emails) so
//! handlers store exactly what was validated.

use crate::error::ValidationError;

/// Maximum length for names and titles.
pub const NAME_MAX_LEN: usize = 255;

/// Maximum length for free-text fields (summaries, descriptions).
pub const TEXT_MAX_LEN: usize = 10_000;

/// Validate a required short text field: trimmed, non-empty, at most `max` characters.
pub fn required(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    check_len(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Validate an optional free-text field. Absent values become the empty string.
pub fn optional(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.unwrap_or_default().trim();
    check_len(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Validate an email address and return its lowercased form.
///
/// Accepts `local@domain.tld`: exactly one `@`, a non-empty local part,
/// and a domain containing a dot that neither starts nor ends the domain.
pub fn email(value: &str) -> Result<String, ValidationError> {
    let trimmed = required("email", value, NAME_MAX_LEN)?;
    let invalid = || ValidationError::InvalidEmail(trimmed.clone());

    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || trimmed.contains(char::is_whitespace) {
        return Err(invalid());
    }
    match domain.find('.') {
        Some(pos) if pos > 0 && !domain.ends_with('.') => Ok(trimmed.to_lowercase()),
        _ => Err(invalid()),
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn required_trims() {
        assert_eq!(required("name", "  Torts  ", NAME_MAX_LEN).unwrap(), "Torts");
    }

    #[test]
    fn required_rejects_blank() {
        assert_eq!(
            required("name", "   ", NAME_MAX_LEN),
            Err(ValidationError::Empty { field: "name" })
        );
    }

    #[test]
    fn required_counts_chars_not_bytes() {
        let value = "é".repeat(10);
        assert!(required("name", &value, 10).is_ok());
        assert!(matches!(
            required("name", &value, 9),
            Err(ValidationError::TooLong { actual: 10, .. })
        ));
    }

    #[test]
    fn optional_allows_absent() {
        assert_eq!(optional("summary", None, TEXT_MAX_LEN).unwrap(), "");
        assert_eq!(optional("summary", Some(" x "), TEXT_MAX_LEN).unwrap(), "x");
    }

    #[test]
    fn email_lowercases() {
        assert_eq!(email(" Ada@Example.COM ").unwrap(), "ada@example.com");
    }

    #[test]
    fn email_rejects_malformed() {
        for bad in [
            "plain",
            "@example.com",
            "a@b",
            "a@.com",
            "a@example.",
            "a@@example.com",
            "a b@example.com",
        ] {
            assert!(email(bad).is_err(), "accepted {bad:?}");
        }
    }

    proptest! {
        #[test]
        fn required_output_is_trimmed_and_bounded(s in "\\PC{0,300}") {
            if let Ok(v) = required("name", &s, NAME_MAX_LEN) {
                prop_assert_eq!(v.trim(), v.as_str());
                prop_assert!(!v.is_empty());
                prop_assert!(v.chars().count() <= NAME_MAX_LEN);
            }
        }
    }
}
