//! # Runtime Environment Mode
//!
//! The gateway behaves differently depending on the deployment mode:
//!
//! - **production** — a missing environment file is tolerated, and
//!   unrecognized failures are masked as `ApplicationError`.
//! - **development** — recognized HTTP errors carry the raw error object
//!   in the response body for debugging.
//! - anything else (including unset) — neither of the above.
//!
//! Mode names are matched exactly and case-sensitively.

use serde::{Deserialize, Serialize};

/// Deployment mode read from the process environment at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Environment {
    /// `development`
    Development,
    /// `production`
    Production,
    /// Any other non-empty value, e.g. `test` or `staging`.
    Other(String),
    /// No mode configured.
    #[default]
    Unset,
}

impl Environment {
    /// Interpret an optional raw mode value.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::Unset,
            Some("development") => Self::Development,
            Some("production") => Self::Production,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Whether this is the `development` mode.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Whether this is the `production` mode.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// The raw mode name; empty when unset.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Other(s) => s,
            Self::Unset => "",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => f.write_str("(unset)"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        Self::from_value(Some(&value))
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        env.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_modes_parse() {
        assert_eq!(
            Environment::from_value(Some("development")),
            Environment::Development
        );
        assert_eq!(
            Environment::from_value(Some("production")),
            Environment::Production
        );
    }

    #[test]
    fn mode_match_is_case_sensitive() {
        assert_eq!(
            Environment::from_value(Some("Production")),
            Environment::Other("Production".to_string())
        );
        assert!(!Environment::from_value(Some("PRODUCTION")).is_production());
    }

    #[test]
    fn missing_or_empty_is_unset() {
        assert_eq!(Environment::from_value(None), Environment::Unset);
        assert_eq!(Environment::from_value(Some("")), Environment::Unset);
        assert_eq!(Environment::default(), Environment::Unset);
    }

    #[test]
    fn predicates() {
        assert!(Environment::Development.is_development());
        assert!(!Environment::Development.is_production());
        assert!(Environment::Production.is_production());
        assert!(!Environment::Other("test".into()).is_development());
        assert!(!Environment::Unset.is_production());
    }

    #[test]
    fn display_and_as_str() {
        assert_eq!(Environment::Other("staging".into()).as_str(), "staging");
        assert_eq!(Environment::Unset.to_string(), "(unset)");
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn serde_uses_plain_strings() {
        let json = serde_json::to_string(&Environment::Development).unwrap();
        assert_eq!(json, "\"development\"");
        let env: Environment = serde_json::from_str("\"test\"").unwrap();
        assert_eq!(env, Environment::Other("test".to_string()));
    }
}
