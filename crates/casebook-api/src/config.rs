//! # Configuration
//!
//! Typed server settings read from the process environment after the
//! environment file has been loaded (see [`crate::env`]).

use std::net::SocketAddr;

use casebook_core::Environment;
use thiserror::Error;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default request body limit (100 KiB).
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Runtime mode.
    pub environment: Environment,
    /// Port to listen on.
    pub port: u16,
    /// Maximum accepted request body size in bytes.
    pub body_limit: usize,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Unset,
            port: DEFAULT_PORT,
            body_limit: DEFAULT_BODY_LIMIT,
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `APP_ENV` (falls back to `NODE_ENV`): runtime mode
    /// - `PORT`: listen port (default: 8000)
    /// - `BODY_LIMIT_BYTES`: request body limit (default: 102400)
    /// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("expected a port number, got \"{raw}\""),
            })?,
            None => defaults.port,
        };

        let body_limit = match lookup("BODY_LIMIT_BYTES") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "BODY_LIMIT_BYTES".to_string(),
                        reason: format!("expected a positive byte count, got \"{raw}\""),
                    })
                }
            },
            None => defaults.body_limit,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "LOG_FORMAT".to_string(),
                    reason: format!("expected \"pretty\" or \"json\", got \"{other}\""),
                })
            }
        };

        Ok(Self {
            environment: environment_from(&lookup),
            port,
            body_limit,
            log_format,
        })
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Resolve the runtime mode: `APP_ENV`, then `NODE_ENV`.
pub fn environment_from(lookup: impl Fn(&str) -> Option<String>) -> Environment {
    let raw = lookup("APP_ENV")
        .filter(|v| !v.is_empty())
        .or_else(|| lookup("NODE_ENV"));
    Environment::from_value(raw.as_deref())
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 8000);
        assert_eq!(config.body_limit, 100 * 1024);
    }

    #[test]
    fn reads_all_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("PORT", "9090"),
            ("BODY_LIMIT_BYTES", "2048"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.port, 9090);
        assert_eq!(config.body_limit, 2048);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.socket_addr().port(), 9090);
    }

    #[test]
    fn node_env_is_a_fallback() {
        let env = environment_from(lookup(&[("NODE_ENV", "development")]));
        assert_eq!(env, Environment::Development);

        let env = environment_from(lookup(&[
            ("APP_ENV", "production"),
            ("NODE_ENV", "development"),
        ]));
        assert_eq!(env, Environment::Production);
    }

    #[test]
    fn rejects_bad_port() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn rejects_zero_body_limit() {
        assert!(AppConfig::from_lookup(lookup(&[("BODY_LIMIT_BYTES", "0")])).is_err());
    }

    #[test]
    fn rejects_unknown_log_format() {
        let err = AppConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(err.to_string().contains("LOG_FORMAT"));
    }
}
