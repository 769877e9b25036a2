//! # Environment File Loader
//!
//! Loads a `.env`-style file into the process environment once, before
//! configuration is read. Variables already present in the environment win.
//!
//! Outside production a file that fails to load (including a missing file)
//! aborts startup. In production the failure is reported and ignored, since
//! deployments inject variables directly.

use std::path::{Path, PathBuf};

use casebook_core::Environment;
use thiserror::Error;

use crate::config::environment_from;

/// Environment file used when `ENV_FILE` is not set.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Outcome of a non-fatal environment file load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFile {
    /// The file was read into the process environment.
    Loaded(PathBuf),
    /// The file could not be loaded; tolerated in production.
    Skipped { path: PathBuf, reason: String },
}

/// Fatal environment file failure.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The file could not be loaded outside production.
    #[error("failed to load environment file {path} (mode: {environment}): {source}")]
    Load {
        path: PathBuf,
        environment: Environment,
        #[source]
        source: dotenvy::Error,
    },
}

/// Load the environment file named by `ENV_FILE` (default `.env`).
///
/// Returns the runtime mode observed after loading, so a mode defined in
/// the file itself takes effect.
pub fn load_env_file() -> Result<(Environment, EnvFile), EnvError> {
    let path = std::env::var_os("ENV_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));
    let result = dotenvy::from_path(&path);
    let environment = environment_from(|key| std::env::var(key).ok());
    let file = resolve(&path, result, &environment)?;
    Ok((environment, file))
}

/// Decide whether a load result is fatal under the given mode.
pub fn resolve(
    path: &Path,
    result: Result<(), dotenvy::Error>,
    environment: &Environment,
) -> Result<EnvFile, EnvError> {
    match result {
        Ok(()) => Ok(EnvFile::Loaded(path.to_path_buf())),
        Err(err) if environment.is_production() => Ok(EnvFile::Skipped {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
        Err(source) => Err(EnvError::Load {
            path: path.to_path_buf(),
            environment: environment.clone(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn missing() -> (PathBuf, Result<(), dotenvy::Error>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.env");
        let result = dotenvy::from_path(&path);
        (path, result)
    }

    #[test]
    fn missing_file_is_fatal_in_development() {
        let (path, result) = missing();
        let err = resolve(&path, result, &Environment::Development).unwrap_err();
        assert!(err.to_string().contains("absent.env"));
    }

    #[test]
    fn missing_file_is_fatal_when_mode_unset() {
        let (path, result) = missing();
        assert!(resolve(&path, result, &Environment::Unset).is_err());
    }

    #[test]
    fn missing_file_is_tolerated_in_production() {
        let (path, result) = missing();
        match resolve(&path, result, &Environment::Production).unwrap() {
            EnvFile::Skipped { path: skipped, .. } => assert_eq!(skipped, path),
            other => panic!("expected Skipped, got {other:?}"),
        }
    }

    #[test]
    fn existing_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CASEBOOK_ENV_LOADER_TEST=loaded").unwrap();
        let result = dotenvy::from_path(file.path());
        let outcome = resolve(file.path(), result, &Environment::Development).unwrap();
        assert_eq!(outcome, EnvFile::Loaded(file.path().to_path_buf()));
        assert_eq!(
            std::env::var("CASEBOOK_ENV_LOADER_TEST").as_deref(),
            Ok("loaded")
        );
    }
}
