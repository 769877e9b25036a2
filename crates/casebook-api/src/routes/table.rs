//! # Route Table
//!
//! Binds each resource router to one or more path prefixes, in total
//! order. The table is built once at startup and consumed into the Axum
//! router; it is never mutated afterwards.
//!
//! Prefixes are checked when mounted: a prefix must start with `/`, must
//! not end with `/`, must not be the root, and must not contain route
//! parameters. Two prefixes overlap when they are equal or when one is a
//! path-segment prefix of the other, and overlapping mounts are refused
//! with [`MountError::Overlap`] rather than silently resolved by order.

use axum::Router;
use thiserror::Error;

use crate::state::AppState;

use super::{
    cases, cases_by_collections, collections, main_categories, sub_categories, tags,
    tags_by_cases, users,
};

/// Startup failure while building the route table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    /// The prefix is not a usable mount point.
    #[error("invalid mount prefix {prefix:?}: {reason}")]
    InvalidPrefix {
        prefix: String,
        reason: &'static str,
    },

    /// The prefix would claim traffic already claimed by another mount.
    #[error("mount prefix {prefix:?} for {router} overlaps {existing:?}")]
    Overlap {
        prefix: String,
        existing: String,
        router: &'static str,
    },

    /// A router was mounted without any prefix.
    #[error("router {0} mounted without a prefix")]
    NoPrefixes(&'static str),
}

/// One router and the prefixes it is reachable under.
pub struct Mount {
    name: &'static str,
    prefixes: Vec<String>,
    router: Router<AppState>,
}

impl Mount {
    /// Router name, for logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Prefixes in registration order.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl std::fmt::Debug for Mount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mount")
            .field("name", &self.name)
            .field("prefixes", &self.prefixes)
            .finish_non_exhaustive()
    }
}

/// Ordered prefix → router table.
#[derive(Debug, Default)]
pub struct RouteTable {
    mounts: Vec<Mount>,
}

impl RouteTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `router` under every prefix in `prefixes`.
    pub fn mount<I, P>(
        mut self,
        prefixes: I,
        name: &'static str,
        router: Router<AppState>,
    ) -> Result<Self, MountError>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut accepted: Vec<String> = Vec::new();
        for prefix in prefixes {
            let prefix = prefix.into();
            validate_prefix(&prefix)?;
            let claimed = self
                .mounts
                .iter()
                .flat_map(|m| m.prefixes.iter())
                .chain(accepted.iter());
            for existing in claimed {
                if overlaps(existing, &prefix) {
                    return Err(MountError::Overlap {
                        prefix,
                        existing: existing.clone(),
                        router: name,
                    });
                }
            }
            accepted.push(prefix);
        }
        if accepted.is_empty() {
            return Err(MountError::NoPrefixes(name));
        }

        self.mounts.push(Mount {
            name,
            prefixes: accepted,
            router,
        });
        Ok(self)
    }

    /// Mounts in registration order.
    pub fn entries(&self) -> &[Mount] {
        &self.mounts
    }

    /// Name of the router that claims `path`, if any.
    pub fn resolve(&self, path: &str) -> Option<&'static str> {
        self.mounts
            .iter()
            .find(|m| m.prefixes.iter().any(|p| claims(p, path)))
            .map(|m| m.name)
    }

    /// Nest every router under each of its prefixes.
    ///
    /// A router's `/` route answers the bare prefix only; `{prefix}/` falls
    /// through to the not-found handler.
    pub fn into_router(self) -> Router<AppState> {
        self.mounts
            .into_iter()
            .fold(Router::new(), |app, mount| {
                mount
                    .prefixes
                    .iter()
                    .fold(app, |app, prefix| app.nest(prefix, mount.router.clone()))
            })
    }
}

/// Whether two prefixes would claim some common path.
pub fn overlaps(a: &str, b: &str) -> bool {
    claims(a, b) || claims(b, a)
}

fn claims(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn validate_prefix(prefix: &str) -> Result<(), MountError> {
    let reason = if !prefix.starts_with('/') {
        Some("must start with '/'")
    } else if prefix == "/" {
        Some("the root path is reserved")
    } else if prefix.ends_with('/') {
        Some("must not end with '/'")
    } else if prefix.contains("//") {
        Some("must not contain empty segments")
    } else if prefix.contains(&['{', '}', '*'][..]) {
        Some("must not contain route parameters")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(MountError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// The service's route table.
pub fn route_table() -> Result<RouteTable, MountError> {
    RouteTable::new()
        .mount(["/api/users", "/user"], "users", users::router())?
        .mount(["/api/cases"], "cases", cases::router())?
        .mount(["/api/tags"], "tags", tags::router())?
        .mount(["/api/tags_by_cases"], "tags_by_cases", tags_by_cases::router())?
        .mount(
            ["/api/main_categories"],
            "main_categories",
            main_categories::router(),
        )?
        .mount(
            ["/api/sub_categories"],
            "sub_categories",
            sub_categories::router(),
        )?
        .mount(["/api/collections"], "collections", collections::router())?
        .mount(
            ["/api/cases_by_collections"],
            "cases_by_collections",
            cases_by_collections::router(),
        )
}
