//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Each resource router owns one [`Store`]. Stores are in-memory and
//! process-local; cloning [`AppState`] clones handles, not data.
//!
//! Each store locks on its own, so a handler that checks one store and
//! writes another holds [`AppState::relations`] for the whole sequence.

use std::collections::HashMap;
use std::sync::Arc;

use casebook_core::Environment;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::HttpError;

// -- Generic In-Memory Store --------------------------------------------------

/// A record that can be kept in a [`Store`].
pub trait Record: Clone + Send + Sync {
    /// Primary key.
    fn id(&self) -> Uuid;
    /// Creation time, used for stable listing order.
    fn created_at(&self) -> DateTime<Utc>;
}

/// Store operation failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id.
    #[error("record {0} not found")]
    NotFound(Uuid),

    /// The write would duplicate the unique key of this existing record.
    #[error("conflicts with existing record {0}")]
    Conflict(Uuid),
}

impl StoreError {
    /// Render as a recognized HTTP error naming the resource kind.
    pub fn describe(self, resource: &str) -> HttpError {
        match self {
            Self::NotFound(id) => HttpError::not_found(format!("{resource} {id} not found")),
            Self::Conflict(id) => {
                HttpError::conflict(format!("{resource} conflicts with existing {resource} {id}"))
            }
        }
    }
}

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot` and never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Record> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Record> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Record> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, value: T) -> Option<T> {
        self.data.write().insert(value.id(), value)
    }

    /// Insert a record unless `conflicts(existing, &value)` holds for any stored record.
    ///
    /// The check and the insert happen under one write lock.
    pub fn insert_unique(
        &self,
        value: T,
        conflicts: impl Fn(&T, &T) -> bool,
    ) -> Result<T, StoreError> {
        let mut guard = self.data.write();
        if let Some(existing) = guard.values().find(|existing| conflicts(existing, &value)) {
            return Err(StoreError::Conflict(existing.id()));
        }
        guard.insert(value.id(), value.clone());
        Ok(value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records, oldest first.
    pub fn list(&self) -> Vec<T> {
        self.filter(|_| true)
    }

    /// List the records matching `pred`, oldest first.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let mut records: Vec<T> = self.data.read().values().filter(|r| pred(r)).cloned().collect();
        records.sort_by_key(|r| (r.created_at(), r.id()));
        records
    }

    /// Whether any record matches `pred`.
    pub fn any(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.data.read().values().any(pred)
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        let entry = guard.get_mut(id)?;
        f(entry);
        Some(entry.clone())
    }

    /// Apply `f` to a copy of the record and commit it unless the result
    /// conflicts with another stored record.
    pub fn update_unique(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T),
        conflicts: impl Fn(&T, &T) -> bool,
    ) -> Result<T, StoreError> {
        let mut guard = self.data.write();
        let mut candidate = guard.get(id).cloned().ok_or(StoreError::NotFound(*id))?;
        f(&mut candidate);
        if let Some(existing) = guard
            .values()
            .find(|existing| existing.id() != *id && conflicts(existing, &candidate))
        {
            return Err(StoreError::Conflict(existing.id()));
        }
        guard.insert(*id, candidate.clone());
        Ok(candidate)
    }

    /// Apply `f` to every record matching `pred`. Returns the number updated.
    pub fn update_where(&self, pred: impl Fn(&T) -> bool, f: impl Fn(&mut T)) -> usize {
        let mut guard = self.data.write();
        let mut updated = 0;
        for record in guard.values_mut().filter(|r| pred(r)) {
            f(record);
            updated += 1;
        }
        updated
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Remove every record for which `keep` returns false. Returns the number removed.
    pub fn retain(&self, keep: impl Fn(&T) -> bool) -> usize {
        let mut guard = self.data.write();
        let before = guard.len();
        guard.retain(|_, record| keep(record));
        before - guard.len()
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Record> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Resource Records ---------------------------------------------------------

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Record for $ty {
                fn id(&self) -> Uuid {
                    self.id
                }

                fn created_at(&self) -> DateTime<Utc> {
                    self.created_at
                }
            }
        )+
    };
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    /// Lowercased, unique.
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A case study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Case {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub main_category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A free-form label; names are unique ignoring ASCII case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Association between a tag and a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TagCase {
    pub id: Uuid,
    pub tag_id: Uuid,
    pub case_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Top-level case category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MainCategory {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category nested under a [`MainCategory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubCategory {
    pub id: Uuid,
    pub name: String,
    pub main_category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named, optionally user-owned set of cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Association between a case and a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CaseCollection {
    pub id: Uuid,
    pub case_id: Uuid,
    pub collection_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_record!(
    User,
    Case,
    Tag,
    TagCase,
    MainCategory,
    SubCategory,
    Collection,
    CaseCollection,
);

// -- Application State --------------------------------------------------------

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Store<User>,
    pub cases: Store<Case>,
    pub tags: Store<Tag>,
    pub tag_cases: Store<TagCase>,
    pub main_categories: Store<MainCategory>,
    pub sub_categories: Store<SubCategory>,
    pub collections: Store<Collection>,
    pub case_collections: Store<CaseCollection>,
    relations: Arc<Mutex<()>>,
}

impl AppState {
    /// State with default configuration (mode unset).
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// State with the given configuration and empty stores.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            users: Store::new(),
            cases: Store::new(),
            tags: Store::new(),
            tag_cases: Store::new(),
            main_categories: Store::new(),
            sub_categories: Store::new(),
            collections: Store::new(),
            case_collections: Store::new(),
            relations: Arc::new(Mutex::new(())),
        }
    }

    /// Exclusive gate for writes whose validity depends on another store.
    ///
    /// Not to be held across `.await`.
    pub fn relations(&self) -> MutexGuard<'_, ()> {
        self.relations.lock()
    }

    /// Runtime mode.
    pub fn environment(&self) -> &Environment {
        &self.config.environment
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
