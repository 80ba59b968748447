//! Storage trait definitions for the validation results service
//!
//! These traits define the core storage abstractions:
//! - `ResultStore`: validation result persistence (insert, get, delete, filtered listing)
//! - `CatalogStore`: model and test projects with their instances
//!
//! All traits are async and backend-agnostic. In-process implementations
//! live in the `memory` module, SurrealDB ones in `surreal_results` and
//! `surreal_catalog`.

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Outcome of running one test instance against one model instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Server-assigned identifier
    pub id: Uuid,
    /// Model instance that was validated
    pub model_version_id: Uuid,
    /// Test instance that produced the score
    pub test_code_id: Uuid,
    /// When the result was recorded
    pub timestamp: DateTime<Utc>,
    /// Raw score
    pub score: f64,
    /// Score normalised against the test's reference data
    pub normalized_score: Option<f64>,
    /// Pass/fail verdict, when the test defines one
    pub passed: Option<bool>,
    /// URLs of artifacts produced during the run
    pub results_storage: Vec<String>,
}

/// One released version of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInstance {
    pub id: Uuid,
    pub version: String,
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A model project and all of its instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProject {
    pub id: Uuid,
    pub name: String,
    pub alias: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub instances: Vec<ModelInstance>,
}

impl ModelProject {
    /// Ids of every instance of this model.
    pub fn instance_ids(&self) -> InstanceSet {
        self.instances.iter().map(|i| i.id).collect()
    }
}

/// One released version of a validation test's code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestInstance {
    pub id: Uuid,
    pub version: String,
    pub repository: Option<String>,
    pub path: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A validation test definition and all of its instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationTest {
    pub id: Uuid,
    pub name: String,
    pub alias: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub instances: Vec<TestInstance>,
}

impl ValidationTest {
    /// Ids of every instance of this test.
    pub fn instance_ids(&self) -> InstanceSet {
        self.instances.iter().map(|i| i.id).collect()
    }
}

// ---------------------------------------------------------------------------
// Lookup keys and filters
// ---------------------------------------------------------------------------

/// Key addressing a model or test project: either its id or its alias.
///
/// Aliases never parse as UUIDs, so a raw path segment maps to exactly one
/// variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectKey {
    Id(Uuid),
    Alias(String),
}

impl ProjectKey {
    /// Interpret a raw path segment or query value.
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => ProjectKey::Id(id),
            Err(_) => ProjectKey::Alias(raw.to_string()),
        }
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKey::Id(id) => write!(f, "{id}"),
            ProjectKey::Alias(alias) => write!(f, "{alias}"),
        }
    }
}

/// Canonical set of instance ids a filter resolved to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceSet(BTreeSet<Uuid>);

impl InstanceSet {
    pub fn single(id: Uuid) -> Self {
        InstanceSet(BTreeSet::from([id]))
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.0.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.0.iter()
    }

    /// Ids present in both sets.
    pub fn intersect(&self, other: &InstanceSet) -> InstanceSet {
        InstanceSet(self.0.intersection(&other.0).copied().collect())
    }
}

impl FromIterator<Uuid> for InstanceSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        InstanceSet(iter.into_iter().collect())
    }
}

/// Store-level listing filter.
///
/// `None` leaves a side unconstrained; `Some(set)` requires membership.
/// Constraining the same side twice keeps the intersection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultFilter {
    pub model_version_ids: Option<InstanceSet>,
    pub test_code_ids: Option<InstanceSet>,
    pub from_index: usize,
    pub size: usize,
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self {
            model_version_ids: None,
            test_code_ids: None,
            from_index: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ResultFilter {
    /// Unconstrained filter returning one page.
    pub fn page(from_index: usize, size: usize) -> Self {
        Self {
            from_index,
            size,
            ..Self::default()
        }
    }

    /// Require `model_version_id` to be in `ids`.
    pub fn with_model_versions(mut self, ids: InstanceSet) -> Self {
        self.model_version_ids = Some(match self.model_version_ids.take() {
            Some(existing) => existing.intersect(&ids),
            None => ids,
        });
        self
    }

    /// Require `test_code_id` to be in `ids`.
    pub fn with_test_codes(mut self, ids: InstanceSet) -> Self {
        self.test_code_ids = Some(match self.test_code_ids.take() {
            Some(existing) => existing.intersect(&ids),
            None => ids,
        });
        self
    }

    /// True when some side resolved to an empty set, so nothing can match.
    pub fn is_unsatisfiable(&self) -> bool {
        self.model_version_ids.as_ref().is_some_and(InstanceSet::is_empty)
            || self.test_code_ids.as_ref().is_some_and(InstanceSet::is_empty)
    }

    /// Whether `result` passes both instance constraints (paging ignored).
    pub fn matches(&self, result: &ValidationResult) -> bool {
        let model_ok = self
            .model_version_ids
            .as_ref()
            .map(|ids| ids.contains(&result.model_version_id))
            .unwrap_or(true);
        let test_ok = self
            .test_code_ids
            .as_ref()
            .map(|ids| ids.contains(&result.test_code_id))
            .unwrap_or(true);
        model_ok && test_ok
    }
}

// ---------------------------------------------------------------------------
// ResultStore - Validation Result Persistence
// ---------------------------------------------------------------------------

/// Validation result store.
///
/// Guarantees:
/// - `insert_result` is all-or-nothing; a duplicate id is a `Conflict`.
/// - `get_result` returns exactly what `insert_result` stored.
/// - `delete_result` is permanent; a missing id is `ResultNotFound`.
/// - `list_results` orders newest `timestamp` first, ties by `id` ascending,
///   then applies `from_index` and `size`.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist a fully materialised result.
    async fn insert_result(&self, result: ValidationResult) -> StorageResult<ValidationResult>;

    /// Fetch a result by id.
    async fn get_result(&self, id: Uuid) -> StorageResult<ValidationResult>;

    /// Remove a result, returning what was removed.
    async fn delete_result(&self, id: Uuid) -> StorageResult<ValidationResult>;

    /// List one page of results matching `filter`.
    async fn list_results(&self, filter: &ResultFilter) -> StorageResult<Vec<ValidationResult>>;
}

// ---------------------------------------------------------------------------
// CatalogStore - Models and Tests
// ---------------------------------------------------------------------------

/// Model/test catalog.
///
/// Semantics:
/// - Project ids and aliases are unique per kind; inserting a duplicate
///   is a `Conflict`.
/// - Lookups accept either id or alias via `ProjectKey`.
/// - Deleting a project removes its instances but never touches results.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_model(&self, model: ModelProject) -> StorageResult<ModelProject>;

    async fn get_model(&self, key: &ProjectKey) -> StorageResult<ModelProject>;

    async fn delete_model(&self, id: Uuid) -> StorageResult<()>;

    /// Whether any model owns an instance with this id.
    async fn model_instance_exists(&self, instance_id: Uuid) -> StorageResult<bool>;

    async fn insert_test(&self, test: ValidationTest) -> StorageResult<ValidationTest>;

    async fn get_test(&self, key: &ProjectKey) -> StorageResult<ValidationTest>;

    async fn delete_test(&self, id: Uuid) -> StorageResult<()>;

    /// Whether any test owns an instance with this id.
    async fn test_instance_exists(&self, instance_id: Uuid) -> StorageResult<bool>;
}
