//! In-process backends for the storage traits
//!
//! Provides `MemoryResultStore` and `MemoryCatalog`, which satisfy the trait
//! contracts without any external dependencies. Each map sits behind a
//! single `RwLock`, so inserts and deletes are atomic per id.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage_traits::*;

/// Newest first, ties broken by id so pages are stable.
pub(crate) fn listing_order(a: &ValidationResult, b: &ValidationResult) -> Ordering {
    b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id))
}

// ---------------------------------------------------------------------------
// MemoryResultStore
// ---------------------------------------------------------------------------

/// In-memory result store backed by a `HashMap<id, ValidationResult>`.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    results: RwLock<HashMap<Uuid, ValidationResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn insert_result(&self, result: ValidationResult) -> StorageResult<ValidationResult> {
        let mut results = self.results.write().await;
        if results.contains_key(&result.id) {
            return Err(StorageError::Conflict {
                kind: "validation result",
                key: result.id.to_string(),
            });
        }
        results.insert(result.id, result.clone());
        Ok(result)
    }

    async fn get_result(&self, id: Uuid) -> StorageResult<ValidationResult> {
        let results = self.results.read().await;
        results
            .get(&id)
            .cloned()
            .ok_or(StorageError::ResultNotFound { id })
    }

    async fn delete_result(&self, id: Uuid) -> StorageResult<ValidationResult> {
        let mut results = self.results.write().await;
        results
            .remove(&id)
            .ok_or(StorageError::ResultNotFound { id })
    }

    async fn list_results(&self, filter: &ResultFilter) -> StorageResult<Vec<ValidationResult>> {
        if filter.is_unsatisfiable() {
            return Ok(Vec::new());
        }
        let results = self.results.read().await;
        let mut matching: Vec<ValidationResult> = results
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(listing_order);
        Ok(matching
            .into_iter()
            .skip(filter.from_index)
            .take(filter.size)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryCatalog
// ---------------------------------------------------------------------------

/// In-memory catalog of model and test projects.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    models: RwLock<HashMap<Uuid, ModelProject>>,
    tests: RwLock<HashMap<Uuid, ValidationTest>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn alias_taken<'a>(mut aliases: impl Iterator<Item = Option<&'a String>>, alias: &str) -> bool {
    aliases.any(|existing| existing.map(String::as_str) == Some(alias))
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn insert_model(&self, model: ModelProject) -> StorageResult<ModelProject> {
        let mut models = self.models.write().await;
        if models.contains_key(&model.id) {
            return Err(StorageError::Conflict {
                kind: "model",
                key: model.id.to_string(),
            });
        }
        if let Some(alias) = &model.alias {
            if alias_taken(models.values().map(|m| m.alias.as_ref()), alias) {
                return Err(StorageError::Conflict {
                    kind: "model alias",
                    key: alias.clone(),
                });
            }
        }
        models.insert(model.id, model.clone());
        Ok(model)
    }

    async fn get_model(&self, key: &ProjectKey) -> StorageResult<ModelProject> {
        let models = self.models.read().await;
        let found = match key {
            ProjectKey::Id(id) => models.get(id),
            ProjectKey::Alias(alias) => models
                .values()
                .find(|m| m.alias.as_deref() == Some(alias.as_str())),
        };
        found.cloned().ok_or_else(|| StorageError::ModelNotFound {
            key: key.to_string(),
        })
    }

    async fn delete_model(&self, id: Uuid) -> StorageResult<()> {
        let mut models = self.models.write().await;
        models
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::ModelNotFound {
                key: id.to_string(),
            })
    }

    async fn model_instance_exists(&self, instance_id: Uuid) -> StorageResult<bool> {
        let models = self.models.read().await;
        Ok(models
            .values()
            .any(|m| m.instances.iter().any(|i| i.id == instance_id)))
    }

    async fn insert_test(&self, test: ValidationTest) -> StorageResult<ValidationTest> {
        let mut tests = self.tests.write().await;
        if tests.contains_key(&test.id) {
            return Err(StorageError::Conflict {
                kind: "test",
                key: test.id.to_string(),
            });
        }
        if let Some(alias) = &test.alias {
            if alias_taken(tests.values().map(|t| t.alias.as_ref()), alias) {
                return Err(StorageError::Conflict {
                    kind: "test alias",
                    key: alias.clone(),
                });
            }
        }
        tests.insert(test.id, test.clone());
        Ok(test)
    }

    async fn get_test(&self, key: &ProjectKey) -> StorageResult<ValidationTest> {
        let tests = self.tests.read().await;
        let found = match key {
            ProjectKey::Id(id) => tests.get(id),
            ProjectKey::Alias(alias) => tests
                .values()
                .find(|t| t.alias.as_deref() == Some(alias.as_str())),
        };
        found.cloned().ok_or_else(|| StorageError::TestNotFound {
            key: key.to_string(),
        })
    }

    async fn delete_test(&self, id: Uuid) -> StorageResult<()> {
        let mut tests = self.tests.write().await;
        tests
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::TestNotFound {
                key: id.to_string(),
            })
    }

    async fn test_instance_exists(&self, instance_id: Uuid) -> StorageResult<bool> {
        let tests = self.tests.read().await;
        Ok(tests
            .values()
            .any(|t| t.instances.iter().any(|i| i.id == instance_id)))
    }
}
