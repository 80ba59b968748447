//! Results orchestration: filtered listing, lookup, create with
//! referential checks, and delete.
//!
//! The service owns no state of its own; it combines a [`ResultStore`] with
//! the [`CatalogStore`] used to resolve filters and check references.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;
use validation_state::{CatalogStore, ResultStore, StorageError, ValidationResult};

use crate::domain::{NewValidationResult, ResultQuery, Result, ServiceError};
use crate::obs;

/// Creation timestamps are kept at microsecond precision so every backend
/// returns exactly what was stored.
pub fn creation_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Outcome of importing a record that already carries its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imported {
    Inserted,
    /// An identical record was already stored.
    Unchanged,
}

#[derive(Clone)]
pub struct ResultsService {
    results: Arc<dyn ResultStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl ResultsService {
    pub fn new(results: Arc<dyn ResultStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { results, catalog }
    }

    /// One page of results matching `query`, newest first.
    #[instrument(skip(self, query), fields(size = query.size, from_index = query.from_index))]
    pub async fn list(&self, query: &ResultQuery) -> Result<Vec<ValidationResult>> {
        let filter = query.resolve(self.catalog.as_ref()).await?;
        if filter.is_unsatisfiable() {
            debug!("filters resolved to an empty instance set");
        }

        let page = self.results.list_results(&filter).await?;
        obs::emit_results_listed(page.len(), query.from_index, query.size, query.is_filtered());
        Ok(page)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ValidationResult> {
        Ok(self.results.get_result(id).await?)
    }

    /// Validate, check both references, then persist with a fresh id and
    /// timestamp. Nothing is written when any check fails.
    #[instrument(skip(self, payload), fields(model_version_id = %payload.model_version_id, test_code_id = %payload.test_code_id))]
    pub async fn create(&self, payload: NewValidationResult) -> Result<ValidationResult> {
        payload.validate()?;
        self.check_references(payload.model_version_id, payload.test_code_id)
            .await?;

        let result = payload.materialize(Uuid::new_v4(), creation_timestamp());
        let stored = self.results.insert_result(result).await?;
        obs::emit_result_created(stored.id, stored.model_version_id, stored.test_code_id);
        Ok(stored)
    }

    /// Store a record that keeps its own id and timestamp, such as one read
    /// from a seed file. Runs the same checks as [`Self::create`]. A record
    /// stored under the same id must be identical or the import conflicts.
    #[instrument(skip(self, result), fields(result_id = %result.id))]
    pub async fn import(&self, result: ValidationResult) -> Result<Imported> {
        NewValidationResult::from(&result).validate()?;
        self.check_references(result.model_version_id, result.test_code_id)
            .await?;

        match self.results.get_result(result.id).await {
            Ok(existing) if existing == result => {
                debug!("identical result already stored");
                return Ok(Imported::Unchanged);
            }
            Ok(_) => {
                return Err(ServiceError::Conflict {
                    kind: "validation result",
                    key: result.id.to_string(),
                })
            }
            Err(StorageError::ResultNotFound { .. }) => {}
            Err(other) => return Err(other.into()),
        }

        self.results.insert_result(result).await?;
        Ok(Imported::Inserted)
    }

    async fn check_references(&self, model_version_id: Uuid, test_code_id: Uuid) -> Result<()> {
        if !self.catalog.model_instance_exists(model_version_id).await? {
            obs::emit_reference_rejected("model_version_id", model_version_id);
            return Err(ServiceError::DanglingReference {
                field: "model_version_id",
                id: model_version_id,
            });
        }
        if !self.catalog.test_instance_exists(test_code_id).await? {
            obs::emit_reference_rejected("test_code_id", test_code_id);
            return Err(ServiceError::DanglingReference {
                field: "test_code_id",
                id: test_code_id,
            });
        }
        Ok(())
    }

    /// Permanently remove a result, returning what was removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<ValidationResult> {
        let removed = self.results.delete_result(id).await?;
        obs::emit_result_deleted(removed.id);
        Ok(removed)
    }
}
