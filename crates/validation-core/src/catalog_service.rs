//! Model and test catalog operations exposed next to the results API.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;
use validation_state::{CatalogStore, ModelProject, ProjectKey, StorageError, ValidationTest};

use crate::domain::validation::check_alias;
use crate::domain::{NewModelProject, NewValidationTest, Result, ServiceError, ValidationError};
use crate::results_service::{creation_timestamp, Imported};

fn check_imported_alias(alias: Option<&String>) -> std::result::Result<(), ValidationError> {
    let errors = alias
        .and_then(|alias| check_alias(vec!["alias".into()], alias))
        .into_iter()
        .collect();
    ValidationError::check(errors)
}

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    #[instrument(skip(self, payload), fields(alias = ?payload.alias))]
    pub async fn create_model(&self, payload: NewModelProject) -> Result<ModelProject> {
        payload.validate()?;
        let model = payload.materialize(Uuid::new_v4(), creation_timestamp());
        let stored = self.catalog.insert_model(model).await?;
        info!(model_id = %stored.id, instances = stored.instances.len(), "model created");
        Ok(stored)
    }

    /// Store a model that keeps its own ids. An identical model already
    /// stored under the same id is left alone.
    #[instrument(skip(self, model), fields(model_id = %model.id))]
    pub async fn import_model(&self, model: ModelProject) -> Result<Imported> {
        check_imported_alias(model.alias.as_ref())?;
        match self.catalog.get_model(&ProjectKey::Id(model.id)).await {
            Ok(existing) if existing == model => return Ok(Imported::Unchanged),
            Ok(_) => {
                return Err(ServiceError::Conflict {
                    kind: "model",
                    key: model.id.to_string(),
                })
            }
            Err(StorageError::ModelNotFound { .. }) => {}
            Err(other) => return Err(other.into()),
        }
        self.catalog.insert_model(model).await?;
        Ok(Imported::Inserted)
    }

    /// Look a model up by id or alias.
    pub async fn get_model(&self, key: &str) -> Result<ModelProject> {
        Ok(self.catalog.get_model(&ProjectKey::parse(key)).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_model(&self, id: Uuid) -> Result<()> {
        self.catalog.delete_model(id).await?;
        info!(model_id = %id, "model deleted");
        Ok(())
    }

    #[instrument(skip(self, payload), fields(alias = ?payload.alias))]
    pub async fn create_test(&self, payload: NewValidationTest) -> Result<ValidationTest> {
        payload.validate()?;
        let test = payload.materialize(Uuid::new_v4(), creation_timestamp());
        let stored = self.catalog.insert_test(test).await?;
        info!(test_id = %stored.id, instances = stored.instances.len(), "test created");
        Ok(stored)
    }

    #[instrument(skip(self, test), fields(test_id = %test.id))]
    pub async fn import_test(&self, test: ValidationTest) -> Result<Imported> {
        check_imported_alias(test.alias.as_ref())?;
        match self.catalog.get_test(&ProjectKey::Id(test.id)).await {
            Ok(existing) if existing == test => return Ok(Imported::Unchanged),
            Ok(_) => {
                return Err(ServiceError::Conflict {
                    kind: "test",
                    key: test.id.to_string(),
                })
            }
            Err(StorageError::TestNotFound { .. }) => {}
            Err(other) => return Err(other.into()),
        }
        self.catalog.insert_test(test).await?;
        Ok(Imported::Inserted)
    }

    /// Look a test up by id or alias.
    pub async fn get_test(&self, key: &str) -> Result<ValidationTest> {
        Ok(self.catalog.get_test(&ProjectKey::parse(key)).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_test(&self, id: Uuid) -> Result<()> {
        self.catalog.delete_test(id).await?;
        info!(test_id = %id, "test deleted");
        Ok(())
    }
}
