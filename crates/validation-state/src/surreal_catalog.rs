//! SurrealDB-backed CatalogStore implementation
//!
//! Instances are embedded in their project row, so instance lookups are a
//! `CONTAINS` over the embedded ids.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::StorageError;
use crate::handle::SurrealHandle;
use crate::schema::{ModelRow, TestRow};
use crate::storage_traits::{
    CatalogStore, ModelProject, ProjectKey, StorageResult, ValidationTest,
};

/// Projection used when only the owning project matters.
#[derive(serde::Deserialize)]
struct ProjectIdRow {
    project_id: String,
}

/// SurrealDB-backed implementation of [`CatalogStore`].
#[derive(Clone)]
pub struct SurrealCatalog {
    db: Surreal<Any>,
}

impl SurrealCatalog {
    pub fn new(handle: &SurrealHandle) -> Self {
        Self {
            db: handle.db().clone(),
        }
    }

    /// Connect to a private in-memory database (used by tests).
    pub async fn in_memory() -> crate::Result<Self> {
        let handle = SurrealHandle::setup_db().await?;
        Ok(Self::new(&handle))
    }

    async fn find_project<T: DeserializeOwned>(
        &self,
        table: &str,
        key: &ProjectKey,
    ) -> StorageResult<Option<T>> {
        let (column, value) = match key {
            ProjectKey::Id(id) => ("project_id", id.to_string()),
            ProjectKey::Alias(alias) => ("alias", alias.clone()),
        };
        let mut res = self
            .db
            .query(format!("SELECT * FROM {table} WHERE {column} = $value"))
            .bind(("value", value))
            .await?;

        let rows: Vec<T> = res.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Reject a project whose id or alias is already taken in `table`.
    async fn ensure_unique<T: DeserializeOwned>(
        &self,
        table: &str,
        kind: &'static str,
        alias_kind: &'static str,
        id: Uuid,
        alias: Option<&String>,
    ) -> StorageResult<()> {
        if self
            .find_project::<T>(table, &ProjectKey::Id(id))
            .await?
            .is_some()
        {
            return Err(StorageError::Conflict {
                kind,
                key: id.to_string(),
            });
        }
        if let Some(alias) = alias {
            if self
                .find_project::<T>(table, &ProjectKey::Alias(alias.clone()))
                .await?
                .is_some()
            {
                return Err(StorageError::Conflict {
                    kind: alias_kind,
                    key: alias.clone(),
                });
            }
        }
        Ok(())
    }

    /// Delete by project id, returning whether a row was removed.
    async fn delete_project(&self, table: &str, id: Uuid) -> StorageResult<bool> {
        let mut res = self
            .db
            .query(format!(
                "DELETE FROM {table} WHERE project_id = $pid RETURN BEFORE"
            ))
            .bind(("pid", id.to_string()))
            .await?;

        let deleted: Vec<ProjectIdRow> = res.take(0)?;
        Ok(deleted.iter().any(|row| row.project_id == id.to_string()))
    }

    async fn instance_exists(&self, table: &str, instance_id: Uuid) -> StorageResult<bool> {
        let mut res = self
            .db
            .query(format!(
                "SELECT project_id FROM {table} WHERE instances[*].instance_id CONTAINS $iid"
            ))
            .bind(("iid", instance_id.to_string()))
            .await?;

        let owners: Vec<ProjectIdRow> = res.take(0)?;
        if let Some(owner) = owners.first() {
            debug!(owner = %owner.project_id, "instance found");
            return Ok(true);
        }
        Ok(false)
    }
}

#[async_trait]
impl CatalogStore for SurrealCatalog {
    #[instrument(skip(self, model), fields(model_id = %model.id))]
    async fn insert_model(&self, model: ModelProject) -> StorageResult<ModelProject> {
        self.ensure_unique::<ModelRow>(
            "models",
            "model",
            "model alias",
            model.id,
            model.alias.as_ref(),
        )
        .await?;

        debug!("creating model row");
        let created: Option<ModelRow> = match self
            .db
            .create("models")
            .content(ModelRow::from(&model))
            .await
        {
            Ok(created) => created,
            Err(err) => {
                // A concurrent create that won the unique index surfaces here.
                self.ensure_unique::<ModelRow>(
                    "models",
                    "model",
                    "model alias",
                    model.id,
                    model.alias.as_ref(),
                )
                .await?;
                return Err(err.into());
            }
        };

        created
            .ok_or_else(|| StorageError::Backend("failed to create model".to_string()))
            .and_then(ModelProject::try_from)
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get_model(&self, key: &ProjectKey) -> StorageResult<ModelProject> {
        self.find_project::<ModelRow>("models", key)
            .await?
            .ok_or_else(|| StorageError::ModelNotFound {
                key: key.to_string(),
            })
            .and_then(ModelProject::try_from)
    }

    #[instrument(skip(self))]
    async fn delete_model(&self, id: Uuid) -> StorageResult<()> {
        if self.delete_project("models", id).await? {
            Ok(())
        } else {
            Err(StorageError::ModelNotFound {
                key: id.to_string(),
            })
        }
    }

    async fn model_instance_exists(&self, instance_id: Uuid) -> StorageResult<bool> {
        self.instance_exists("models", instance_id).await
    }

    #[instrument(skip(self, test), fields(test_id = %test.id))]
    async fn insert_test(&self, test: ValidationTest) -> StorageResult<ValidationTest> {
        self.ensure_unique::<TestRow>(
            "tests",
            "test",
            "test alias",
            test.id,
            test.alias.as_ref(),
        )
        .await?;

        debug!("creating test row");
        let created: Option<TestRow> = match self
            .db
            .create("tests")
            .content(TestRow::from(&test))
            .await
        {
            Ok(created) => created,
            Err(err) => {
                // A concurrent create that won the unique index surfaces here.
                self.ensure_unique::<TestRow>(
                    "tests",
                    "test",
                    "test alias",
                    test.id,
                    test.alias.as_ref(),
                )
                .await?;
                return Err(err.into());
            }
        };

        created
            .ok_or_else(|| StorageError::Backend("failed to create test".to_string()))
            .and_then(ValidationTest::try_from)
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get_test(&self, key: &ProjectKey) -> StorageResult<ValidationTest> {
        self.find_project::<TestRow>("tests", key)
            .await?
            .ok_or_else(|| StorageError::TestNotFound {
                key: key.to_string(),
            })
            .and_then(ValidationTest::try_from)
    }

    #[instrument(skip(self))]
    async fn delete_test(&self, id: Uuid) -> StorageResult<()> {
        if self.delete_project("tests", id).await? {
            Ok(())
        } else {
            Err(StorageError::TestNotFound {
                key: id.to_string(),
            })
        }
    }

    async fn test_instance_exists(&self, instance_id: Uuid) -> StorageResult<bool> {
        self.instance_exists("tests", instance_id).await
    }
}
