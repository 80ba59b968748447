//! SurrealDB-backed ResultStore implementation
//!
//! Uses `schema::ResultRow` for persistence, converting to/from
//! `storage_traits::ValidationResult` at the boundary.

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::StorageError;
use crate::handle::SurrealHandle;
use crate::schema::ResultRow;
use crate::storage_traits::{ResultFilter, ResultStore, StorageResult, ValidationResult};

/// SurrealDB-backed implementation of [`ResultStore`].
#[derive(Clone)]
pub struct SurrealResultStore {
    db: Surreal<Any>,
}

impl SurrealResultStore {
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

    async fn fetch_row(&self, id: Uuid) -> StorageResult<Option<ResultRow>> {
        let mut res = self
            .db
            .query("SELECT * FROM results WHERE result_id = $rid")
            .bind(("rid", id.to_string()))
            .await?;

        let rows: Vec<ResultRow> = res.take(0)?;
        Ok(rows.into_iter().next())
    }
}

fn id_list<'a>(ids: impl Iterator<Item = &'a Uuid>) -> Vec<String> {
    ids.map(Uuid::to_string).collect()
}

#[async_trait]
impl ResultStore for SurrealResultStore {
    #[instrument(skip(self, result), fields(result_id = %result.id))]
    async fn insert_result(&self, result: ValidationResult) -> StorageResult<ValidationResult> {
        if self.fetch_row(result.id).await?.is_some() {
            return Err(StorageError::Conflict {
                kind: "validation result",
                key: result.id.to_string(),
            });
        }

        debug!("creating result row");

        let created: Option<ResultRow> = match self
            .db
            .create("results")
            .content(ResultRow::from(&result))
            .await
        {
            Ok(created) => created,
            Err(err) => {
                if self.fetch_row(result.id).await?.is_some() {
                    debug!(error = %err, "result id taken by a concurrent insert");
                    return Err(StorageError::Conflict {
                        kind: "validation result",
                        key: result.id.to_string(),
                    });
                }
                return Err(err.into());
            }
        };

        created
            .ok_or_else(|| StorageError::Backend("failed to create result".to_string()))
            .and_then(ValidationResult::try_from)
    }

    #[instrument(skip(self))]
    async fn get_result(&self, id: Uuid) -> StorageResult<ValidationResult> {
        self.fetch_row(id)
            .await?
            .ok_or(StorageError::ResultNotFound { id })
            .and_then(ValidationResult::try_from)
    }

    #[instrument(skip(self))]
    async fn delete_result(&self, id: Uuid) -> StorageResult<ValidationResult> {
        let mut res = self
            .db
            .query("DELETE FROM results WHERE result_id = $rid RETURN BEFORE")
            .bind(("rid", id.to_string()))
            .await?;

        let deleted: Vec<ResultRow> = res.take(0)?;
        deleted
            .into_iter()
            .next()
            .ok_or(StorageError::ResultNotFound { id })
            .and_then(ValidationResult::try_from)
    }

    #[instrument(skip(self, filter), fields(from_index = filter.from_index, size = filter.size))]
    async fn list_results(&self, filter: &ResultFilter) -> StorageResult<Vec<ValidationResult>> {
        if filter.is_unsatisfiable() || filter.size == 0 {
            return Ok(Vec::new());
        }

        let mut clauses = Vec::new();
        if filter.model_version_ids.is_some() {
            clauses.push("model_version_id IN $model_ids");
        }
        if filter.test_code_ids.is_some() {
            clauses.push("test_code_id IN $test_ids");
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM results {where_clause} \
             ORDER BY timestamp DESC, result_id ASC LIMIT {} START {}",
            filter.size, filter.from_index
        );

        let mut query = self.db.query(sql);
        if let Some(ids) = &filter.model_version_ids {
            query = query.bind(("model_ids", id_list(ids.iter())));
        }
        if let Some(ids) = &filter.test_code_ids {
            query = query.bind(("test_ids", id_list(ids.iter())));
        }

        let mut res = query.await?;
        let rows: Vec<ResultRow> = res.take(0)?;
        rows.into_iter().map(ValidationResult::try_from).collect()
    }
}
