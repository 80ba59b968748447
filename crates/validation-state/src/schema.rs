//! Row definitions for the SurrealDB tables
//!
//! Tables:
//! - results: validation results
//! - models: model projects with embedded instances
//! - tests: validation tests with embedded instances
//!
//! Rows carry their own `*_id` string columns; the SurrealDB record id is
//! random and never exposed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage_traits::{
    ModelInstance, ModelProject, TestInstance, ValidationResult, ValidationTest,
};

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Value of the unique `alias_key` column: the alias when set, otherwise
/// the project id, prefixed so the two never collide.
pub fn alias_key(alias: Option<&str>, project_id: &str) -> String {
    match alias {
        Some(alias) => format!("alias:{alias}"),
        None => format!("id:{project_id}"),
    }
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(raw).map_err(|e| StorageError::Corrupt(format!("{field} = {raw:?}: {e}")))
}

/// Row in the `results` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    /// SurrealDB record ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub result_id: String,
    pub model_version_id: String,
    pub test_code_id: String,
    #[serde(with = "surreal_datetime")]
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub normalized_score: Option<f64>,
    pub passed: Option<bool>,
    pub results_storage: Vec<String>,
}

impl From<&ValidationResult> for ResultRow {
    fn from(result: &ValidationResult) -> Self {
        ResultRow {
            id: None,
            result_id: result.id.to_string(),
            model_version_id: result.model_version_id.to_string(),
            test_code_id: result.test_code_id.to_string(),
            timestamp: result.timestamp,
            score: result.score,
            normalized_score: result.normalized_score,
            passed: result.passed,
            results_storage: result.results_storage.clone(),
        }
    }
}

impl TryFrom<ResultRow> for ValidationResult {
    type Error = StorageError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        Ok(ValidationResult {
            id: parse_uuid("result_id", &row.result_id)?,
            model_version_id: parse_uuid("model_version_id", &row.model_version_id)?,
            test_code_id: parse_uuid("test_code_id", &row.test_code_id)?,
            timestamp: row.timestamp,
            score: row.score,
            normalized_score: row.normalized_score,
            passed: row.passed,
            results_storage: row.results_storage,
        })
    }
}

/// Instance embedded in a `models` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInstanceRow {
    pub instance_id: String,
    pub version: String,
    pub source: Option<String>,
    #[serde(with = "surreal_datetime")]
    pub timestamp: DateTime<Utc>,
}

/// Row in the `models` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub project_id: String,
    pub name: String,
    pub alias: Option<String>,
    #[serde(default)]
    pub alias_key: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub instances: Vec<ModelInstanceRow>,
}

impl From<&ModelProject> for ModelRow {
    fn from(model: &ModelProject) -> Self {
        ModelRow {
            id: None,
            project_id: model.id.to_string(),
            name: model.name.clone(),
            alias: model.alias.clone(),
            alias_key: alias_key(model.alias.as_deref(), &model.id.to_string()),
            author: model.author.clone(),
            description: model.description.clone(),
            instances: model
                .instances
                .iter()
                .map(|i| ModelInstanceRow {
                    instance_id: i.id.to_string(),
                    version: i.version.clone(),
                    source: i.source.clone(),
                    timestamp: i.timestamp,
                })
                .collect(),
        }
    }
}

impl TryFrom<ModelRow> for ModelProject {
    type Error = StorageError;

    fn try_from(row: ModelRow) -> Result<Self, Self::Error> {
        let instances = row
            .instances
            .into_iter()
            .map(|i| {
                Ok(ModelInstance {
                    id: parse_uuid("instance_id", &i.instance_id)?,
                    version: i.version,
                    source: i.source,
                    timestamp: i.timestamp,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(ModelProject {
            id: parse_uuid("project_id", &row.project_id)?,
            name: row.name,
            alias: row.alias,
            author: row.author,
            description: row.description,
            instances,
        })
    }
}

/// Instance embedded in a `tests` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestInstanceRow {
    pub instance_id: String,
    pub version: String,
    pub repository: Option<String>,
    pub path: Option<String>,
    #[serde(with = "surreal_datetime")]
    pub timestamp: DateTime<Utc>,
}

/// Row in the `tests` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub project_id: String,
    pub name: String,
    pub alias: Option<String>,
    #[serde(default)]
    pub alias_key: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub instances: Vec<TestInstanceRow>,
}

impl From<&ValidationTest> for TestRow {
    fn from(test: &ValidationTest) -> Self {
        TestRow {
            id: None,
            project_id: test.id.to_string(),
            name: test.name.clone(),
            alias: test.alias.clone(),
            alias_key: alias_key(test.alias.as_deref(), &test.id.to_string()),
            author: test.author.clone(),
            description: test.description.clone(),
            instances: test
                .instances
                .iter()
                .map(|i| TestInstanceRow {
                    instance_id: i.id.to_string(),
                    version: i.version.clone(),
                    repository: i.repository.clone(),
                    path: i.path.clone(),
                    timestamp: i.timestamp,
                })
                .collect(),
        }
    }
}

impl TryFrom<TestRow> for ValidationTest {
    type Error = StorageError;

    fn try_from(row: TestRow) -> Result<Self, Self::Error> {
        let instances = row
            .instances
            .into_iter()
            .map(|i| {
                Ok(TestInstance {
                    id: parse_uuid("instance_id", &i.instance_id)?,
                    version: i.version,
                    repository: i.repository,
                    path: i.path,
                    timestamp: i.timestamp,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(ValidationTest {
            id: parse_uuid("project_id", &row.project_id)?,
            name: row.name,
            alias: row.alias,
            author: row.author,
            description: row.description,
            instances,
        })
    }
}
