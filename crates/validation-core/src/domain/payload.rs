//! Client-supplied payloads for create operations.
//!
//! Payloads never carry server-assigned fields (`id`, `timestamp`); those
//! are filled in by `materialize`. Structural problems (missing fields,
//! wrong JSON types) surface as deserialization errors, value-level
//! problems through `validate`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validation_state::{
    ModelInstance, ModelProject, TestInstance, ValidationResult, ValidationTest,
};

use super::error::{FieldError, LocSegment, ValidationError};
use super::validation::{check_alias, check_finite, check_not_blank, check_url};

fn body(path: &[&str]) -> Vec<LocSegment> {
    std::iter::once("body")
        .chain(path.iter().copied())
        .map(LocSegment::from)
        .collect()
}

fn body_indexed(field: &str, index: usize, rest: &[&str]) -> Vec<LocSegment> {
    let mut loc = body(&[field]);
    loc.push(LocSegment::Index(index));
    loc.extend(rest.iter().copied().map(LocSegment::from));
    loc
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Payload of `POST /results/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewValidationResult {
    pub model_version_id: Uuid,
    pub test_code_id: Uuid,
    pub score: f64,
    #[serde(default)]
    pub normalized_score: Option<f64>,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default)]
    pub results_storage: Vec<String>,
}

impl NewValidationResult {
    /// Value-level checks: finite scores and absolute URLs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors: Vec<FieldError> = Vec::new();
        errors.extend(check_finite(body(&["score"]), self.score));
        if let Some(normalized) = self.normalized_score {
            errors.extend(check_finite(body(&["normalized_score"]), normalized));
        }
        for (i, raw) in self.results_storage.iter().enumerate() {
            errors.extend(check_url(body_indexed("results_storage", i, &[]), raw));
        }
        ValidationError::check(errors)
    }

    pub fn materialize(self, id: Uuid, timestamp: DateTime<Utc>) -> ValidationResult {
        ValidationResult {
            id,
            model_version_id: self.model_version_id,
            test_code_id: self.test_code_id,
            timestamp,
            score: self.score,
            normalized_score: self.normalized_score,
            passed: self.passed,
            results_storage: self.results_storage,
        }
    }
}

/// The client-suppliable part of a stored record, so imported records go
/// through the same value checks as created ones.
impl From<&ValidationResult> for NewValidationResult {
    fn from(result: &ValidationResult) -> Self {
        NewValidationResult {
            model_version_id: result.model_version_id,
            test_code_id: result.test_code_id,
            score: result.score,
            normalized_score: result.normalized_score,
            passed: result.passed,
            results_storage: result.results_storage.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModelInstance {
    pub version: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Payload of `POST /models/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModelProject {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instances: Vec<NewModelInstance>,
}

impl NewModelProject {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors: Vec<FieldError> = Vec::new();
        errors.extend(check_not_blank(body(&["name"]), &self.name));
        if let Some(alias) = &self.alias {
            errors.extend(check_alias(body(&["alias"]), alias));
        }
        for (i, instance) in self.instances.iter().enumerate() {
            errors.extend(check_not_blank(
                body_indexed("instances", i, &["version"]),
                &instance.version,
            ));
            if let Some(source) = &instance.source {
                errors.extend(check_url(body_indexed("instances", i, &["source"]), source));
            }
        }
        ValidationError::check(errors)
    }

    /// Assign the project id and a fresh id per instance.
    pub fn materialize(self, id: Uuid, timestamp: DateTime<Utc>) -> ModelProject {
        ModelProject {
            id,
            name: self.name,
            alias: self.alias,
            author: self.author,
            description: self.description,
            instances: self
                .instances
                .into_iter()
                .map(|i| ModelInstance {
                    id: Uuid::new_v4(),
                    version: i.version,
                    source: i.source,
                    timestamp,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTestInstance {
    pub version: String,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Payload of `POST /tests/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewValidationTest {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instances: Vec<NewTestInstance>,
}

impl NewValidationTest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors: Vec<FieldError> = Vec::new();
        errors.extend(check_not_blank(body(&["name"]), &self.name));
        if let Some(alias) = &self.alias {
            errors.extend(check_alias(body(&["alias"]), alias));
        }
        for (i, instance) in self.instances.iter().enumerate() {
            errors.extend(check_not_blank(
                body_indexed("instances", i, &["version"]),
                &instance.version,
            ));
            if let Some(repository) = &instance.repository {
                errors.extend(check_url(
                    body_indexed("instances", i, &["repository"]),
                    repository,
                ));
            }
        }
        ValidationError::check(errors)
    }

    pub fn materialize(self, id: Uuid, timestamp: DateTime<Utc>) -> ValidationTest {
        ValidationTest {
            id,
            name: self.name,
            alias: self.alias,
            author: self.author,
            description: self.description,
            instances: self
                .instances
                .into_iter()
                .map(|i| TestInstance {
                    id: Uuid::new_v4(),
                    version: i.version,
                    repository: i.repository,
                    path: i.path,
                    timestamp,
                })
                .collect(),
        }
    }
}
