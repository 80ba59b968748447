//! Fixture loading.
//!
//! A seed file is a JSON object with optional `models`, `tests` and
//! `results` arrays in the stored record format, ids included. Records go
//! through the same checks as API creates, with ids and timestamps kept.
//! Records already stored with identical content are skipped, so the same
//! file can be applied on every start of a persistent store.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validation_core::{CatalogService, Imported, ResultsService, ServiceError};
use validation_state::{ModelProject, ValidationResult, ValidationTest};

use crate::store::Stores;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid seed file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("seed {kind} {id} rejected: {source}")]
    Rejected {
        kind: &'static str,
        id: Uuid,
        source: ServiceError,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub models: Vec<ModelProject>,
    #[serde(default)]
    pub tests: Vec<ValidationTest>,
    #[serde(default)]
    pub results: Vec<ValidationResult>,
}

/// Counts of records inserted by [`SeedData::apply`]; `unchanged` counts
/// records of any kind that were already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub models: usize,
    pub tests: usize,
    pub results: usize,
    pub unchanged: usize,
}

fn tally(outcome: Imported, inserted: &mut usize, unchanged: &mut usize) {
    match outcome {
        Imported::Inserted => *inserted += 1,
        Imported::Unchanged => *unchanged += 1,
    }
}

fn rejected(kind: &'static str, id: Uuid) -> impl FnOnce(ServiceError) -> SeedError {
    move |source| SeedError::Rejected { kind, id, source }
}

impl SeedData {
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Import catalog entries first so results can be reference-checked.
    #[instrument(skip_all, fields(models = self.models.len(), tests = self.tests.len(), results = self.results.len()))]
    pub async fn apply(self, stores: &Stores) -> Result<SeedSummary, SeedError> {
        let catalog = CatalogService::new(stores.catalog.clone());
        let results = ResultsService::new(stores.results.clone(), stores.catalog.clone());
        let mut summary = SeedSummary::default();

        for model in self.models {
            let id = model.id;
            let outcome = catalog
                .import_model(model)
                .await
                .map_err(rejected("model", id))?;
            tally(outcome, &mut summary.models, &mut summary.unchanged);
        }
        for test in self.tests {
            let id = test.id;
            let outcome = catalog
                .import_test(test)
                .await
                .map_err(rejected("test", id))?;
            tally(outcome, &mut summary.tests, &mut summary.unchanged);
        }
        for result in self.results {
            let id = result.id;
            let outcome = results
                .import(result)
                .await
                .map_err(rejected("result", id))?;
            tally(outcome, &mut summary.results, &mut summary.unchanged);
        }

        info!(
            models = summary.models,
            tests = summary.tests,
            results = summary.results,
            unchanged = summary.unchanged,
            "Seed data loaded"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use validation_state::{ProjectKey, ResultFilter};

    const SEED: &str = r#"{
        "models": [{
            "id": "4c62cb9a-d1c5-41ab-ab6d-29a5ed28fa4d",
            "name": "CA1_pyr_cACpyr_mpg141208_B_idA",
            "alias": "bianchi_2012",
            "author": null,
            "description": null,
            "instances": [{
                "id": "403d865e-417c-45fe-97cf-83a9613ae664",
                "version": "1.0",
                "source": null,
                "timestamp": "2019-01-01T00:00:00Z"
            }]
        }],
        "tests": [{
            "id": "100abccb-6d30-4c1e-a960-bc0489e0d82d",
            "name": "Hippocampus somatic features",
            "alias": "hippo_somafeat_CA1_pyr_cACpyr",
            "author": null,
            "description": null,
            "instances": [{
                "id": "1d22e1c0-5a74-49b4-b114-41d233d3250a",
                "version": "1.0",
                "repository": null,
                "path": null,
                "timestamp": "2019-01-01T00:00:00Z"
            }]
        }],
        "results": [{
            "id": "612160c9-2a76-44b3-aaf0-18c7fd40b942",
            "model_version_id": "403d865e-417c-45fe-97cf-83a9613ae664",
            "test_code_id": "1d22e1c0-5a74-49b4-b114-41d233d3250a",
            "timestamp": "2020-06-01T10:00:00.123456Z",
            "score": 0.5,
            "normalized_score": null,
            "passed": null,
            "results_storage": []
        }]
    }"#;

    fn seed() -> SeedData {
        serde_json::from_str(SEED).unwrap()
    }

    async fn listed(stores: &Stores) -> Vec<ValidationResult> {
        stores
            .results
            .list_results(&ResultFilter::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn seed_file_preserves_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let stores = Stores::in_memory();
        let summary = SeedData::load(file.path())
            .unwrap()
            .apply(&stores)
            .await
            .unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                models: 1,
                tests: 1,
                results: 1,
                unchanged: 0,
            }
        );

        let model = stores
            .catalog
            .get_model(&ProjectKey::parse("bianchi_2012"))
            .await
            .unwrap();
        assert_eq!(model.id.to_string(), "4c62cb9a-d1c5-41ab-ab6d-29a5ed28fa4d");

        let results = listed(&stores).await;
        assert_eq!(
            results[0].id.to_string(),
            "612160c9-2a76-44b3-aaf0-18c7fd40b942"
        );
    }

    #[tokio::test]
    async fn applying_twice_skips_stored_records() {
        let stores = Stores::in_memory();
        seed().apply(&stores).await.unwrap();
        let second = seed().apply(&stores).await.unwrap();

        assert_eq!(
            second,
            SeedSummary {
                unchanged: 3,
                ..SeedSummary::default()
            }
        );
        assert_eq!(listed(&stores).await.len(), 1);
    }

    #[tokio::test]
    async fn changed_record_under_same_id_conflicts() {
        let stores = Stores::in_memory();
        seed().apply(&stores).await.unwrap();

        let mut changed = seed();
        changed.results[0].score = 0.75;
        let err = changed.apply(&stores).await.unwrap_err();
        assert!(matches!(
            err,
            SeedError::Rejected {
                kind: "result",
                source: ServiceError::Conflict { .. },
                ..
            }
        ));
        assert_eq!(listed(&stores).await[0].score, 0.5);
    }

    #[tokio::test]
    async fn invalid_url_is_rejected() {
        let stores = Stores::in_memory();
        let mut data = seed();
        data.results[0].results_storage = vec!["not a url".to_string()];

        let err = data.apply(&stores).await.unwrap_err();
        assert!(matches!(
            err,
            SeedError::Rejected {
                kind: "result",
                source: ServiceError::Invalid(_),
                ..
            }
        ));
        assert!(listed(&stores).await.is_empty());
    }

    #[tokio::test]
    async fn dangling_reference_is_rejected() {
        let stores = Stores::in_memory();
        let mut data = seed();
        data.results[0].model_version_id = Uuid::new_v4();

        let err = data.apply(&stores).await.unwrap_err();
        assert!(matches!(
            err,
            SeedError::Rejected {
                source: ServiceError::DanglingReference {
                    field: "model_version_id",
                    ..
                },
                ..
            }
        ));
        assert!(listed(&stores).await.is_empty());
    }

    #[tokio::test]
    async fn uuid_shaped_alias_is_rejected() {
        let stores = Stores::in_memory();
        let mut data = seed();
        data.models[0].alias = Some(Uuid::new_v4().to_string());

        let err = data.apply(&stores).await.unwrap_err();
        assert!(matches!(
            err,
            SeedError::Rejected {
                kind: "model",
                source: ServiceError::Invalid(_),
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = SeedData::load(Path::new("/nonexistent/seed.json")).unwrap_err();
        assert!(matches!(err, SeedError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"models\": 3}").unwrap();
        let err = SeedData::load(file.path()).unwrap_err();
        assert!(matches!(err, SeedError::Parse { .. }));
    }
}
