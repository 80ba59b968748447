//! ResultsService behaviour over the in-memory stores.
//!
//! Covers filtered listing with alias/id resolution, referential checks on
//! create, and the delete lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, SubsecRound, Utc};
use uuid::Uuid;
use validation_core::{
    CatalogService, NewModelInstance, NewModelProject, NewTestInstance, NewValidationResult,
    NewValidationTest, ResultQuery, ResultsService, ServiceError,
};
use validation_state::storage_traits::{
    CatalogStore, ModelProject, ProjectKey, ResultFilter, ResultStore, StorageResult,
    ValidationResult, ValidationTest,
};
use validation_state::{MemoryCatalog, MemoryResultStore, StorageError};

struct Fixture {
    results: Arc<MemoryResultStore>,
    service: ResultsService,
    catalog: CatalogService,
}

fn fixture() -> Fixture {
    let results = Arc::new(MemoryResultStore::new());
    let catalog: Arc<dyn CatalogStore> = Arc::new(MemoryCatalog::new());
    Fixture {
        service: ResultsService::new(results.clone(), catalog.clone()),
        catalog: CatalogService::new(catalog),
        results,
    }
}

async fn create_model(catalog: &CatalogService, alias: &str, versions: usize) -> ModelProject {
    catalog
        .create_model(NewModelProject {
            name: format!("model {alias}"),
            alias: Some(alias.to_string()),
            author: None,
            description: None,
            instances: (0..versions)
                .map(|v| NewModelInstance {
                    version: format!("{v}.0"),
                    source: None,
                })
                .collect(),
        })
        .await
        .unwrap()
}

async fn create_test(catalog: &CatalogService, alias: &str, versions: usize) -> ValidationTest {
    catalog
        .create_test(NewValidationTest {
            name: format!("test {alias}"),
            alias: Some(alias.to_string()),
            author: None,
            description: None,
            instances: (0..versions)
                .map(|v| NewTestInstance {
                    version: format!("{v}.0"),
                    repository: Some("https://github.com/example/tests".to_string()),
                    path: None,
                })
                .collect(),
        })
        .await
        .unwrap()
}

fn payload(model_version_id: Uuid, test_code_id: Uuid) -> NewValidationResult {
    NewValidationResult {
        model_version_id,
        test_code_id,
        score: 0.42,
        normalized_score: Some(1.3),
        passed: Some(true),
        results_storage: vec!["https://example.org/results/output.json".to_string()],
    }
}

/// Insert results directly so timestamps are spread out and ordering is known.
async fn seed_result(
    store: &MemoryResultStore,
    model_version_id: Uuid,
    test_code_id: Uuid,
    minutes_ago: i64,
) -> ValidationResult {
    let result = ValidationResult {
        id: Uuid::new_v4(),
        model_version_id,
        test_code_id,
        timestamp: (Utc::now() - Duration::minutes(minutes_ago)).trunc_subsecs(6),
        score: minutes_ago as f64,
        normalized_score: None,
        passed: None,
        results_storage: vec![],
    };
    store.insert_result(result).await.unwrap()
}

#[tokio::test]
async fn create_then_get_returns_identical_record() {
    let fx = fixture();
    let model = create_model(&fx.catalog, "bianchi_2012", 2).await;
    let test = create_test(&fx.catalog, "somafeat", 1).await;

    let created = fx
        .service
        .create(payload(model.instances[0].id, test.instances[0].id))
        .await
        .unwrap();

    assert_eq!(created.model_version_id, model.instances[0].id);
    assert_eq!(created.timestamp, created.timestamp.trunc_subsecs(6));

    let fetched = fx.service.get(created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(
        serde_json::to_value(&fetched).unwrap(),
        serde_json::to_value(&created).unwrap()
    );
}

#[tokio::test]
async fn dangling_references_are_rejected_without_writes() {
    let fx = fixture();
    let model = create_model(&fx.catalog, "m", 1).await;
    let test = create_test(&fx.catalog, "t", 1).await;

    let bad_model = Uuid::new_v4();
    let err = fx
        .service
        .create(payload(bad_model, test.instances[0].id))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::DanglingReference { field: "model_version_id", id } if id == bad_model
    ));

    // A test instance id is not a model instance id.
    let err = fx
        .service
        .create(payload(test.instances[0].id, test.instances[0].id))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::DanglingReference {
            field: "model_version_id",
            ..
        }
    ));

    let err = fx
        .service
        .create(payload(model.instances[0].id, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::DanglingReference {
            field: "test_code_id",
            ..
        }
    ));

    let all = fx.results.list_results(&ResultFilter::default()).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn invalid_payload_is_rejected_before_reference_checks() {
    let fx = fixture();
    let mut bad = payload(Uuid::new_v4(), Uuid::new_v4());
    bad.results_storage.push("not a url".to_string());

    let err = fx.service.create(bad).await.unwrap_err();
    match err {
        ServiceError::Invalid(invalid) => {
            assert_eq!(invalid.errors.len(), 1);
            assert_eq!(
                serde_json::to_value(&invalid.errors[0].loc).unwrap(),
                serde_json::json!(["body", "results_storage", 1])
            );
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[tokio::test]
async fn listing_filters_by_model_and_test_keys() {
    let fx = fixture();
    let model = create_model(&fx.catalog, "bianchi_2012", 2).await;
    let other_model = create_model(&fx.catalog, "other_model", 1).await;
    let test = create_test(&fx.catalog, "hippo_somafeat_CA1_pyr_cACpyr", 2).await;

    let m0 = model.instances[0].id;
    let m1 = model.instances[1].id;
    let o0 = other_model.instances[0].id;
    let t0 = test.instances[0].id;
    let t1 = test.instances[1].id;

    for (i, (m, t)) in [(m0, t0), (m1, t1), (o0, t0), (m0, t1), (o0, t1), (m1, t0)]
        .into_iter()
        .enumerate()
    {
        seed_result(&fx.results, m, t, i as i64).await;
    }

    let by_alias = fx
        .service
        .list(&ResultQuery {
            model_alias: Some("bianchi_2012".to_string()),
            ..ResultQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_alias.len(), 4);
    assert!(by_alias
        .iter()
        .all(|r| model.instance_ids().contains(&r.model_version_id)));

    let by_id = fx
        .service
        .list(&ResultQuery {
            model_id: Some(model.id),
            ..ResultQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_id, by_alias);

    let by_version = fx
        .service
        .list(&ResultQuery {
            model_version_id: Some(m0),
            ..ResultQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_version.len(), 2);
    assert!(by_version.iter().all(|r| r.model_version_id == m0));

    let by_test_code = fx
        .service
        .list(&ResultQuery {
            test_code_id: Some(t1),
            size: 2,
            ..ResultQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_test_code.len(), 2);
    assert!(by_test_code.iter().all(|r| r.test_code_id == t1));

    let combined = fx
        .service
        .list(&ResultQuery {
            model_alias: Some("bianchi_2012".to_string()),
            test_alias: Some("hippo_somafeat_CA1_pyr_cACpyr".to_string()),
            test_code_id: Some(t0),
            ..ResultQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(combined.len(), 2);
    assert!(combined
        .iter()
        .all(|r| r.test_code_id == t0 && r.model_version_id != o0));
}

#[tokio::test]
async fn listing_pages_are_stable_and_disjoint() {
    let fx = fixture();
    let model = Uuid::new_v4();
    let test = Uuid::new_v4();
    for minutes in 0..7 {
        seed_result(&fx.results, model, test, minutes).await;
    }

    let everything = fx.service.list(&ResultQuery::default()).await.unwrap();
    assert_eq!(everything.len(), 7);
    assert!(everything
        .windows(2)
        .all(|w| w[0].timestamp >= w[1].timestamp));

    let mut paged = Vec::new();
    for from_index in (0..7).step_by(3) {
        let page = fx
            .service
            .list(&ResultQuery {
                size: 3,
                from_index,
                ..ResultQuery::default()
            })
            .await
            .unwrap();
        assert!(page.len() <= 3);
        paged.extend(page);
    }
    assert_eq!(paged, everything);
}

#[tokio::test]
async fn unknown_filter_project_is_not_found() {
    let fx = fixture();
    let err = fx
        .service
        .list(&ResultQuery {
            model_id: Some(Uuid::new_v4()),
            ..ResultQuery::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { kind: "model", .. }));
}

#[tokio::test]
async fn delete_is_permanent() {
    let fx = fixture();
    let model = create_model(&fx.catalog, "m", 1).await;
    let test = create_test(&fx.catalog, "t", 1).await;
    let created = fx
        .service
        .create(payload(model.instances[0].id, test.instances[0].id))
        .await
        .unwrap();

    let removed = fx.service.delete(created.id).await.unwrap();
    assert_eq!(removed.id, created.id);

    assert!(matches!(
        fx.service.get(created.id).await,
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        fx.service.delete(created.id).await,
        Err(ServiceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn deleting_a_model_keeps_its_results() {
    let fx = fixture();
    let model = create_model(&fx.catalog, "m", 1).await;
    let test = create_test(&fx.catalog, "t", 1).await;
    let created = fx
        .service
        .create(payload(model.instances[0].id, test.instances[0].id))
        .await
        .unwrap();

    fx.catalog.delete_model(model.id).await.unwrap();

    assert_eq!(fx.service.get(created.id).await.unwrap(), created);
}

// ---------------------------------------------------------------------------
// Storage failures surface as opaque errors
// ---------------------------------------------------------------------------

struct UnavailableCatalog;

#[async_trait]
impl CatalogStore for UnavailableCatalog {
    async fn insert_model(&self, _model: ModelProject) -> StorageResult<ModelProject> {
        Err(StorageError::Backend("unavailable".to_string()))
    }
    async fn get_model(&self, _key: &ProjectKey) -> StorageResult<ModelProject> {
        Err(StorageError::Backend("unavailable".to_string()))
    }
    async fn delete_model(&self, _id: Uuid) -> StorageResult<()> {
        Err(StorageError::Backend("unavailable".to_string()))
    }
    async fn model_instance_exists(&self, _instance_id: Uuid) -> StorageResult<bool> {
        Err(StorageError::Backend("unavailable".to_string()))
    }
    async fn insert_test(&self, _test: ValidationTest) -> StorageResult<ValidationTest> {
        Err(StorageError::Backend("unavailable".to_string()))
    }
    async fn get_test(&self, _key: &ProjectKey) -> StorageResult<ValidationTest> {
        Err(StorageError::Backend("unavailable".to_string()))
    }
    async fn delete_test(&self, _id: Uuid) -> StorageResult<()> {
        Err(StorageError::Backend("unavailable".to_string()))
    }
    async fn test_instance_exists(&self, _instance_id: Uuid) -> StorageResult<bool> {
        Err(StorageError::Backend("unavailable".to_string()))
    }
}

#[tokio::test]
async fn backend_failure_is_a_storage_error() {
    let service = ResultsService::new(
        Arc::new(MemoryResultStore::new()),
        Arc::new(UnavailableCatalog),
    );

    let err = service
        .create(payload(Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Storage(_)));
}
