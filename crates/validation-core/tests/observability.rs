//! Observability tests for validation result lifecycle tracing.
//!
//! These tests verify that structured tracing events are emitted for the
//! key lifecycle events: create, delete, listing and rejections.

use std::sync::Arc;

use tracing_test::traced_test;
use uuid::Uuid;
use validation_core::{
    emit_auth_rejected, emit_reference_rejected, emit_result_created, emit_result_deleted,
    emit_results_listed, CatalogService, NewModelInstance, NewModelProject, NewTestInstance,
    NewValidationResult, NewValidationTest, ResultQuery, ResultsService,
};
use validation_state::{CatalogStore, MemoryCatalog, MemoryResultStore};

#[traced_test]
#[test]
fn test_emit_result_created_logs_ids() {
    let id = Uuid::new_v4();
    emit_result_created(id, Uuid::new_v4(), Uuid::new_v4());

    assert!(logs_contain("result.created"));
    assert!(logs_contain(&id.to_string()));
}

#[traced_test]
#[test]
fn test_emit_result_deleted_logs_id() {
    let id = Uuid::new_v4();
    emit_result_deleted(id);

    assert!(logs_contain("result.deleted"));
    assert!(logs_contain(&id.to_string()));
}

#[traced_test]
#[test]
fn test_emit_results_listed_logs_paging() {
    emit_results_listed(5, 10, 5, true);

    assert!(logs_contain("results.listed"));
    assert!(logs_contain("from_index=10"));
}

#[traced_test]
#[test]
fn test_rejections_log_at_warn() {
    emit_reference_rejected("test_code_id", Uuid::new_v4());
    emit_auth_rejected("/results/", "missing credentials");

    assert!(logs_contain("WARN"));
    assert!(logs_contain("result.reference_rejected"));
    assert!(logs_contain("auth.rejected"));
}

#[traced_test]
#[tokio::test]
async fn test_service_create_and_list_emit_events() {
    let catalog: Arc<dyn CatalogStore> = Arc::new(MemoryCatalog::new());
    let service = ResultsService::new(Arc::new(MemoryResultStore::new()), catalog.clone());
    let catalog = CatalogService::new(catalog);

    let model = catalog
        .create_model(NewModelProject {
            name: "model".to_string(),
            alias: None,
            author: None,
            description: None,
            instances: vec![NewModelInstance {
                version: "1.0".to_string(),
                source: None,
            }],
        })
        .await
        .unwrap();
    let test = catalog
        .create_test(NewValidationTest {
            name: "test".to_string(),
            alias: None,
            author: None,
            description: None,
            instances: vec![NewTestInstance {
                version: "1.0".to_string(),
                repository: None,
                path: None,
            }],
        })
        .await
        .unwrap();

    let created = service
        .create(NewValidationResult {
            model_version_id: model.instances[0].id,
            test_code_id: test.instances[0].id,
            score: 1.0,
            normalized_score: None,
            passed: None,
            results_storage: vec![],
        })
        .await
        .unwrap();
    service.list(&ResultQuery::default()).await.unwrap();

    assert!(logs_contain("model created"));
    assert!(logs_contain("result.created"));
    assert!(logs_contain(&created.id.to_string()));
    assert!(logs_contain("results.listed"));
}
