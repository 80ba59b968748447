//! Validation Core Library
//!
//! Domain logic for the validation results service: payload validation,
//! filter resolution, referential checks and the services the HTTP layer
//! calls into.

pub mod catalog_service;
pub mod domain;
pub mod obs;
pub mod results_service;
pub mod telemetry;

pub use catalog_service::CatalogService;
pub use domain::{
    FieldError, LocSegment, NewModelInstance, NewModelProject, NewTestInstance,
    NewValidationResult, NewValidationTest, Result, ResultQuery, ServiceError, ValidationError,
    MAX_PAGE_SIZE,
};
pub use obs::{
    emit_auth_rejected, emit_reference_rejected, emit_result_created, emit_result_deleted,
    emit_results_listed,
};
pub use results_service::{creation_timestamp, Imported, ResultsService};

pub use validation_state::{
    CatalogStore, ModelInstance, ModelProject, ResultStore, TestInstance, ValidationResult,
    ValidationTest,
};
