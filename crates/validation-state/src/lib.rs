//! Validation-State: persistence for the validation results service
//!
//! This crate owns every byte the service stores: validation results and
//! the model/test catalog they reference. It handles all I/O with the
//! backing store and exposes backend-agnostic async traits.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: atomic create/delete per identifier and deterministic listing order.
//!
//! ## Key Components
//!
//! - `ResultStore` / `CatalogStore`: storage traits
//! - `MemoryResultStore` / `MemoryCatalog`: in-process backends
//! - `SurrealHandle`: SurrealDB connection (mem, surrealkv, ws)
//! - `SurrealResultStore` / `SurrealCatalog`: SurrealDB backends

mod error;
mod handle;
pub mod memory;
pub mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal_catalog;
pub mod surreal_results;

pub use error::{StateError, StorageError};
pub use handle::{SurrealConfig, SurrealHandle};
pub use memory::{MemoryCatalog, MemoryResultStore};
pub use storage_traits::{
    CatalogStore, InstanceSet, ModelInstance, ModelProject, ProjectKey, ResultFilter, ResultStore,
    StorageResult, TestInstance, ValidationResult, ValidationTest, DEFAULT_PAGE_SIZE,
};
pub use surreal_catalog::SurrealCatalog;
pub use surreal_results::SurrealResultStore;

/// Result type for connection and schema operations
pub type Result<T> = std::result::Result<T, StateError>;
