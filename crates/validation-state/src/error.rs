//! Error types for validation-state

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while connecting to a backend or preparing its schema
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("Database query failed: {0}")]
    Query(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),
}

impl From<surrealdb::Error> for StateError {
    fn from(err: surrealdb::Error) -> Self {
        StateError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serialization(err.to_string())
    }
}

/// Errors returned by `ResultStore` and `CatalogStore` operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// No validation result with this id
    #[error("validation result not found: {id}")]
    ResultNotFound { id: Uuid },

    /// No model with this id or alias
    #[error("model not found: {key}")]
    ModelNotFound { key: String },

    /// No test with this id or alias
    #[error("test not found: {key}")]
    TestNotFound { key: String },

    /// A record with the same unique key already exists
    #[error("{kind} already exists: {key}")]
    Conflict { kind: &'static str, key: String },

    /// A stored row could not be mapped back into a record
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The backend failed to execute the operation
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<StateError> for StorageError {
    fn from(err: StateError) -> Self {
        StorageError::Backend(err.to_string())
    }
}
