//! Domain-level error taxonomy for the validation service.

use serde::Serialize;
use uuid::Uuid;
use validation_state::StorageError;

/// One step of the path to an offending input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocSegment {
    Field(String),
    Index(usize),
}

impl From<&str> for LocSegment {
    fn from(field: &str) -> Self {
        LocSegment::Field(field.to_string())
    }
}

impl From<usize> for LocSegment {
    fn from(index: usize) -> Self {
        LocSegment::Index(index)
    }
}

/// A single rejected input value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<LocSegment>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: Vec<LocSegment>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

/// Errors produced by payload and query validation.
///
/// Carries every problem found, not just the first.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid input: {}", summary(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} at {:?}", e.msg, e.loc))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// `Ok(())` when nothing was collected.
    pub fn check(errors: Vec<FieldError>) -> std::result::Result<(), ValidationError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }
}

/// Validation service errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{field} {id} does not exist")]
    DanglingReference { field: &'static str, id: Uuid },

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("{kind} already exists: {key}")]
    Conflict { kind: &'static str, key: String },

    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ResultNotFound { id } => ServiceError::NotFound {
                kind: "validation result",
                key: id.to_string(),
            },
            StorageError::ModelNotFound { key } => ServiceError::NotFound { kind: "model", key },
            StorageError::TestNotFound { key } => ServiceError::NotFound { kind: "test", key },
            StorageError::Conflict { kind, key } => ServiceError::Conflict { kind, key },
            other => ServiceError::Storage(other),
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_maps_to_kind() {
        let id = Uuid::new_v4();
        let err = ServiceError::from(StorageError::ResultNotFound { id });
        assert_eq!(err.to_string(), format!("validation result not found: {id}"));

        let err = ServiceError::from(StorageError::ModelNotFound {
            key: "bianchi_2012".to_string(),
        });
        assert!(matches!(err, ServiceError::NotFound { kind: "model", .. }));
    }

    #[test]
    fn backend_failure_stays_opaque() {
        let err = ServiceError::from(StorageError::Backend("socket closed".to_string()));
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[test]
    fn field_error_serializes_like_detail_entry() {
        let error = FieldError::new(
            vec!["body".into(), "results_storage".into(), 1usize.into()],
            "invalid or missing URL scheme",
            "value_error.url.scheme",
        );
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "loc": ["body", "results_storage", 1],
                "msg": "invalid or missing URL scheme",
                "type": "value_error.url.scheme",
            })
        );
    }

    #[test]
    fn empty_collection_passes_check() {
        assert!(ValidationError::check(vec![]).is_ok());
        let err = ValidationError::check(vec![FieldError::new(
            vec!["query".into(), "size".into()],
            "too large",
            "value_error",
        )])
        .unwrap_err();
        assert_eq!(err.errors.len(), 1);
    }
}
