//! Domain layer for the validation service.
//!
//! - `payload`: create payloads and their value-level checks
//! - `query`: listing parameters and alias/id resolution
//! - `validation`: shared field checks
//! - `error`: `ServiceError` / `ValidationError`

pub mod error;
pub mod payload;
pub mod query;
pub mod validation;

pub use error::{FieldError, LocSegment, Result, ServiceError, ValidationError};
pub use payload::{
    NewModelInstance, NewModelProject, NewTestInstance, NewValidationResult, NewValidationTest,
};
pub use query::ResultQuery;
pub use validation::MAX_PAGE_SIZE;
