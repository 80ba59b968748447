//! HTTP error mapping.
//!
//! Every failure is rendered as `{"detail": ...}` where `detail` is a
//! message string, or a list of field errors for 422 responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use serde_path_to_error::Segment;
use tracing::error;
use validation_core::{FieldError, LocSegment, ServiceError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("request validation failed")]
    Invalid(Vec<FieldError>),

    #[error("{0}")]
    BadReference(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Request timed out")]
    Timeout,

    /// Cause is logged, never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotAuthenticated => StatusCode::FORBIDDEN,
            ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadReference(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> serde_json::Value {
        match self {
            ApiError::Invalid(errors) => json!(errors),
            ApiError::Internal(_) => json!("Internal server error"),
            other => json!(other.to_string()),
        }
    }

    fn rejection(location: &str, msg: String, kind: &str) -> Self {
        ApiError::Invalid(vec![FieldError::new(vec![location.into()], msg, kind)])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            error!(error = %cause, "request failed");
        }
        let status = self.status_code();
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(invalid) => ApiError::Invalid(invalid.errors),
            err @ ServiceError::DanglingReference { .. } => ApiError::BadReference(err.to_string()),
            err @ ServiceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            err @ ServiceError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            ServiceError::Storage(cause) => ApiError::Internal(cause.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match &rejection {
            JsonRejection::JsonDataError(err) => match deserialize_error(err) {
                Some(cause) => ApiError::Invalid(vec![data_error_field(cause)]),
                None => ApiError::rejection("body", rejection.body_text(), "type_error"),
            },
            JsonRejection::JsonSyntaxError(_) => {
                ApiError::rejection("body", rejection.body_text(), "value_error.jsondecode")
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::rejection("body", rejection.body_text(), "value_error.content_type")
            }
            _ => ApiError::rejection("body", rejection.body_text(), "value_error"),
        }
    }
}

type PathError = serde_path_to_error::Error<serde_json::Error>;

/// The path-tracking serde error axum wraps inside a data rejection.
fn deserialize_error<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a PathError> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(found) = cause.downcast_ref::<PathError>() {
            return Some(found);
        }
        source = cause.source();
    }
    None
}

/// `["body", <path to the offending value>]`. Missing fields are reported
/// by serde on the enclosing object, so the field name is appended from
/// the message.
fn data_error_field(cause: &PathError) -> FieldError {
    let mut loc: Vec<LocSegment> = vec!["body".into()];
    for segment in cause.path().iter() {
        match segment {
            Segment::Seq { index } => loc.push((*index).into()),
            Segment::Map { key } => loc.push(key.as_str().into()),
            Segment::Enum { variant } => loc.push(variant.as_str().into()),
            _ => {}
        }
    }

    let msg = cause.inner().to_string();
    let missing = msg
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next());
    match missing {
        Some(field) => {
            loc.push(field.into());
            FieldError::new(loc, "field required", "value_error.missing")
        }
        None => FieldError::new(loc, msg, "type_error"),
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::rejection("query", rejection.body_text(), "type_error")
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::rejection("path", rejection.body_text(), "type_error")
    }
}
