//! Field-level checks shared by payload and query validation.
//!
//! Each check returns `Some(FieldError)` describing the problem, so callers
//! can collect every failure before rejecting the input.

use url::Url;
use uuid::Uuid;

use super::error::{FieldError, LocSegment};

/// Largest page a listing request may ask for.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Reject empty, whitespace-containing, slash-containing or UUID-shaped aliases.
///
/// An alias that parsed as a UUID would make `/models/{id_or_alias}`
/// ambiguous.
pub fn check_alias(loc: Vec<LocSegment>, alias: &str) -> Option<FieldError> {
    if alias.is_empty() {
        return Some(FieldError::new(
            loc,
            "alias must not be empty",
            "value_error.alias.empty",
        ));
    }
    if alias.chars().any(|c| c.is_whitespace() || c == '/') {
        return Some(FieldError::new(
            loc,
            "alias must not contain whitespace or '/'",
            "value_error.alias.chars",
        ));
    }
    if Uuid::parse_str(alias).is_ok() {
        return Some(FieldError::new(
            loc,
            "alias must not be a UUID",
            "value_error.alias.uuid",
        ));
    }
    None
}

/// Require an absolute URL with a host.
pub fn check_url(loc: Vec<LocSegment>, raw: &str) -> Option<FieldError> {
    match Url::parse(raw) {
        Ok(url) if url.host().is_some() => None,
        Ok(_) => Some(FieldError::new(loc, "URL host invalid", "value_error.url.host")),
        Err(e) => Some(FieldError::new(
            loc,
            format!("invalid URL: {e}"),
            "value_error.url",
        )),
    }
}

pub fn check_finite(loc: Vec<LocSegment>, value: f64) -> Option<FieldError> {
    if value.is_finite() {
        None
    } else {
        Some(FieldError::new(
            loc,
            "value is not a finite number",
            "value_error.float",
        ))
    }
}

pub fn check_not_blank(loc: Vec<LocSegment>, value: &str) -> Option<FieldError> {
    if value.trim().is_empty() {
        Some(FieldError::new(
            loc,
            "field must not be blank",
            "value_error.any_str.min_length",
        ))
    } else {
        None
    }
}

pub fn check_page_size(size: usize) -> Option<FieldError> {
    if size > MAX_PAGE_SIZE {
        Some(FieldError::new(
            vec!["query".into(), "size".into()],
            format!("ensure this value is less than or equal to {MAX_PAGE_SIZE}"),
            "value_error.number.not_le",
        ))
    } else {
        None
    }
}
