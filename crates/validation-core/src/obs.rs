//! Structured observability hooks for validation result lifecycle events.
//!
//! Emission functions for key events: result created/deleted, listing served,
//! reference and auth rejections.
//!
//! Events are emitted at `info!` level (filter with `RUST_LOG`).
//! For JSON output, start the daemon with `--json`.

use tracing::{info, warn};
use uuid::Uuid;

/// Emit event: a validation result was persisted.
///
/// # Example
///
/// ```ignore
/// emit_result_created(id, model_version_id, test_code_id);
/// // logs: event=result.created result_id=... model_version_id=... test_code_id=...
/// ```
pub fn emit_result_created(result_id: Uuid, model_version_id: Uuid, test_code_id: Uuid) {
    info!(
        event = "result.created",
        result_id = %result_id,
        model_version_id = %model_version_id,
        test_code_id = %test_code_id,
    );
}

/// Emit event: a validation result was permanently removed.
pub fn emit_result_deleted(result_id: Uuid) {
    info!(event = "result.deleted", result_id = %result_id);
}

/// Emit event: one page of results was served.
pub fn emit_results_listed(returned: usize, from_index: usize, size: usize, filtered: bool) {
    info!(
        event = "results.listed",
        returned = returned,
        from_index = from_index,
        size = size,
        filtered = filtered,
    );
}

/// Emit event: a create referenced an instance that does not exist (warning level).
pub fn emit_reference_rejected(field: &str, instance_id: Uuid) {
    warn!(event = "result.reference_rejected", field = %field, instance_id = %instance_id);
}

/// Emit event: a request was turned away for missing or unknown credentials.
pub fn emit_auth_rejected(path: &str, reason: &str) {
    warn!(event = "auth.rejected", path = %path, reason = %reason);
}
