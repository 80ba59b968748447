//! `/results` handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;
use validation_core::{NewValidationResult, ResultQuery, ValidationResult};

use crate::app::AppState;
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/results", get(list_results).post(create_result))
        .route("/results/", get(list_results).post(create_result))
        .route("/results/:result_id", get(get_result).delete(delete_result))
}

#[instrument(skip_all)]
async fn list_results(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiQuery(query): ApiQuery<ResultQuery>,
) -> Result<Json<Vec<ValidationResult>>, ApiError> {
    Ok(Json(state.results.list(&query).await?))
}

#[instrument(skip(state, _auth))]
async fn get_result(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiPath(result_id): ApiPath<Uuid>,
) -> Result<Json<ValidationResult>, ApiError> {
    Ok(Json(state.results.get(result_id).await?))
}

#[instrument(skip_all)]
async fn create_result(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiJson(payload): ApiJson<NewValidationResult>,
) -> Result<(StatusCode, Json<ValidationResult>), ApiError> {
    let created = state.results.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, _auth))]
async fn delete_result(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiPath(result_id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.results.delete(result_id).await?;
    Ok(Json(json!({ "id": removed.id })))
}
