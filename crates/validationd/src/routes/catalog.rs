//! `/models` and `/tests` handlers.
//!
//! Only what result creation and cleanup need: create, fetch by id or
//! alias, delete by id.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;
use validation_core::{ModelProject, NewModelProject, NewValidationTest, ValidationTest};

use crate::app::AppState;
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/models", post(create_model))
        .route("/models/", post(create_model))
        .route("/models/:model_key", get(get_model).delete(delete_model))
        .route("/tests", post(create_test))
        .route("/tests/", post(create_test))
        .route("/tests/:test_key", get(get_test).delete(delete_test))
}

#[instrument(skip_all)]
async fn create_model(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiJson(payload): ApiJson<NewModelProject>,
) -> Result<(StatusCode, Json<ModelProject>), ApiError> {
    let created = state.catalog.create_model(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, _auth))]
async fn get_model(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiPath(model_key): ApiPath<String>,
) -> Result<Json<ModelProject>, ApiError> {
    Ok(Json(state.catalog.get_model(&model_key).await?))
}

#[instrument(skip(state, _auth))]
async fn delete_model(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiPath(model_id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.catalog.delete_model(model_id).await?;
    Ok(Json(json!({ "id": model_id })))
}

#[instrument(skip_all)]
async fn create_test(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiJson(payload): ApiJson<NewValidationTest>,
) -> Result<(StatusCode, Json<ValidationTest>), ApiError> {
    let created = state.catalog.create_test(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, _auth))]
async fn get_test(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiPath(test_key): ApiPath<String>,
) -> Result<Json<ValidationTest>, ApiError> {
    Ok(Json(state.catalog.get_test(&test_key).await?))
}

#[instrument(skip(state, _auth))]
async fn delete_test(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiPath(test_id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.catalog.delete_test(test_id).await?;
    Ok(Json(json!({ "id": test_id })))
}
