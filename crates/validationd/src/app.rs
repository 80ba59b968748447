//! Router assembly and shared handler state.

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::FromRef;
use axum::routing::get;
use axum::{BoxError, Router};
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use validation_core::{CatalogService, ResultsService};

use crate::auth::AuthTokens;
use crate::error::ApiError;
use crate::routes;
use crate::store::Stores;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub results: ResultsService,
    pub catalog: CatalogService,
    pub tokens: AuthTokens,
}

impl AppState {
    pub fn new(stores: &Stores, tokens: AuthTokens) -> Self {
        AppState {
            results: ResultsService::new(stores.results.clone(), stores.catalog.clone()),
            catalog: CatalogService::new(stores.catalog.clone()),
            tokens,
        }
    }
}

/// Build the full application router.
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .merge(routes::results::router())
        .merge(routes::catalog::router())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".to_string())
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}
