//! validationd: HTTP service for validation results.
//!
//! ## Layer 2 - Service
//!
//! - `app`: router, shared state, timeout and access-log layers
//! - `auth`: bearer-token check run before any parameter parsing
//! - `routes`: `/results`, `/models`, `/tests`, `/health`
//! - `error`: `ApiError` and its `{"detail": ...}` rendering
//! - `config`: flags and environment, validated into `ServiceConfig`
//! - `seed`: JSON fixture loading

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod seed;
pub mod store;

pub use app::{create_app, AppState};
pub use auth::AuthTokens;
pub use config::{Cli, ServiceConfig, StoreConfig};
pub use error::ApiError;
pub use seed::SeedData;
pub use store::Stores;
