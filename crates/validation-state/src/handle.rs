//! SurrealDB Handle - Connection Setup
//!
//! Supports in-memory (`mem://`), embedded on-disk (`surrealkv://path`) and
//! remote (`ws://`, `wss://`) endpoints through the `Any` engine.

use crate::error::StateError;
use crate::migrations;
use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::{info, instrument};

const DEFAULT_NAMESPACE: &str = "validation";
const DEFAULT_DATABASE: &str = "main";

/// Connection settings for SurrealDB
#[derive(Debug, Clone, PartialEq)]
pub struct SurrealConfig {
    /// Endpoint URL (e.g. "mem://", "surrealkv://data/db", "wss://xxx.surrealdb.cloud")
    pub endpoint: String,
    /// Namespace (default: "validation")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Root credentials, required by remote servers only
    pub credentials: Option<(String, String)>,
}

impl Default for SurrealConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SurrealConfig {
    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self::new("mem://")
    }

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            credentials: None,
        }
    }

    /// Set custom namespace
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set custom database
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Sign in as a root user after connecting
    pub fn with_root(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }
}

/// SurrealDB connection handle shared by the SurrealDB-backed stores
#[derive(Clone)]
pub struct SurrealHandle {
    db: Surreal<Any>,
}

impl SurrealHandle {
    /// Connect to SurrealDB in-memory and set up schema
    #[instrument(skip_all)]
    pub async fn setup_db() -> Result<Self> {
        Self::connect(&SurrealConfig::in_memory()).await
    }

    /// Connect, authenticate when credentials are configured, select
    /// namespace/database and initialise the schema.
    #[instrument(skip(config), fields(endpoint = %config.endpoint, namespace = %config.namespace, database = %config.database))]
    pub async fn connect(config: &SurrealConfig) -> Result<Self> {
        info!("Connecting to SurrealDB");

        let db = surrealdb::engine::any::connect(config.endpoint.as_str())
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
            })?;

        if let Some((username, password)) = &config.credentials {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .map_err(|e| StateError::Connection(format!("Root authentication failed: {}", e)))?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to select namespace/database: {}", e))
            })?;

        migrations::init_schema(&db).await?;

        info!("SurrealDB connected and schema initialized");
        Ok(SurrealHandle { db })
    }

    /// Underlying client, cloned cheaply by the stores
    pub fn db(&self) -> &Surreal<Any> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_surreal_connection_and_schema_creation() {
        let handle = SurrealHandle::setup_db().await;
        assert!(handle.is_ok(), "Failed to connect: {:?}", handle.err());
    }

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let handle = SurrealHandle::setup_db().await.unwrap();
        migrations::init_schema(handle.db()).await.unwrap();
    }

    #[test]
    fn test_config_builders() {
        let config = SurrealConfig::new("ws://localhost:8000")
            .with_namespace("ns")
            .with_database("db")
            .with_root("root", "secret");

        assert_eq!(config.endpoint, "ws://localhost:8000");
        assert_eq!(config.namespace, "ns");
        assert_eq!(config.database, "db");
        assert_eq!(
            config.credentials,
            Some(("root".to_string(), "secret".to_string()))
        );
        assert_eq!(SurrealConfig::default().endpoint, "mem://");
    }
}
