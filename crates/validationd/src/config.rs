//! Daemon configuration.
//!
//! Every option can come from a flag or an environment variable (a `.env`
//! file is loaded before parsing). [`Cli`] is the raw input; [`ServiceConfig`]
//! is the validated form the server is built from.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use validation_state::SurrealConfig;

use crate::auth::AuthTokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// In-process maps, lost on exit
    Memory,
    /// SurrealDB through `--surreal-url`
    Surreal,
}

#[derive(Debug, Parser)]
#[command(name = "validationd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validation results service", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "VALIDATIOND_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Accepted bearer tokens (comma separated)
    #[arg(
        long = "auth-token",
        env = "VALIDATIOND_AUTH_TOKENS",
        value_delimiter = ',',
        required = true
    )]
    pub auth_tokens: Vec<String>,

    /// Storage backend
    #[arg(long, env = "VALIDATIOND_STORE", value_enum, default_value = "memory")]
    pub store: StoreKind,

    /// SurrealDB endpoint (mem://, surrealkv://path, ws://host:port)
    #[arg(long, env = "SURREALDB_URL", default_value = "mem://")]
    pub surreal_url: String,

    #[arg(long, env = "SURREALDB_NAMESPACE", default_value = "validation")]
    pub surreal_namespace: String,

    #[arg(long, env = "SURREALDB_DATABASE", default_value = "main")]
    pub surreal_database: String,

    #[arg(long, env = "SURREALDB_USERNAME")]
    pub surreal_username: Option<String>,

    #[arg(long, env = "SURREALDB_PASSWORD", hide_env_values = true)]
    pub surreal_password: Option<String>,

    /// JSON file with models, tests and results to load at startup
    #[arg(long, env = "VALIDATIOND_SEED")]
    pub seed: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "VALIDATIOND_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("at least one non-empty auth token is required")]
    NoAuthTokens,

    #[error("SURREALDB_USERNAME and SURREALDB_PASSWORD must be set together")]
    PartialCredentials,

    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Memory,
    Surreal(SurrealConfig),
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub tokens: AuthTokens,
    pub store: StoreConfig,
    pub seed: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl TryFrom<Cli> for ServiceConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let tokens = AuthTokens::new(cli.auth_tokens.iter().map(|t| t.trim()));
        if tokens.is_empty() {
            return Err(ConfigError::NoAuthTokens);
        }
        if cli.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let store = match cli.store {
            StoreKind::Memory => StoreConfig::Memory,
            StoreKind::Surreal => {
                let mut surreal = SurrealConfig::new(cli.surreal_url)
                    .with_namespace(cli.surreal_namespace)
                    .with_database(cli.surreal_database);
                match (cli.surreal_username, cli.surreal_password) {
                    (Some(user), Some(pass)) => surreal = surreal.with_root(user, pass),
                    (None, None) => {}
                    _ => return Err(ConfigError::PartialCredentials),
                }
                StoreConfig::Surreal(surreal)
            }
        };

        Ok(ServiceConfig {
            bind: cli.bind,
            tokens,
            store,
            seed: cli.seed,
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
        })
    }
}
