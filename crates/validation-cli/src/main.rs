//! `validation` - command-line client for the validation results service.
//!
//! ## Commands
//!
//! - `results list`: list results, newest first, with optional filters
//! - `results get`: fetch one result
//! - `results create`: submit a new result
//! - `results delete`: delete a result
//! - `models get` / `tests get`: look up catalog entries by id or alias
//! - `health`: check the service is reachable

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;
use validation_cli::ApiClient;
use validation_core::{telemetry, NewValidationResult, ResultQuery};

#[derive(Parser)]
#[command(name = "validation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the model validation results service", long_about = None)]
struct Cli {
    /// Base url of the service
    #[arg(long, env = "VALIDATION_API_URL", default_value = "http://127.0.0.1:8000")]
    api_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "VALIDATION_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with validation results
    Results {
        #[command(subcommand)]
        action: ResultsAction,
    },

    /// Look up models
    Models {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Look up validation tests
    Tests {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Check that the service is up
    Health,
}

#[derive(Subcommand)]
enum ResultsAction {
    /// List results, newest first
    List(ListArgs),

    /// Show a single result
    Get {
        /// Result id
        id: Uuid,
    },

    /// Submit a result
    Create(CreateArgs),

    /// Delete a result
    Delete {
        /// Result id
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Show an entry by id or alias
    Get {
        /// Id or alias
        key: String,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Page size
    #[arg(long, default_value_t = 100)]
    size: usize,

    /// Number of results to skip
    #[arg(long, default_value_t = 0)]
    from_index: usize,

    #[arg(long)]
    model_id: Option<Uuid>,

    #[arg(long)]
    model_alias: Option<String>,

    #[arg(long)]
    model_version_id: Option<Uuid>,

    #[arg(long)]
    test_id: Option<Uuid>,

    #[arg(long)]
    test_alias: Option<String>,

    #[arg(long)]
    test_code_id: Option<Uuid>,
}

impl From<ListArgs> for ResultQuery {
    fn from(args: ListArgs) -> Self {
        ResultQuery {
            size: args.size,
            from_index: args.from_index,
            model_id: args.model_id,
            model_alias: args.model_alias,
            model_version_id: args.model_version_id,
            test_id: args.test_id,
            test_alias: args.test_alias,
            test_code_id: args.test_code_id,
        }
    }
}

#[derive(Args)]
struct CreateArgs {
    /// Read the whole payload from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["model_version_id", "test_code_id", "score"])]
    file: Option<PathBuf>,

    /// Model instance the result was produced by
    #[arg(long, required_unless_present = "file")]
    model_version_id: Option<Uuid>,

    /// Test instance the result was produced by
    #[arg(long, required_unless_present = "file")]
    test_code_id: Option<Uuid>,

    #[arg(long, required_unless_present = "file", allow_negative_numbers = true)]
    score: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    normalized_score: Option<f64>,

    #[arg(long)]
    passed: Option<bool>,

    /// Url of a stored artifact (repeatable)
    #[arg(long = "storage")]
    results_storage: Vec<String>,
}

impl CreateArgs {
    fn into_payload(self) -> Result<NewValidationResult> {
        if let Some(path) = self.file {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("Invalid result payload in {}", path.display()));
        }

        Ok(NewValidationResult {
            model_version_id: self
                .model_version_id
                .context("--model-version-id is required")?,
            test_code_id: self.test_code_id.context("--test-code-id is required")?,
            score: self.score.context("--score is required")?,
            normalized_score: self.normalized_score,
            passed: self.passed,
            results_storage: self.results_storage,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init_tracing(cli.json, telemetry::level_for(cli.verbose));

    let client = ApiClient::new(&cli.api_url, cli.token)
        .with_context(|| format!("Failed to set up client for {}", cli.api_url))?;

    match cli.command {
        Commands::Results { action } => match action {
            ResultsAction::List(args) => print_json(&client.list_results(&args.into()).await?),
            ResultsAction::Get { id } => print_json(&client.get_result(id).await?),
            ResultsAction::Create(args) => {
                let payload = args.into_payload()?;
                print_json(&client.create_result(&payload).await?)
            }
            ResultsAction::Delete { id } => print_json(&client.delete_result(id).await?),
        },
        Commands::Models {
            action: CatalogAction::Get { key },
        } => print_json(&client.get_model(&key).await?),
        Commands::Tests {
            action: CatalogAction::Get { key },
        } => print_json(&client.get_test(&key).await?),
        Commands::Health => print_json(&client.health().await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
