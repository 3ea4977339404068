mod commands;
mod logging;
mod settings;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use orderdesk_core::WriteExecutor;
use orderdesk_rest::RestStore;

use commands::config::ConfigCommand;
use commands::orders::OrdersCommand;
use commands::{CommandError, Context};
use settings::{Overrides, Settings};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Order tracking on a remote document database.
#[derive(Parser)]
#[command(
    name = "orderdesk",
    version,
    about = "Order tracking on a remote document database"
)]
struct Cli {
    /// Settings file (default: ./orderdesk.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// API endpoint, overriding settings and environment
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Project id, overriding settings and environment
    #[arg(long, global = true)]
    project_id: Option<String>,

    /// Database id, overriding settings and environment
    #[arg(long, global = true)]
    database_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommand,
    },
    /// Work with the system configuration lists
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let output = cli.output;

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to create tokio runtime: {e}"), output);
            process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(run(cli)) {
        report_error(&e.to_string(), output);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let overrides = Overrides {
        endpoint: cli.endpoint,
        project_id: cli.project_id,
        database_id: cli.database_id,
    };
    let settings = Settings::load(cli.config.as_deref(), &overrides)?;
    tracing::debug!(
        endpoint = %settings.rest.endpoint,
        project = %settings.rest.project_id,
        database = %settings.rest.database_id,
        "settings loaded"
    );

    let ctx = Context {
        store: Arc::new(RestStore::new(settings.rest)),
        collections: settings.collections,
        executor: WriteExecutor::default().with_max_attempts(settings.max_attempts),
        output: cli.output,
    };

    match cli.command {
        Commands::Orders { command } => commands::orders::run(&ctx, command).await,
        Commands::Config { command } => commands::config::run(&ctx, command).await,
    }
}

fn report_error(msg: &str, output: OutputFormat) {
    match output {
        OutputFormat::Text => eprintln!("error: {msg}"),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
