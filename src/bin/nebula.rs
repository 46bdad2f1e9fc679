#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use nebula::server::{create_router, Dispatcher, IpcContext};
use nebula::{NebulaConfig, OutputFormat};
use tracing::Level;

mod commands;

use commands::connections::ConnectionsArgs;
use commands::query::QueryArgs;
use commands::settings::SettingsArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.nebula/nebula.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List, save and delete registered connections
    Connections(ConnectionsArgs),

    /// Show or replace application settings
    Settings(SettingsArgs),

    /// Run a SQL statement against a registered connection
    Query(QueryArgs),

    /// Ask the configured file picker for a database file
    PickFile,

    /// Serve line-delimited JSON requests on stdin/stdout
    Serve,

    /// Show configuration paths
    Config,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug {
        // stdout carries command output and the serve protocol
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match NebulaConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let context = IpcContext::from_config(config.clone());
    if let Err(e) = context.init() {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
    let dispatcher = Arc::new(Dispatcher::new(create_router(), context));

    let format = cli.format;
    let result = match cli.command {
        Commands::Connections(args) => commands::connections::run(&dispatcher, args, format).await,
        Commands::Settings(args) => commands::settings::run(&dispatcher, args, format).await,
        Commands::Query(args) => commands::query::run(&dispatcher, args, format).await,
        Commands::PickFile => commands::pick_file::run(&dispatcher, format).await,
        Commands::Serve => commands::serve::run(dispatcher).await,
        Commands::Config => commands::config::run(&config, format),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
