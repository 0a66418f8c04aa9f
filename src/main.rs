//! promql-explain CLI
//!
//! Command-line interface for promql-explain:
//! - Format, validate and explain queries
//! - List example queries
//! - Run the HTTP API
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

use promql_explain::api::{serve, AppState};
use promql_explain::config::{generate_default_config, Config};
use promql_explain::ExplainService;

#[derive(Parser)]
#[command(name = "promql-explain")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Format, validate and explain PromQL queries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print indented JSON
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pretty-print a query
    Format {
        /// Query text, or "-" to read from stdin
        query: String,
    },

    /// Check query syntax
    Validate {
        /// Query text, or "-" to read from stdin
        query: String,
    },

    /// Explain a query: AST, execution plan and performance report
    Explain {
        /// Query text, or "-" to read from stdin
        query: String,
    },

    /// List example queries
    Examples,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    promql_explain::logging::init(&config.logging);

    let service = ExplainService::new();

    match cli.command {
        Commands::Format { query } => {
            let response = service.format(&read_query(&query)?);
            print_json(&response, cli.pretty)?;
            if !response.success {
                std::process::exit(1);
            }
        }

        Commands::Validate { query } => {
            let response = service.validate(&read_query(&query)?);
            print_json(&response, cli.pretty)?;
            if !response.valid {
                std::process::exit(1);
            }
        }

        Commands::Explain { query } => {
            let response = service.explain(&read_query(&query)?);
            print_json(&response, cli.pretty)?;
            if !response.success {
                std::process::exit(1);
            }
        }

        Commands::Examples => {
            print_json(&service.list_examples(), cli.pretty)?;
        }

        Commands::Serve { host, port } => {
            let mut api = config.api;
            if let Some(host) = host {
                api.host = host;
            }
            if let Some(port) = port {
                api.port = port;
            }

            tracing::info!("Starting promql-explain API v{}", env!("CARGO_PKG_VERSION"));
            serve(AppState::new(api)).await?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write config to {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Resolve the query argument, reading stdin for "-"
fn read_query(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read query from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
