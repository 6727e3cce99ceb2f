mod api;
mod response;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::info;

use codeocr_config::defaults::{DEFAULT_LOG_LEVEL, DEFAULT_PORT};
use codeocr_config::{
    collect_redacted_paths, load_raw_config, prepare, redact, resolve_config_path, CodeOcrConfig,
    LoggingConfig,
};
use codeocr_logging::init_logger;
use codeocr_providers::{ProviderRegistry, BUILTIN_PLATFORMS};

use api::AppState;

#[derive(Parser)]
#[command(name = "codeocr")]
#[command(about = "CodeOCR: image recognition gateway over vision LLM providers")]
#[command(version)]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind the HTTP server to
        #[arg(long)]
        bind: Option<String>,
    },
    /// Query a running server's health endpoint
    Status {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the effective config with secrets masked
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = resolve_config_path(cli.config.as_deref());

    // logger first, so load warnings reach its sinks
    let raw = load_raw_config(&path).await?;
    let logging: LoggingConfig = raw
        .get("logging")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .context("Invalid logging section")?
        .unwrap_or_default();
    init_logger(
        logging.dir.as_deref().map(Path::new),
        logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL),
        logging.json.unwrap_or(false),
    );

    let config = prepare(raw, BUILTIN_PLATFORMS)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    match cli.command {
        Commands::Serve { port, bind } => run_server(config, port, bind).await?,
        Commands::Status { port } => {
            let port = port
                .or_else(|| config.server.as_ref().and_then(|s| s.port))
                .unwrap_or(DEFAULT_PORT);
            print_status(port).await?;
        }
        Commands::CheckConfig => check_config(&config, &path)?,
    }

    Ok(())
}

async fn run_server(config: CodeOcrConfig, port: Option<u16>, bind: Option<String>) -> Result<()> {
    let mut server = config.server.clone().unwrap_or_default();
    server.port = port.or(server.port);
    server.bind = bind.or(server.bind);
    let config = CodeOcrConfig {
        server: Some(server),
        ..config
    };
    let addr = config.bind_address();

    info!(
        addr = %addr,
        default_platform = config.default_platform(),
        config = %redact(&serde_json::to_value(&config)?),
        "Starting CodeOCR gateway"
    );

    let registry = ProviderRegistry::from_config(&config)?;
    let state = Arc::new(AppState {
        registry: Arc::new(registry),
    });
    let app = api::build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn print_status(port: u16) -> Result<()> {
    println!("CodeOCR status: checking port {port}...");
    let client = reqwest::Client::new();
    match client
        .get(format!("http://127.0.0.1:{port}/health"))
        .send()
        .await
    {
        Ok(resp) => {
            let body: Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => {
            println!("CodeOCR is not running on port {port}");
        }
    }
    Ok(())
}

fn check_config(config: &CodeOcrConfig, path: &Path) -> Result<()> {
    let value = serde_json::to_value(config)?;
    println!("# {}", path.display());
    print!("{}", serde_yaml::to_string(&redact(&value))?);

    let secrets = collect_redacted_paths(&value);
    if secrets.is_empty() {
        println!("# no provider secrets configured");
    } else {
        println!("# secrets set: {}", secrets.join(", "));
    }
    Ok(())
}
