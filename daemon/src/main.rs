//! Authenticity Check Pro daemon: serves the HTTP API over an LMDB store.

mod config;
mod error;
mod seed;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use acp_rpc::{AppState, RpcServer};
use acp_store_lmdb::{check_data_dir, check_integrity, IntegrityReport, LmdbStore, Migrator};
use acp_types::Timestamp;
use acp_utils::LogFormat;

use crate::config::AppConfig;
use crate::error::DaemonError;
use crate::seed::SeedCatalogue;

#[derive(Parser)]
#[command(name = "acp-daemon", about = "Product authenticity verification service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "ACP_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the LMDB environment.
    #[arg(long, env = "ACP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address to bind the HTTP API to.
    #[arg(long, env = "ACP_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// HTTP API port.
    #[arg(long, env = "ACP_PORT")]
    port: Option<u16>,

    /// LMDB map size in MiB.
    #[arg(long, env = "ACP_MAP_SIZE_MB")]
    map_size_mb: Option<usize>,

    /// Bearer token required by the admin routes.
    #[arg(long, env = "ACP_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ACP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output: "human" or "json".
    #[arg(long, env = "ACP_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Do not send CORS headers.
    #[arg(long, env = "ACP_DISABLE_CORS")]
    disable_cors: bool,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP API until interrupted.
    Serve,
    /// Load brands and patterns from a TOML catalogue, skipping existing brands.
    Seed {
        #[arg(long)]
        file: PathBuf,
    },
    /// Check database integrity and print a report.
    Check,
}

/// File settings (or defaults) with CLI flags and env vars laid over them.
fn resolve_config(cli: &Cli, base: AppConfig) -> AppConfig {
    AppConfig {
        data_dir: cli.data_dir.clone().unwrap_or(base.data_dir),
        listen_addr: cli.listen_addr.clone().unwrap_or(base.listen_addr),
        port: cli.port.unwrap_or(base.port),
        map_size_mb: cli.map_size_mb.unwrap_or(base.map_size_mb),
        admin_token: cli.admin_token.clone().or(base.admin_token),
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        log_format: cli.log_format.unwrap_or(base.log_format),
        enable_cors: base.enable_cors && !cli.disable_cors,
        upload_prefix: base.upload_prefix,
    }
}

fn open_store(config: &AppConfig) -> Result<LmdbStore, DaemonError> {
    if let Err(e) = check_data_dir(&config.data_dir) {
        tracing::warn!("{e}; a new environment will be created");
    }
    let store = LmdbStore::open(&config.data_dir, config.map_size_bytes())?;
    Migrator::run(&store)?;
    Ok(store)
}

fn log_report(report: &IntegrityReport) {
    if report.is_healthy() {
        tracing::info!(
            databases = report.databases_checked,
            entries = report.total_entries,
            "database integrity check passed"
        );
    } else {
        for error in &report.errors {
            tracing::error!("integrity: {error}");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let store = open_store(&config)?;
    let report = check_integrity(&store)?;
    log_report(&report);
    if !report.is_healthy() {
        return Err(DaemonError::Integrity(report.errors.len()).into());
    }

    if config.admin_token.is_none() {
        tracing::warn!("no admin token configured; admin routes are disabled");
    }

    let state = AppState::new(Arc::new(store))
        .admin_token(config.admin_token.clone())
        .upload_prefix(&config.upload_prefix);

    RpcServer::new(addr)
        .enable_cors(config.enable_cors)
        .start(state, shutdown_signal())
        .await?;

    tracing::info!("acp daemon exited cleanly");
    Ok(())
}

fn seed(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
    let catalogue = SeedCatalogue::from_toml_file(file)?;
    let store = open_store(config)?;
    let report = catalogue.apply(&store, Timestamp::now())?;
    println!(
        "seeded {} brand(s) with {} pattern(s); {} already present",
        report.brands_added, report.patterns_added, report.brands_skipped
    );
    Ok(())
}

fn check(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let report = check_integrity(&store)?;
    println!(
        "databases checked: {}\ntotal entries: {}",
        report.databases_checked, report.total_entries
    );
    for error in &report.errors {
        println!("error: {error}");
    }
    if !report.is_healthy() {
        return Err(DaemonError::Integrity(report.errors.len()).into());
    }
    println!("status: healthy");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    let config = resolve_config(&cli, base);

    acp_utils::init_tracing(&config.log_level, config.log_format)?;
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    match cli.command {
        Command::Serve => {
            tracing::info!(
                "starting acp daemon on {}:{} (data: {})",
                config.listen_addr,
                config.port,
                config.data_dir.display()
            );
            serve(config).await
        }
        Command::Seed { ref file } => seed(&config, file),
        Command::Check => check(&config),
    }
}
