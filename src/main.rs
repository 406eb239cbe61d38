//! Glidepath - slider captcha solver for Chrome.
//!
//! Main entry point for the Glidepath CLI.

mod cli;
mod solver;
mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use glidepath_cdp::{CdpClient, CdpSliderPage, PointerMode};
use glidepath_config::{Config, ConfigLoader, ConfigValidator, PointerDispatch};
use glidepath_core::DragController;
use glidepath_recognition::{CachedRecognizer, HttpRecognizer};

use crate::cli::{Cli, Commands};
use crate::solver::Solver;
use crate::watch::Watcher;

/// Get the Glidepath home directory (~/.glidepath).
fn glidepath_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".glidepath")
}

fn init_tracing() -> anyhow::Result<()> {
    let log_dir = glidepath_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("glidepath")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { endpoint, page } => run_watch(&cli.config, endpoint, page).await,
        Commands::CheckConfig => check_config(&cli.config),
    }
}

/// Load, expand and validate the config, logging warnings.
fn load_config(path: &Path) -> anyhow::Result<Config> {
    let path = PathBuf::from(ConfigLoader::expand_path(&path.to_string_lossy()));
    let config = ConfigLoader::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    let warnings = ConfigValidator::validate(&config)?.into_result()?;
    for warning in warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    Ok(config)
}

fn check_config(path: &Path) -> anyhow::Result<()> {
    let path = PathBuf::from(ConfigLoader::expand_path(&path.to_string_lossy()));
    let config = ConfigLoader::load(&path)?;
    let result = ConfigValidator::validate(&config)?;

    for error in &result.errors {
        println!("error   {}: {}", error.path, error.message);
    }
    for warning in &result.warnings {
        println!("warning {}: {}", warning.path, warning.message);
    }

    if !result.is_valid() {
        anyhow::bail!("{} has {} error(s)", path.display(), result.errors.len());
    }
    println!("{} is valid ({} rule(s))", path.display(), config.rules.len());
    Ok(())
}

async fn run_watch(
    config_path: &Path,
    endpoint: Option<String>,
    page_filter: Option<String>,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(endpoint) = endpoint {
        config.browser.endpoint = endpoint;
    }
    if page_filter.is_some() {
        config.browser.page_url_contains = page_filter;
    }

    info!("Starting Glidepath v{}", env!("CARGO_PKG_VERSION"));

    let client = CdpClient::connect(&config.browser.endpoint).await?;
    let session = Arc::new(
        client
            .attach_first_page(config.browser.page_url_contains.as_deref())
            .await?,
    );

    let mode = match config.browser.pointer_dispatch {
        PointerDispatch::Dom => PointerMode::Dom,
        PointerDispatch::Input => PointerMode::Input,
    };
    let page = CdpSliderPage::new(session.clone()).with_pointer_mode(mode);

    let recognition = &config.recognition;
    let recognizer = CachedRecognizer::new(
        HttpRecognizer::with_options(
            &recognition.server_url,
            recognition.timeout(),
            &recognition.client_version,
        )?,
        recognition.result_ttl(),
    );
    info!("Recognition service at {}", recognizer.inner().endpoint());

    let controller = Arc::new(DragController::new(config.drag.clone()));
    let solver = Solver::new(controller, Arc::new(recognizer), config.watch.clone());

    Watcher::new(session, page, solver, config.rules, config.watch).run().await
}
