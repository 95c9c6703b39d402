// medium - terminal browser for Medium Tech content
//
// Browses users, artists, still images, image files, image releases and
// file uploaders served by a Medium Tech REST backend.
//
// Architecture:
// - Router: route table, backend/navigation URL building, history
// - Session + Dispatcher: token storage, authenticated requests, login
// - Page engine: record and list pages with stale-response protection
// - Content: which page each route shows and how items are labelled
// - TUI (ratatui) or headless CLI on top of the same pages

mod cli;
mod config;
mod content;
mod dispatch;
mod logging;
mod observable;
mod page;
mod record;
mod render;
mod router;
mod session;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, LogRotation, LoggingConfig};
use dispatch::{Dispatcher, ReqwestTransport};
use logging::{LogBuffer, TuiLogLayer};
use router::Router;
use session::{FileTokenStore, Session};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Everything a front end needs to show pages
pub struct Services {
    pub config: Config,
    pub router: Router,
    pub dispatcher: Dispatcher,
}

impl Services {
    pub fn from_config(config: Config) -> Result<Self> {
        let session = Arc::new(Session::new(Box::new(FileTokenStore::new(
            config.token_path.clone(),
        ))));
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))
            .context("Failed to create HTTP client")?;

        Ok(Self {
            router: content::router(&config.backend_url),
            dispatcher: Dispatcher::new(Arc::new(transport), session),
            config,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    // TUI mode captures logs into the buffer so they don't tear the screen
    let log_buffer = LogBuffer::new();
    let tui_mode = args.command.is_none();
    let _file_guard = init_logging(&config, &log_buffer, tui_mode);

    tracing::debug!("backend: {}", config.backend_url);
    let services = Services::from_config(config)?;

    match args.command {
        Some(command) => cli::run(command, &services).await,
        None => tui::run_tui(services, log_buffer).await,
    }
}

/// Install the global subscriber
///
/// Precedence for the filter: RUST_LOG env var > config level. The returned
/// guard must stay alive for file logs to flush.
fn init_logging(config: &Config, log_buffer: &LogBuffer, tui_mode: bool) -> Option<WorkerGuard> {
    let default_filter = format!("medium={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let (file_writer, guard) = match file_writer(&config.logging) {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };
    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
    });

    let tui_layer = tui_mode.then(|| TuiLogLayer::new(log_buffer.clone()));
    let stderr_layer =
        (!tui_mode).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(tui_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

/// Non-blocking rolling file writer, if file logging is enabled
fn file_writer(logging: &LoggingConfig) -> Option<(NonBlocking, WorkerGuard)> {
    if !logging.file_enabled {
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&logging.file_dir) {
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            logging.file_dir, e
        );
        return None;
    }

    let appender = match logging.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Daily => tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix),
        LogRotation::Never => tracing_appender::rolling::never(&logging.file_dir, &logging.file_prefix),
    };

    Some(tracing_appender::non_blocking(appender))
}
