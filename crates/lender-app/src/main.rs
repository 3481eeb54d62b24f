mod cli;
mod command;
mod render;
mod repl;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use lender_common::SessionId;
use lender_config::LenderConfig;
use lender_remote::{BackendConfig, HttpBackend};
use lender_session::{Collaborators, SessionRegistry, SessionSettings};

const DEFAULT_DIRECTIVE: &str = "lender=info";

/// Load environment variables from a .env file (KEY=VALUE lines).
/// Variables that are already set win.
fn load_dotenv() {
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return;
    };
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
        }
    }
}

fn parse_dotenv(contents: &str) -> Vec<(&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            (
                key.trim(),
                value.trim().trim_matches('"').trim_matches('\''),
            )
        })
        .collect()
}

fn session_settings(config: &LenderConfig) -> SessionSettings {
    SessionSettings {
        event_capacity: config.session.event_capacity as usize,
        ..SessionSettings::default()
    }
    .with_settle_delay(Duration::from_millis(u64::from(config.summary.settle_delay_ms)))
    .with_auto_generate(config.summary.auto_generate)
}

fn backend_config(config: &LenderConfig) -> BackendConfig {
    BackendConfig::new(config.service.base_url.clone())
        .with_connect_timeout(Duration::from_secs(u64::from(
            config.service.connect_timeout_secs,
        )))
        .with_request_timeout(Duration::from_secs(u64::from(
            config.service.request_timeout_secs,
        )))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file before anything else
    load_dotenv();

    let args = cli::parse();

    let loaded = lender_config::load_config(args.config.as_deref().map(Path::new));
    let directive = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.logging.directive()))
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
        )
        .init();

    tracing::info!("Lender v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        LenderConfig::default()
    });
    if let Some(url) = args.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
        config.service.base_url = url.trim().trim_end_matches('/').to_string();
    }
    tracing::info!("Backend: {}", config.service.base_url);

    let backend = match HttpBackend::new(backend_config(&config)) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            tracing::error!("Cannot use backend {}: {e}", config.service.base_url);
            return ExitCode::FAILURE;
        }
    };

    let registry = Arc::new(SessionRegistry::new(
        Collaborators::from_backend(backend.clone()),
        session_settings(&config),
    ));

    let session = match args.session.as_deref().and_then(SessionId::parse) {
        Some(id) => registry.enter(id).await,
        None => registry.start_new().await,
    };

    let repl = repl::Repl::new(registry, backend, session);
    if let Err(e) = repl.run().await {
        tracing::error!("Input error: {e}");
        return ExitCode::FAILURE;
    }
    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
