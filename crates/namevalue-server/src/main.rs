//! Name Value leaderboard server.
//!
//! Wires the durable store, point ledger, announcement queue, event
//! dispatcher, and HTTP API together and serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `namevalue-config.yaml`
//! 3. Open the durable store (fatal on failure)
//! 4. Start the announcement queue consumer
//! 5. Build the dispatcher and serve the HTTP API
//! 6. On shutdown, let the queue finish what it is saying

mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use namevalue_announcer::{AnnouncementQueue, CommandSink, CommandVoice, SynthesisBackend};
use namevalue_core::config::DEFAULT_CONFIG_FILE;
use namevalue_core::{EventDispatcher, NameValueConfig};
use namevalue_db::KvStore;
use namevalue_ledger::PointLedger;
use namevalue_observer::AppState;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::StartupError;

/// How long the announcement queue may keep talking after shutdown.
const QUEUE_DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("namevalue-server starting");

    // 2. Load configuration.
    let config = load_config().context("loading configuration")?;
    info!(
        port = config.server.port,
        storage = ?config.storage.backend,
        match_policy = ?config.ledger.match_policy,
        leaderboard_size = config.ledger.leaderboard_size,
        "Configuration loaded"
    );

    // 3. Open the durable store. Nothing works without it.
    let store = match KvStore::open(&config.storage).await {
        Ok(store) => store,
        Err(e) => {
            error!(
                backend = ?config.storage.backend,
                error = %e,
                "CRITICAL: durable store unavailable, cannot start"
            );
            return Err(StartupError::from(e).into());
        }
    };
    let ledger = PointLedger::new(store, config.ledger.match_policy);
    let session = ledger.session().await;
    info!(
        backend = ledger.store().backend_name(),
        participants = ledger.load().await.len(),
        last_active = %session.last_active,
        "Ledger ready"
    );

    // 4. Start the announcement queue.
    let synthesizer = SynthesisBackend::from_config(&config.announcer.synthesis);
    if matches!(synthesizer, SynthesisBackend::Disabled) {
        warn!("no TTS API key configured, every announcement uses the fallback voice");
    }
    info!(synthesis = synthesizer.name(), "Announcer ready");
    let (announcer, queue) = AnnouncementQueue::new(
        synthesizer,
        CommandSink::new(&config.announcer.player),
        CommandVoice::new(&config.announcer.fallback),
        config.announcer.synthesis.timeout(),
    );
    let queue_handle = tokio::spawn(queue.run());

    // 5. Build the dispatcher and serve.
    let dispatcher = Arc::new(EventDispatcher::new(
        ledger,
        announcer,
        config.dispatcher,
        &config.ledger,
    ));
    let state = Arc::new(AppState::new(dispatcher));
    namevalue_observer::start_server(&config.server, state, shutdown_signal())
        .await
        .map_err(StartupError::from)?;

    // 6. The last announcer handle went away with the router.
    match tokio::time::timeout(QUEUE_DRAIN_TIMEOUT, queue_handle).await {
        Ok(Ok(())) => info!("announcement queue drained"),
        Ok(Err(e)) => error!(error = %e, "announcement queue task failed"),
        Err(_) => warn!(
            timeout_secs = QUEUE_DRAIN_TIMEOUT.as_secs(),
            "announcement queue still busy, exiting anyway"
        ),
    }

    info!("namevalue-server stopped");
    Ok(())
}

/// Load configuration from `NAMEVALUE_CONFIG` or `namevalue-config.yaml`.
///
/// A missing file means defaults (plus environment overrides).
fn load_config() -> Result<NameValueConfig, StartupError> {
    let path = std::env::var("NAMEVALUE_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
    if path.exists() {
        info!(path = %path.display(), "Loading config file");
        Ok(NameValueConfig::from_file(&path)?)
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        let mut config = NameValueConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

/// Resolve on `Ctrl-C`.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C, shutting down");
    }
    info!("shutdown signal received");
}
