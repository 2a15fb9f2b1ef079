//! GIF Portal - wallet-connected client for the on-chain GIF board
//!
//! Connects a local wallet, keeps the board's submissions cached, and serves
//! the portal page (state plus submit/upvote/tip actions) as a JSON API.

use anyhow::{Context, Result};
use solana_sdk::signature::read_keypair_file;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

mod api;
mod chain;
mod config;
mod error;
mod metrics;
mod portal;
mod program;
mod wallet;

use chain::{ChainProvider, ConfirmationTracker, ProgramSubmitter};
use config::Settings;
use metrics::MetricsServer;
use portal::PortalClient;
use program::ProgramContext;
use wallet::{KeypairWallet, WalletProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    info!("Starting GIF Portal v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = Settings::load()?;
    info!(
        "Loaded configuration with {} RPC endpoint(s)",
        settings.network.rpc_urls.len()
    );

    // Fixed program configuration
    let board = read_keypair_file(&settings.program.board_keypair_path)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| {
            format!(
                "Failed to read board keypair: {}",
                settings.program.board_keypair_path
            )
        })?;
    let program = ProgramContext::new(settings.program_id()?, board);
    info!(
        "Program {} with board account {}",
        program.program_id,
        program.board_address()
    );

    // Chain access
    let provider = Arc::new(ChainProvider::new(settings.network.clone())?);
    let wallet: Arc<dyn WalletProvider> =
        Arc::new(KeypairWallet::new(settings.wallet.clone(), provider.clone()));
    let confirmations = ConfirmationTracker::new(
        provider.clone(),
        Duration::from_secs(settings.network.confirm_timeout_secs),
        Duration::from_millis(settings.network.confirm_poll_ms),
    );
    let submitter = Arc::new(ProgramSubmitter::new(
        provider.clone(),
        wallet.clone(),
        confirmations,
    ));

    let portal = Arc::new(PortalClient::new(
        program,
        &settings.portal,
        wallet,
        provider.clone(),
        submitter,
    ));
    info!("Portal client initialized");

    // Connect on start-up, like the page does on load
    if settings.wallet.auto_connect {
        let outcome = portal.connect().await;
        if outcome != portal::ActionOutcome::Succeeded {
            warn!("Auto-connect did not succeed ({})", outcome.as_str());
        }
    }

    // Surface status changes in the log as they happen
    let status_handle = tokio::spawn({
        let mut updates = portal.subscribe();
        async move {
            let mut last = None;
            while updates.changed().await.is_ok() {
                let status = updates.borrow_and_update().status.clone();
                if status != last {
                    if let Some(s) = &status {
                        info!(severity = ?s.severity, "{}", s.message);
                    }
                    last = status;
                }
            }
        }
    });

    // Start API server
    let api_handle = tokio::spawn({
        let config = settings.api.clone();
        let portal = portal.clone();
        let provider = provider.clone();
        async move {
            if let Err(e) = api::run_server(config, portal, provider).await {
                error!("API server error: {}", e);
            }
        }
    });

    // Start metrics server
    let metrics_handle = if settings.metrics.enabled {
        let server = MetricsServer::new(settings.metrics.port);
        Some(tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("Metrics server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("GIF Portal is running");
    info!("API server: http://{}:{}", settings.api.host, settings.api.port);
    if settings.metrics.enabled {
        info!("Metrics: http://0.0.0.0:{}/metrics", settings.metrics.port);
    }

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("Shutdown signal received, stopping...");

    api_handle.abort();
    status_handle.abort();
    if let Some(h) = metrics_handle {
        h.abort();
    }

    info!("GIF Portal stopped");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gif_portal=debug,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
