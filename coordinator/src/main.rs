//! The coordinator binary: wires together the registry, scheduler, signing
//! authority, and control-plane surface, then serves until shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use coordinator_primitives::{Clock, MonotonicClock};
use coordinator_registry::AgentRegistry;
use coordinator_scheduler::Scheduler;
use coordinator_signing::SigningAuthority;
use coordinator_surface::{build_router, AppState, CoordinatorConfig};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

const SHUTDOWN_DRAIN_CAP: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var("COORDINATOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("coordinator.toml"));
    let config = CoordinatorConfig::load_from_file(&config_path)
        .context("failed to load coordinator configuration")?;

    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock);
    let registry = AgentRegistry::new(Arc::clone(&clock), config.registry);
    let scheduler = Arc::new(Scheduler::with_weights(registry.clone(), config.scoring));
    let signing = Arc::new(
        SigningAuthority::generate(config.token_ttl)
            .context("failed to generate coordinator signing key pair; this is fatal")?,
    );

    spawn_cleanup_ticker(registry.clone(), config.registry.cleanup_interval);

    let state = AppState::new(registry, scheduler, signing, config, clock);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind http surface on {addr}"))?;
    info!(%addr, "coordinator http surface listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_with_drain_cap())
        .await
        .context("coordinator http surface exited with an error")?;

    info!("coordinator shut down cleanly");
    Ok(())
}

fn spawn_cleanup_ticker(registry: AgentRegistry, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = registry.run_cleanup_tick().await;
            if removed > 0 {
                info!(removed, "cleanup tick removed dead agents");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!(drain_cap_secs = SHUTDOWN_DRAIN_CAP.as_secs(), "shutdown signal received, draining in-flight requests");
}

/// Resolves as soon as a shutdown signal arrives (handing control to axum's
/// graceful drain), and separately arms a force-exit timer so a stuck
/// connection can't keep the process alive past the drain cap.
async fn shutdown_signal_with_drain_cap() {
    shutdown_signal().await;
    tokio::spawn(async {
        tokio::time::sleep(SHUTDOWN_DRAIN_CAP).await;
        error!("graceful shutdown drain cap exceeded, forcing exit");
        std::process::exit(1);
    });
}
