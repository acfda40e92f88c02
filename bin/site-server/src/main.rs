//! site-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Wire the contact pipeline (submission log + mail transport).
//! 4. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod contact;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    init_tracing(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), "site-server starting");

    // ── 3. Contact pipeline ────────────────────────────────────────────────────
    info!(
        recipient = %cfg.contact_recipient,
        submissions = %cfg.submissions_path.display(),
        transport = ?cfg.mail_transport,
        "contact pipeline configured"
    );
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let state = Arc::new(AppState::from_config(cfg));

    // ── 4. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("site-server stopped");
    Ok(())
}

/// Install the global subscriber: compact text, or one JSON object per line.
fn init_tracing(cfg: &Config) {
    let filter = log_filter(std::env::var("RUST_LOG").ok().as_deref(), &cfg.log_level);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// `RUST_LOG` wins when it parses; then `SITE_LOG`; then plain `info`.
/// Runs before the subscriber exists, so problems go to stderr.
fn log_filter(rust_log: Option<&str>, site_log: &str) -> EnvFilter {
    if let Some(directives) = rust_log {
        match EnvFilter::try_new(directives) {
            Ok(f) => return f,
            Err(e) => eprintln!("WARN: ignoring RUST_LOG='{directives}': {e}"),
        }
    }
    EnvFilter::try_new(site_log).unwrap_or_else(|e| {
        eprintln!("WARN: SITE_LOG='{site_log}' is not a valid tracing filter ({e}); falling back to 'info'");
        EnvFilter::new("info")
    })
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
