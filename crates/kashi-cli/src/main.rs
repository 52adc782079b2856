// SPDX-License-Identifier: GPL-3.0-or-later
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::serve;
use kashi_api::router;
use kashi_config::{load as load_config, AppConfig};
use kashi_matching::AppState;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CONFIG_ENV: &str = "KASHI_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config_path();
    let config = load_config(config_path.as_deref())?;
    init_tracing(&config.telemetry.log_level);
    if let Some(path) = &config_path {
        info!(target: "cli", path = %path.display(), "using configuration file");
    }
    serve_app(config).await
}

async fn serve_app(config: AppConfig) -> Result<()> {
    let addr = bind_addr(&config.http)?;
    let state = AppState::from_config(config)?;
    state.on_start();

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(target: "cli", addr = %listener.local_addr()?, "listening");

    serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server stopped")
}

/// `KASHI_CONFIG` names an optional TOML file layered over the defaults.
fn config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer().with_target(true).with_thread_names(true).with_level(true);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn bind_addr(http: &kashi_config::HttpConfig) -> Result<SocketAddr> {
    let addr = format!("{}:{}", http.host, http.port);
    addr.parse()
        .with_context(|| format!("invalid listen address {addr}"))
}

/// Completes on Ctrl-C, or SIGTERM on unix. A signal that cannot be installed is
/// logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(target: "cli", %error, "ctrl-c listener unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(target: "cli", %error, "SIGTERM listener unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!(target: "cli", "interrupt received, shutting down"),
        _ = terminate => info!(target: "cli", "terminate received, shutting down"),
    }
}
