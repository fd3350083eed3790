// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tailproxy: relays the Tailscale device list, refreshing the bearer token
//! once when the API rejects it.

pub mod config;
pub mod credential;
pub mod error;
pub mod handler;
pub mod test_support;
pub mod transport;
pub mod upstream;

use std::sync::{Arc, Once};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ProxyConfig;
use crate::handler::DevicesHandler;
use crate::transport::build_router;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times; only the first call has effect.
pub fn install_crypto_provider() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Run the proxy server until SIGINT/SIGTERM.
pub async fn run(config: ProxyConfig) -> anyhow::Result<()> {
    install_crypto_provider();

    let addr = config.bind_addr();
    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let handler = Arc::new(DevicesHandler::from_config(&config)?);
    let router = build_router(handler);
    let listener = TcpListener::bind(&addr).await?;

    info!(
        token_file = %config.token_file.display(),
        upstream = %config.devices_url,
        "tailproxy listening on {addr}"
    );
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    info!("tailproxy stopped");
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT");
            }
        }
        shutdown.cancel();
    });
}
