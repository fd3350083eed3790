// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `tailproxy` binary as a subprocess, configured purely
//! through its environment, and exercises it over HTTP.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Once;
use std::time::Duration;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times; only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `tailproxy` binary.
pub fn proxy_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("tailproxy")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// A running `tailproxy` process that is killed on drop.
pub struct ProxyProcess {
    child: Child,
    port: u16,
    _dir: tempfile::TempDir,
}

/// Builder for the environment a [`ProxyProcess`] starts with.
///
/// Defaults: no token file, a refresh command that does nothing, and an
/// upstream URL pointing at a closed local port.
pub struct ProxyBuilder {
    token: Option<String>,
    devices_url: Option<String>,
}

impl ProxyBuilder {
    /// Seed the token file with `token`.
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_owned());
        self
    }

    /// Override the upstream device-listing URL.
    pub fn devices_url(mut self, url: &str) -> Self {
        self.devices_url = Some(url.to_owned());
        self
    }

    pub fn spawn(self) -> anyhow::Result<ProxyProcess> {
        ensure_crypto();
        let binary = proxy_binary();
        anyhow::ensure!(binary.exists(), "tailproxy binary not found at {}", binary.display());

        let dir = tempfile::tempdir()?;
        let token_file = dir.path().join("token_value");
        if let Some(ref token) = self.token {
            std::fs::write(&token_file, token)?;
        }

        let devices_url = match self.devices_url {
            Some(url) => url,
            None => format!("http://127.0.0.1:{}/api/v2/tailnet/-/devices", free_port()?),
        };

        let port = free_port()?;
        let child = Command::new(&binary)
            .env("PROXY_PORT", port.to_string())
            .env("PROXY_HOST", "127.0.0.1")
            .env("PROXY_TOKEN_FILE", &token_file)
            .env("PROXY_REFRESH_COMMAND", "/bin/true")
            .env("PROXY_DEVICES_URL", devices_url)
            .env("PROXY_FETCH_TIMEOUT_MS", "2000")
            .env("PROXY_LOG_LEVEL", "warn")
            .env_remove("RUST_LOG")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(ProxyProcess { child, port, _dir: dir })
    }
}

impl ProxyProcess {
    pub fn build() -> ProxyBuilder {
        ProxyBuilder { token: None, devices_url: None }
    }

    /// Spawn with the default environment (no token).
    pub fn start() -> anyhow::Result<Self> {
        Self::build().spawn()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for HTTP requests.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Poll until the listener answers any HTTP request.
    pub async fn wait_ready(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("tailproxy did not start listening within {timeout:?}");
            }
            if client.get(&url).send().await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Whether the process has exited.
    pub fn has_exited(&mut self) -> anyhow::Result<bool> {
        Ok(self.child.try_wait()?.is_some())
    }
}

impl Drop for ProxyProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
