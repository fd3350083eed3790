// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_DEVICES_URL: &str = "https://api.tailscale.com/api/v2/tailnet/-/devices";

/// Device-list proxy for the Tailscale API.
#[derive(Debug, Clone, Parser)]
#[command(name = "tailproxy", version, about)]
pub struct ProxyConfig {
    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "PROXY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 1180, env = "PROXY_PORT")]
    pub port: u16,

    /// File holding the current bearer token (rewritten by the refresh command).
    #[arg(long, default_value = "/tokens/token_value", env = "PROXY_TOKEN_FILE")]
    pub token_file: PathBuf,

    /// Executable run to force a token refresh after an upstream 401.
    #[arg(long, default_value = "/usr/local/bin/token-refresh.sh", env = "PROXY_REFRESH_COMMAND")]
    pub refresh_command: PathBuf,

    /// Upstream device-listing URL.
    #[arg(long, default_value = DEFAULT_DEVICES_URL, env = "PROXY_DEVICES_URL")]
    pub devices_url: String,

    /// Upstream request timeout in milliseconds.
    #[arg(long, default_value_t = 10_000, env = "PROXY_FETCH_TIMEOUT_MS")]
    pub fetch_timeout_ms: u64,

    /// Refresh command timeout in milliseconds.
    #[arg(long, default_value_t = 15_000, env = "PROXY_REFRESH_TIMEOUT_MS")]
    pub refresh_timeout_ms: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info", env = "PROXY_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text or json).
    #[arg(long, default_value = "text", env = "PROXY_LOG_FORMAT")]
    pub log_format: String,
}

impl ProxyConfig {
    /// Reject settings the server cannot start with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = self.devices_url.trim();
        if url.is_empty() {
            anyhow::bail!("--devices-url must not be empty");
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            anyhow::bail!("--devices-url must be an http(s) URL, got: {url}");
        }
        if self.fetch_timeout_ms == 0 {
            anyhow::bail!("--fetch-timeout-ms must be greater than zero");
        }
        if self.refresh_timeout_ms == 0 {
            anyhow::bail!("--refresh-timeout-ms must be greater than zero");
        }
        match self.log_format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("invalid log format: {other} (expected text or json)"),
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
