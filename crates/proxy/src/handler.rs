// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `/devices` request lifecycle: token read, upstream fetch, and a single
//! refresh-and-retry on 401.
//!
//! Transport-agnostic. The HTTP layer only routes and renders the [`Outcome`].

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use crate::config::ProxyConfig;
use crate::credential::{CommandRefresh, FileTokenStore, RefreshTrigger, TokenStore};
use crate::error::{ErrorResponse, ProxyError};
use crate::upstream::{DevicesApi, DevicesClient, UpstreamResponse};

/// Final result of one `/devices` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No token before the first fetch. Upstream was not contacted.
    TokenUnavailable,
    /// An upstream HTTP exchange, relayed as-is.
    Upstream(UpstreamResponse),
    /// No exchange completed; carries the failure description.
    Unreachable(String),
}

/// Retry states. Each request walks these once, front to back.
enum Step {
    Initial { token: String },
    Refreshing { rejected: UpstreamResponse },
    Retrying { token: String },
    Done(Outcome),
}

/// Stateless `/devices` handler over injected collaborators.
pub struct DevicesHandler {
    tokens: Arc<dyn TokenStore>,
    upstream: Arc<dyn DevicesApi>,
    refresher: Arc<dyn RefreshTrigger>,
}

impl DevicesHandler {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        upstream: Arc<dyn DevicesApi>,
        refresher: Arc<dyn RefreshTrigger>,
    ) -> Self {
        Self { tokens, upstream, refresher }
    }

    /// Wire the file token store, reqwest client, and refresh command from config.
    pub fn from_config(config: &ProxyConfig) -> anyhow::Result<Self> {
        let tokens = Arc::new(FileTokenStore::new(&config.token_file));
        let upstream = Arc::new(DevicesClient::new(&config.devices_url, config.fetch_timeout())?);
        let refresher =
            Arc::new(CommandRefresh::new(&config.refresh_command, config.refresh_timeout()));
        Ok(Self::new(tokens, upstream, refresher))
    }

    /// Run one request to completion.
    ///
    /// At most one refresh and two upstream calls. Only an exact 401 on the
    /// first call leads to a refresh; whatever the retry returns is final.
    pub async fn handle(&self) -> Outcome {
        let Some(token) = self.tokens.read_token().await else {
            warn!("tailscale token unavailable");
            return Outcome::TokenUnavailable;
        };

        let mut step = Step::Initial { token };
        loop {
            step = match step {
                Step::Initial { token } => match self.upstream.fetch_devices(&token).await {
                    Ok(resp) if resp.status == StatusCode::UNAUTHORIZED => {
                        info!("upstream rejected token, forcing refresh");
                        Step::Refreshing { rejected: resp }
                    }
                    result => Step::Done(settle(result)),
                },
                Step::Refreshing { rejected } => {
                    // Failure is advisory: the store may have been updated regardless.
                    if let Err(e) = self.refresher.refresh().await {
                        warn!(err = %format!("{e:#}"), "token refresh failed");
                    }
                    match self.tokens.read_token().await {
                        Some(token) => Step::Retrying { token },
                        None => {
                            warn!("no token after refresh, returning original 401");
                            Step::Done(Outcome::Upstream(rejected))
                        }
                    }
                }
                Step::Retrying { token } => {
                    Step::Done(settle(self.upstream.fetch_devices(&token).await))
                }
                Step::Done(outcome) => return outcome,
            };
        }
    }
}

fn settle(result: anyhow::Result<UpstreamResponse>) -> Outcome {
    match result {
        Ok(resp) => Outcome::Upstream(resp),
        Err(e) => {
            let description = format!("{e:#}");
            warn!(err = %description, "upstream unreachable");
            Outcome::Unreachable(description)
        }
    }
}

/// Envelope message for an upstream status that arrived without a body.
pub fn status_text(status: StatusCode) -> String {
    format!("HTTP Error {}: {}", status.as_u16(), status.canonical_reason().unwrap_or("Unknown"))
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Self::TokenUnavailable => ProxyError::TokenUnavailable.into_response(),
            Self::Unreachable(description) => {
                ProxyError::UpstreamUnreachable.to_http_response(description)
            }
            Self::Upstream(UpstreamResponse { status, body }) => {
                let body = if body.is_empty() {
                    ErrorResponse::new(status_text(status)).to_bytes()
                } else {
                    body
                };
                let mut resp = (status, body).into_response();
                resp.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                resp
            }
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
