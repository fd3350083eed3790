// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the upstream device-listing API.

use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use bytes::Bytes;
use futures_util::future::BoxFuture;
use reqwest::header::ACCEPT;
use reqwest::Client;

/// A completed HTTP exchange with the upstream, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }
}

/// The upstream device list.
pub trait DevicesApi: Send + Sync {
    /// Fetch the device list using `token` as bearer credential.
    ///
    /// Any HTTP status is `Ok`. `Err` means no exchange completed (DNS,
    /// connect, TLS, timeout, or a body that could not be read).
    fn fetch_devices<'a>(&'a self, token: &'a str)
        -> BoxFuture<'a, anyhow::Result<UpstreamResponse>>;
}

/// reqwest-backed [`DevicesApi`] for a fixed URL.
pub struct DevicesClient {
    url: String,
    client: Client,
}

impl DevicesClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client =
            Client::builder().timeout(timeout).build().context("failed to build HTTP client")?;
        Ok(Self { url: url.into(), client })
    }
}

impl DevicesApi for DevicesClient {
    fn fetch_devices<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<UpstreamResponse>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(&self.url)
                .bearer_auth(token)
                .header(ACCEPT, "application/json")
                .send()
                .await?;
            let status = resp.status();
            let body = resp.bytes().await?;
            tracing::debug!(url = %self.url, %status, bytes = body.len(), "upstream responded");
            Ok(UpstreamResponse { status, body })
        })
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
