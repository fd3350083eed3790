// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: collaborator fakes and assertion helpers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use futures_util::future::BoxFuture;
use tokio::sync::RwLock;

use crate::credential::{RefreshTrigger, TokenStore};
use crate::handler::DevicesHandler;
use crate::upstream::{DevicesApi, UpstreamResponse};

/// In-memory token store with a read counter.
pub struct FakeTokens {
    current: RwLock<Option<String>>,
    reads: AtomicU32,
}

impl FakeTokens {
    pub fn new(token: Option<&str>) -> Arc<Self> {
        Arc::new(Self { current: RwLock::new(token.map(str::to_owned)), reads: AtomicU32::new(0) })
    }

    pub async fn set(&self, token: Option<&str>) {
        *self.current.write().await = token.map(str::to_owned);
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl TokenStore for FakeTokens {
    fn read_token(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(async move {
            self.reads.fetch_add(1, Ordering::Relaxed);
            let current = self.current.read().await;
            current.as_deref().and_then(crate::credential::store::normalize_token)
        })
    }
}

/// One scripted upstream reply.
pub enum Reply {
    Status(u16, &'static str),
    Unreachable(&'static str),
}

/// Upstream fake that plays back scripted replies in order and records the
/// tokens it was called with.
///
/// Once the script runs out, the `repeat` reply (if any) is returned forever;
/// otherwise an unscripted call is reported as unreachable.
pub struct FakeUpstream {
    script: RwLock<VecDeque<Reply>>,
    repeat: Option<(u16, &'static str)>,
    seen_tokens: RwLock<Vec<String>>,
    calls: AtomicU32,
}

impl FakeUpstream {
    pub fn scripted(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: RwLock::new(replies.into()),
            repeat: None,
            seen_tokens: RwLock::new(Vec::new()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn always(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            script: RwLock::new(VecDeque::new()),
            repeat: Some((status, body)),
            seen_tokens: RwLock::new(Vec::new()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    pub async fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.read().await.clone()
    }
}

fn response(status: u16, body: &'static str) -> anyhow::Result<UpstreamResponse> {
    let status = StatusCode::from_u16(status)?;
    Ok(UpstreamResponse::new(status, body.as_bytes()))
}

impl DevicesApi for FakeUpstream {
    fn fetch_devices<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<UpstreamResponse>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.seen_tokens.write().await.push(token.to_owned());
            let next = self.script.write().await.pop_front();
            match (next, self.repeat) {
                (Some(Reply::Status(status, body)), _) => response(status, body),
                (Some(Reply::Unreachable(msg)), _) => Err(anyhow::anyhow!(msg)),
                (None, Some((status, body))) => response(status, body),
                (None, None) => Err(anyhow::anyhow!("unscripted upstream call")),
            }
        })
    }
}

/// Refresh fake standing in for the external refresher.
///
/// Optionally rewrites a [`FakeTokens`] store when invoked, and optionally
/// reports failure afterwards (a refresher that times out after the store
/// was already updated).
pub struct FakeRefresh {
    rotate: Option<(Arc<FakeTokens>, Option<&'static str>)>,
    failure: Option<&'static str>,
    calls: AtomicU32,
}

impl FakeRefresh {
    pub fn new() -> Self {
        Self { rotate: None, failure: None, calls: AtomicU32::new(0) }
    }

    /// Write `token` into `tokens` on each invocation.
    pub fn rotates_to(mut self, tokens: &Arc<FakeTokens>, token: Option<&'static str>) -> Self {
        self.rotate = Some((Arc::clone(tokens), token));
        self
    }

    pub fn failing(mut self, msg: &'static str) -> Self {
        self.failure = Some(msg);
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for FakeRefresh {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshTrigger for FakeRefresh {
    fn refresh(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if let Some((ref tokens, token)) = self.rotate {
                tokens.set(token).await;
            }
            match self.failure {
                Some(msg) => Err(anyhow::anyhow!(msg)),
                None => Ok(()),
            }
        })
    }
}

/// Build a handler over the given fakes.
pub fn fake_handler(
    tokens: &Arc<FakeTokens>,
    upstream: &Arc<FakeUpstream>,
    refresher: &Arc<FakeRefresh>,
) -> DevicesHandler {
    DevicesHandler::new(
        Arc::clone(tokens) as Arc<dyn TokenStore>,
        Arc::clone(upstream) as Arc<dyn DevicesApi>,
        Arc::clone(refresher) as Arc<dyn RefreshTrigger>,
    )
}

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}
