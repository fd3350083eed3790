// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forced token refresh through an external command.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use futures_util::future::BoxFuture;

/// Something that can be asked to replace the token in the store.
///
/// The result reports whether the trigger ran to completion. Callers log the
/// error and carry on: a refresh that fails or times out may still have
/// updated the store, so the store is re-read either way.
pub trait RefreshTrigger: Send + Sync {
    fn refresh(&self) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Runs an executable (no arguments) and waits for it up to a deadline.
///
/// The exit status is logged but not interpreted. On timeout the child is killed.
pub struct CommandRefresh {
    program: PathBuf,
    timeout: Duration,
}

impl CommandRefresh {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { program: program.into(), timeout }
    }
}

impl RefreshTrigger for CommandRefresh {
    fn refresh(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let mut child = tokio::process::Command::new(&self.program)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .spawn()
                .with_context(|| format!("failed to spawn {}", self.program.display()))?;

            match tokio::time::timeout(self.timeout, child.wait()).await {
                Ok(status) => {
                    let status = status.context("failed to wait for refresh command")?;
                    tracing::debug!(program = %self.program.display(), %status, "refresh command exited");
                    Ok(())
                }
                Err(_) => {
                    anyhow::bail!(
                        "{} timed out after {}ms",
                        self.program.display(),
                        self.timeout.as_millis()
                    )
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
