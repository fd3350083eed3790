// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use futures_util::future::BoxFuture;

/// Read access to the current bearer token.
///
/// Read fresh on every call: the backing store is rewritten externally and
/// nothing is cached between requests.
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when the store is unreadable or blank.
    fn read_token(&self) -> BoxFuture<'_, Option<String>>;
}

/// Token kept as the sole contents of a file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn read_token(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(async move {
            match tokio::fs::read_to_string(&self.path).await {
                Ok(contents) => normalize_token(&contents),
                Err(e) => {
                    tracing::debug!(path = %self.path.display(), err = %e, "token file unreadable");
                    None
                }
            }
        })
    }
}

/// Trim surrounding whitespace; blank means no token.
pub fn normalize_token(raw: &str) -> Option<String> {
    let token = raw.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
