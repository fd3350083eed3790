// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for responses the proxy synthesizes itself.
///
/// Upstream HTTP errors are not represented here: their status and body are
/// passed through to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyError {
    NotFound,
    NotImplemented,
    TokenUnavailable,
    UpstreamUnreachable,
}

impl ProxyError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::NotImplemented => 501,
            Self::TokenUnavailable => 503,
            Self::UpstreamUnreachable => 502,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::TokenUnavailable => "TOKEN_UNAVAILABLE",
            Self::UpstreamUnreachable => "UPSTREAM_UNREACHABLE",
        }
    }

    /// Fixed client-facing message. Network failures carry their own description instead.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::NotImplemented => "not implemented",
            Self::TokenUnavailable => "tailscale token unavailable",
            Self::UpstreamUnreachable => "upstream unreachable",
        }
    }

    pub fn to_http_response(&self, message: impl Into<String>) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        self.to_http_response(self.default_message())
    }
}

/// The `{"error": "..."}` envelope used for every synthesized error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }

    /// Serialized envelope bytes, for bodies assembled outside of `Json`.
    pub fn to_bytes(&self) -> bytes::Bytes {
        match serde_json::to_vec(self) {
            Ok(buf) => bytes::Bytes::from(buf),
            Err(_) => bytes::Bytes::from_static(br#"{"error":"internal error"}"#),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
