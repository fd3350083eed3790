// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the proxy.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::ProxyError;
use crate::handler::DevicesHandler;

/// `GET /devices`: relay the upstream device list.
///
/// The request target must be exactly `/devices`; any query string is a 404.
pub async fn devices(State(h): State<Arc<DevicesHandler>>, uri: Uri) -> Response {
    if uri.query().is_some() {
        return ProxyError::NotFound.into_response();
    }
    h.handle().await.into_response()
}

/// Unknown path. Methods other than GET are reported as unsupported first.
pub async fn fallback(method: Method) -> Response {
    if method == Method::GET {
        ProxyError::NotFound.into_response()
    } else {
        ProxyError::NotImplemented.into_response()
    }
}

/// Non-GET request (HEAD included) to a known path.
pub async fn not_implemented() -> Response {
    ProxyError::NotImplemented.into_response()
}
