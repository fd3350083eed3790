// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the proxy.

pub mod http;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::DevicesHandler;

/// Path of the single proxied endpoint.
pub const DEVICES_PATH: &str = "/devices";

/// Build the axum `Router`: `GET /devices`, JSON 404 for every other path,
/// JSON 501 for unsupported methods.
///
/// HEAD is routed explicitly; axum would otherwise answer it with the GET
/// handler.
pub fn build_router(handler: Arc<DevicesHandler>) -> Router {
    Router::new()
        .route(
            DEVICES_PATH,
            get(http::devices).head(http::not_implemented).fallback(http::not_implemented),
        )
        .fallback(http::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}
