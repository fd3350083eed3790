// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream Tailscale API communication.

pub mod client;

pub use client::{DevicesApi, DevicesClient, UpstreamResponse};
