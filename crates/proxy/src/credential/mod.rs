// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer token plumbing: the token file and the external refresh command.
//!
//! Both are owned by something else. The token file is rewritten by an
//! outside refresher; this crate only reads it and, after an upstream 401,
//! asks the refresher to run once.

pub mod refresh;
pub mod store;

pub use refresh::{CommandRefresh, RefreshTrigger};
pub use store::{FileTokenStore, TokenStore};
