// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mwd: the mudwork provisioning daemon library.
//!
//! Directory snapshots arrive over IPC and are turned into queued add and
//! remove entries. A single worker drains the queue in pages, sends each
//! page as one batch to the remote bulk API and applies the per-user
//! outcome back onto the store.

use std::sync::Arc;

pub mod api;
pub mod builder;
pub mod config;
pub mod drain;
pub mod env;
pub mod error;
pub mod lookup;
pub mod reconcile;
pub mod server;
pub mod stats;
pub mod submit;
pub mod token;
pub mod worker;

#[cfg(test)]
mod test_helpers;

pub use config::Config;
pub use error::{Error, Result};

/// The queue store shared between the IPC handlers and the worker.
pub type SharedDb = Arc<tokio::sync::Mutex<mw_core::Database>>;
