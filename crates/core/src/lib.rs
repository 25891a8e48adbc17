// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mw-core: Shared library for the mudwork provisioning daemon
//!
//! This crate provides the transaction types, the delta computation, the
//! SQLite-backed queue store and the remote API wire types used by both the
//! mudwork CLI and the mudworkd daemon.

pub mod api;
pub mod db;
pub mod delta;
pub mod entry;
pub mod error;

pub use api::{BatchOutcome, OutcomeResult, PerUserError, PerUserWarning, RequestItem};
pub use db::{Database, DEFAULT_PAGE_SIZE};
pub use delta::Delta;
pub use entry::{Kind, TransactionEntry};
pub use error::{Error, Result};
