// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for mw-core operations.

use thiserror::Error;

/// All possible errors that can occur in mw-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid transaction kind: '{0}'\n  hint: valid kinds are: add, remove")]
    InvalidKind(String),

    #[error("invalid batch result: '{0}'\n  hint: the remote API only reports success, partial or error")]
    InvalidResult(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for mw-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
