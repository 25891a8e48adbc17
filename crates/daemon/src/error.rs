// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the provisioning daemon.
//!
//! Every error that reaches the worker is fatal: the daemon logs it and
//! exits with status 1. Transient conditions (401, 429, lookup hiccups) are
//! handled where they occur and never surface here.

use thiserror::Error;

/// Errors raised by the daemon.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote API answered with a status that ends the run.
    #[error("remote API returned HTTP {status}: {reason}")]
    Rejected { status: u16, reason: &'static str },

    /// A 429 response carried no usable `Retry-After` header.
    #[error("invalid Retry-After header: {0:?}")]
    RetryAfter(Option<String>),

    /// The configured attempt ceiling was reached.
    #[error("gave up after {attempts} requests")]
    RetryLimit { attempts: u32 },

    /// The token issuer refused or failed.
    #[error("token renewal failed: {0}")]
    Token(String),

    /// The HTTP request could not be sent or its body read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The directory lookup failed.
    #[error("attribute lookup failed: {0}")]
    Lookup(String),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Queue store or wire-format error.
    #[error(transparent)]
    Core(#[from] mw_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ldap3::LdapError> for Error {
    fn from(e: ldap3::LdapError) -> Self {
        Error::Lookup(e.to_string())
    }
}

/// Result type for daemon operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
