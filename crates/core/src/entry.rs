// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending transaction types.
//!
//! A [`TransactionEntry`] is one queued change to the remote entitlement:
//! grant it to an identifier ([`Kind::Add`]) or revoke it ([`Kind::Remove`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Identifiers shorter than this are treated as malformed directory records.
pub const MIN_IDENTIFIER_LEN: usize = 2;

/// Direction of a queued entitlement change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Grant group membership, provisioning the account if needed.
    Add,
    /// Revoke group membership.
    Remove,
}

impl Kind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Add => "add",
            Kind::Remove => "remove",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(Kind::Add),
            "remove" => Ok(Kind::Remove),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

/// A pending change held in the queue store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionEntry {
    /// Directory identifier (uid) of the user.
    pub identifier: String,
    /// Whether the entitlement is being granted or revoked.
    pub kind: Kind,
}

impl TransactionEntry {
    /// Creates a new entry.
    pub fn new(identifier: impl Into<String>, kind: Kind) -> Self {
        TransactionEntry {
            identifier: identifier.into(),
            kind,
        }
    }

    /// Shorthand for an [`Kind::Add`] entry.
    pub fn add(identifier: impl Into<String>) -> Self {
        Self::new(identifier, Kind::Add)
    }

    /// Shorthand for a [`Kind::Remove`] entry.
    pub fn remove(identifier: impl Into<String>) -> Self {
        Self::new(identifier, Kind::Remove)
    }
}

impl fmt::Display for TransactionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.identifier)
    }
}

/// Returns true if the identifier is long enough to be a real directory record.
pub fn is_valid_identifier(identifier: &str) -> bool {
    identifier.chars().count() >= MIN_IDENTIFIER_LEN
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
