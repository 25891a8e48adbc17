// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a page of queue entries into one bulk API batch.

use std::sync::Arc;
use std::time::Duration;

use mw_core::api::{FederatedId, IGNORE_IF_EXISTS};
use mw_core::{Kind, RequestItem, TransactionEntry};

use crate::error::Result;
use crate::lookup::{email_for, AttributeLookup, Person};
use crate::SharedDb;

/// Lookup attempts per entry before deferring it.
pub const LOOKUP_ATTEMPTS: u32 = 3;

/// Delay before the first lookup retry; doubles on each further retry.
pub const LOOKUP_BASE_DELAY: Duration = Duration::from_secs(1);

/// A queue entry included in a batch, with the address the request used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedEntry {
    pub entry: TransactionEntry,
    pub address: String,
}

/// Output of [`BatchBuilder::build`].
#[derive(Debug, Default)]
pub struct Batch {
    pub items: Vec<RequestItem>,
    /// Same order as `items`.
    pub approved: Vec<ApprovedEntry>,
    /// Entries removed from the queue because the directory does not know them.
    pub dropped: usize,
    /// Entries left in the queue because the directory could not be reached.
    /// After one entry exhausts its lookups, later adds in the page are
    /// deferred without a lookup.
    pub deferred: usize,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialized request body.
    pub fn body(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.items)?)
    }
}

/// Settings that shape every request item.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub group: String,
    pub domain: String,
    pub country: String,
}

pub struct BatchBuilder {
    lookup: Arc<dyn AttributeLookup>,
    settings: BuildSettings,
    attempts: u32,
    base_delay: Duration,
}

enum Resolution {
    Found(Person),
    NotFound,
    Unavailable,
}

impl BatchBuilder {
    pub fn new(lookup: Arc<dyn AttributeLookup>, settings: BuildSettings) -> Self {
        BatchBuilder {
            lookup,
            settings,
            attempts: LOOKUP_ATTEMPTS,
            base_delay: LOOKUP_BASE_DELAY,
        }
    }

    pub async fn build(&self, db: &SharedDb, page: &[TransactionEntry]) -> Result<Batch> {
        let mut batch = Batch::default();
        let mut directory_down = false;
        for entry in page {
            match entry.kind {
                Kind::Add if directory_down => {
                    tracing::debug!(user = %entry.identifier, "directory down, deferring entry");
                    batch.deferred += 1;
                }
                Kind::Add => match self.resolve(&entry.identifier).await {
                    Resolution::Found(person) => {
                        let id = FederatedId {
                            country: self.settings.country.clone(),
                            email: person.email,
                            first_name: person.first_name,
                            last_name: person.last_name,
                            option: Some(IGNORE_IF_EXISTS.to_string()),
                        };
                        let item = RequestItem::add_to_group(&id, &self.settings.group);
                        batch.approved.push(ApprovedEntry {
                            entry: entry.clone(),
                            address: item.user.clone(),
                        });
                        batch.items.push(item);
                    }
                    Resolution::NotFound => {
                        tracing::warn!(
                            user = %entry.identifier,
                            kind = %entry.kind,
                            "user not found in directory, dropping from queue"
                        );
                        db.lock().await.dequeue(&entry.identifier, entry.kind)?;
                        batch.dropped += 1;
                    }
                    Resolution::Unavailable => {
                        tracing::warn!(
                            user = %entry.identifier,
                            kind = %entry.kind,
                            "directory unavailable, deferring entry"
                        );
                        directory_down = true;
                        batch.deferred += 1;
                    }
                },
                Kind::Remove => {
                    let item = RequestItem::remove_from_group(
                        &entry.identifier,
                        &self.settings.domain,
                        &self.settings.group,
                    );
                    // Results name the user with the domain even though the
                    // request sends it separately.
                    batch.approved.push(ApprovedEntry {
                        entry: entry.clone(),
                        address: email_for(&entry.identifier, &self.settings.domain),
                    });
                    batch.items.push(item);
                }
            }
        }
        Ok(batch)
    }

    async fn resolve(&self, identifier: &str) -> Resolution {
        let mut delay = self.base_delay;
        for attempt in 1..=self.attempts {
            match self.lookup.resolve(identifier).await {
                Ok(Some(person)) => return Resolution::Found(person),
                Ok(None) => return Resolution::NotFound,
                Err(e) => {
                    tracing::warn!(user = %identifier, attempt, error = %e, "directory lookup failed");
                    if attempt < self.attempts {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }
        Resolution::Unavailable
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
