// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime counters reported through the `Status` request.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use mw_core::Database;

use crate::error::Result;
use crate::SharedDb;

/// How often the sampler refreshes the store gauges.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
pub struct Stats {
    responses: Mutex<BTreeMap<u16, u64>>,
    queued: AtomicUsize,
    managed_users: AtomicUsize,
    db_size_bytes: AtomicU64,
}

impl Stats {
    /// Count one remote API response.
    pub fn record_response(&self, status: u16) {
        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        *responses.entry(status).or_default() += 1;
    }

    pub fn responses(&self) -> BTreeMap<u16, u64> {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn managed_users(&self) -> usize {
        self.managed_users.load(Ordering::Relaxed)
    }

    pub fn db_size_bytes(&self) -> u64 {
        self.db_size_bytes.load(Ordering::Relaxed)
    }

    /// Refresh the gauges from the store.
    pub async fn sample(&self, db: &SharedDb) -> Result<()> {
        self.refresh(&*db.lock().await)
    }

    /// Refresh the gauges from an already locked store.
    pub fn refresh(&self, db: &Database) -> Result<()> {
        self.queued.store(db.queue_len()?, Ordering::Relaxed);
        self.managed_users.store(db.user_count()?, Ordering::Relaxed);
        self.db_size_bytes.store(db.size_bytes()?, Ordering::Relaxed);
        Ok(())
    }
}

/// Sample the store every `interval` until the task is dropped.
pub async fn run_sampler(stats: std::sync::Arc<Stats>, db: SharedDb, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match stats.sample(&db).await {
            Ok(()) => tracing::debug!(
                queued = stats.queued(),
                managed_users = stats.managed_users(),
                db_size_bytes = stats.db_size_bytes(),
                "sampled store"
            ),
            Err(e) => tracing::warn!(error = %e, "failed to sample store"),
        }
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
