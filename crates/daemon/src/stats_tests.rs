// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::shared_db;
use mw_core::Kind;
use std::sync::Arc;

#[test]
fn responses_are_counted_per_status() {
    let stats = Stats::default();
    stats.record_response(200);
    stats.record_response(429);
    stats.record_response(429);

    let responses = stats.responses();
    assert_eq!(responses.get(&200), Some(&1));
    assert_eq!(responses.get(&429), Some(&2));
    assert_eq!(responses.get(&401), None);
}

#[tokio::test]
async fn sample_reads_store_gauges() {
    let db = shared_db();
    {
        let db = db.lock().await;
        db.enqueue("alice", Kind::Add).unwrap();
        db.enqueue("bob", Kind::Remove).unwrap();
        db.insert_user("bob").unwrap();
    }
    let stats = Stats::default();
    stats.sample(&db).await.unwrap();

    assert_eq!(stats.queued(), 2);
    assert_eq!(stats.managed_users(), 1);
    assert!(stats.db_size_bytes() > 0);
}

#[tokio::test(start_paused = true)]
async fn sampler_refreshes_on_interval() {
    let db = shared_db();
    let stats = Arc::new(Stats::default());
    let task = tokio::spawn(run_sampler(stats.clone(), db.clone(), SAMPLE_INTERVAL));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(stats.queued(), 0);

    db.lock().await.enqueue("alice", Kind::Add).unwrap();
    tokio::time::sleep(SAMPLE_INTERVAL).await;
    assert_eq!(stats.queued(), 1);

    task.abort();
}
