// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::api::ApiResponse;
use crate::builder::BuildSettings;
use crate::stats::Stats;
use crate::test_helpers::{ok, shared_db, status, MockApi, MockIssuer, MockLookup, DOMAIN, GROUP};
use crate::token::TokenProvider;
use mw_core::{Kind, TransactionEntry};
use std::sync::Arc;

fn drainer(db: &SharedDb, api: Arc<MockApi>, lookup: MockLookup, page_size: usize) -> Drainer {
    let builder = BatchBuilder::new(
        Arc::new(lookup),
        BuildSettings {
            group: GROUP.to_string(),
            domain: DOMAIN.to_string(),
            country: "US".to_string(),
        },
    );
    let tokens = Arc::new(TokenProvider::new(Box::new(MockIssuer::default())));
    let submitter = Submitter::new(api, tokens, Arc::new(Stats::default()), None);
    Drainer::new(
        db.clone(),
        builder,
        submitter,
        Reconciler::new(db.clone(), false),
        page_size,
    )
}

async fn enqueue_removes(db: &SharedDb, n: usize) {
    let db = db.lock().await;
    for i in 0..n {
        db.enqueue(&format!("user{i:03}"), Kind::Remove).unwrap();
    }
}

#[tokio::test]
async fn drain_takes_ceil_n_over_p_submissions() {
    // (entries, page size, expected submissions)
    for (n, page_size, expected) in [(20, 10, 2), (25, 10, 3), (1, 10, 1), (4, 1, 4)] {
        let db = shared_db();
        enqueue_removes(&db, n).await;
        let api = MockApi::new(vec![]);

        let report = drainer(&db, api.clone(), MockLookup::default(), page_size)
            .drain()
            .await
            .unwrap();

        assert_eq!(report.batches, expected, "n={n} page_size={page_size}");
        assert_eq!(api.sent().len(), expected);
        assert_eq!(report.applied, n);
        assert_eq!(db.lock().await.queue_len().unwrap(), 0);
    }
}

#[tokio::test]
async fn empty_queue_sends_nothing() {
    let db = shared_db();
    let api = MockApi::new(vec![]);
    let report = drainer(&db, api.clone(), MockLookup::default(), 10)
        .drain()
        .await
        .unwrap();
    assert_eq!(report, DrainReport::default());
    assert!(api.sent().is_empty());
}

#[tokio::test]
async fn page_of_unknown_users_is_skipped_not_stalled() {
    let db = shared_db();
    {
        let db = db.lock().await;
        db.enqueue("ghost1", Kind::Add).unwrap();
        db.enqueue("ghost2", Kind::Add).unwrap();
        db.enqueue("alice", Kind::Add).unwrap();
    }
    let api = MockApi::new(vec![]);

    let report = drainer(&db, api.clone(), MockLookup::with(&["alice"]), 2)
        .drain()
        .await
        .unwrap();

    assert_eq!(report.dropped, 2);
    assert_eq!(report.batches, 1);
    assert_eq!(api.sent().len(), 1);
    let db = db.lock().await;
    assert_eq!(db.queue_len().unwrap(), 0);
    assert!(db.user_exists("alice").unwrap());
}

#[tokio::test(start_paused = true)]
async fn deferred_entries_stay_queued() {
    let db = shared_db();
    db.lock().await.enqueue("alice", Kind::Add).unwrap();
    let api = MockApi::new(vec![]);

    let report = drainer(&db, api.clone(), MockLookup::with(&["alice"]).flaky("alice", 100), 10)
        .drain()
        .await
        .unwrap();

    assert_eq!(report.deferred, 1);
    assert_eq!(report.batches, 0);
    assert!(api.sent().is_empty());
    assert!(db.lock().await.exists("alice", Kind::Add).unwrap());
}

#[tokio::test(start_paused = true)]
async fn full_page_of_deferred_adds_does_not_block_later_removes() {
    let db = shared_db();
    {
        let db = db.lock().await;
        db.enqueue("add0", Kind::Add).unwrap();
        db.enqueue("add1", Kind::Add).unwrap();
        db.enqueue("carol", Kind::Remove).unwrap();
        db.insert_user("carol").unwrap();
    }
    let lookup = MockLookup::with(&["add0", "add1"])
        .flaky("add0", 100)
        .flaky("add1", 100);
    let api = MockApi::new(vec![]);

    let report = drainer(&db, api.clone(), lookup, 2).drain().await.unwrap();

    assert_eq!(report.deferred, 2);
    assert_eq!(report.batches, 1);
    assert_eq!(report.applied, 1);
    assert_eq!(api.sent().len(), 1);
    let db = db.lock().await;
    assert_eq!(
        db.list_entries().unwrap(),
        vec![TransactionEntry::add("add0"), TransactionEntry::add("add1")]
    );
    assert!(!db.user_exists("carol").unwrap());
}

#[tokio::test]
async fn fatal_submission_leaves_queue_intact() {
    let db = shared_db();
    enqueue_removes(&db, 3).await;
    let api = MockApi::new(vec![status(403)]);

    let err = drainer(&db, api, MockLookup::default(), 10)
        .drain()
        .await
        .unwrap_err();

    assert!(matches!(err, crate::error::Error::Rejected { status: 403, .. }));
    assert_eq!(db.lock().await.queue_len().unwrap(), 3);
}

#[tokio::test]
async fn partial_outcome_converges_managed_users() {
    let db = shared_db();
    {
        let db = db.lock().await;
        db.enqueue("alice", Kind::Add).unwrap();
        db.enqueue("bob", Kind::Add).unwrap();
    }
    let partial: ApiResponse = ok(
        r#"{"completed":1,"notCompleted":1,"result":"partial","errors":[{"user":"bob@example.edu","errorCode":"error.user.belongs_to_another_org"}]}"#,
    );
    let api = MockApi::new(vec![partial]);

    let report = drainer(&db, api, MockLookup::with(&["alice", "bob"]), 10)
        .drain()
        .await
        .unwrap();

    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 1);
    let db = db.lock().await;
    assert_eq!(db.list_users().unwrap(), vec!["alice".to_string()]);
    assert_eq!(db.queue_len().unwrap(), 0);
}

#[tokio::test]
async fn partial_error_on_remove_keeps_managed_user() {
    let db = shared_db();
    {
        let db = db.lock().await;
        for id in ["carol", "dave"] {
            db.insert_user(id).unwrap();
            db.enqueue(id, Kind::Remove).unwrap();
        }
    }
    let partial: ApiResponse = ok(
        r#"{"completed":1,"notCompleted":1,"result":"partial","errors":[{"user":"carol@example.edu","errorCode":"error.group.not_found"}]}"#,
    );
    let api = MockApi::new(vec![partial]);

    let report = drainer(&db, api, MockLookup::default(), 10)
        .drain()
        .await
        .unwrap();

    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 1);
    let db = db.lock().await;
    assert_eq!(db.list_users().unwrap(), vec!["carol".to_string()]);
    assert_eq!(db.queue_len().unwrap(), 0);
}
