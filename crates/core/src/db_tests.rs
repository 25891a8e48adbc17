// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn seeded(entries: &[(&str, Kind)]) -> Database {
    let db = Database::open_in_memory().unwrap();
    for (id, kind) in entries {
        assert!(db.enqueue(id, *kind).unwrap());
    }
    db
}

#[test]
fn enqueue_then_exists() {
    let db = Database::open_in_memory().unwrap();
    assert!(!db.exists("alice", Kind::Add).unwrap());

    assert!(db.enqueue("alice", Kind::Add).unwrap());

    assert!(db.exists("alice", Kind::Add).unwrap());
    assert!(!db.exists("alice", Kind::Remove).unwrap());
}

#[test]
fn enqueue_twice_keeps_one_row() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.enqueue("alice", Kind::Add).unwrap());
    assert!(!db.enqueue("alice", Kind::Add).unwrap());
    assert_eq!(db.queue_len().unwrap(), 1);
}

#[test]
fn same_identifier_with_both_kinds_is_two_entries() {
    let db = seeded(&[("alice", Kind::Add), ("alice", Kind::Remove)]);
    assert_eq!(db.queue_len().unwrap(), 2);
}

#[test]
fn enqueue_after_dequeue_inserts_again() {
    let db = seeded(&[("bob", Kind::Remove)]);
    db.dequeue("bob", Kind::Remove).unwrap();
    assert!(db.enqueue("bob", Kind::Remove).unwrap());
}

#[test]
fn dequeue_is_idempotent() {
    let db = seeded(&[("carol", Kind::Add)]);
    db.dequeue("carol", Kind::Add).unwrap();
    db.dequeue("carol", Kind::Add).unwrap();
    db.dequeue("nobody", Kind::Remove).unwrap();
    assert_eq!(db.queue_len().unwrap(), 0);
}

#[test]
fn dequeue_only_touches_matching_kind() {
    let db = seeded(&[("dave", Kind::Add), ("dave", Kind::Remove)]);
    db.dequeue("dave", Kind::Add).unwrap();
    assert_eq!(db.list_entries().unwrap(), vec![TransactionEntry::remove("dave")]);
}

#[test]
fn peek_page_preserves_insertion_order() {
    let db = seeded(&[
        ("zed", Kind::Add),
        ("amy", Kind::Remove),
        ("mia", Kind::Add),
    ]);
    let page = db.peek_page(10).unwrap();
    assert_eq!(
        page,
        vec![
            TransactionEntry::add("zed"),
            TransactionEntry::remove("amy"),
            TransactionEntry::add("mia"),
        ]
    );
}

#[test]
fn peek_page_does_not_remove() {
    let db = seeded(&[("erin", Kind::Add)]);
    assert_eq!(db.peek_page(10).unwrap().len(), 1);
    assert_eq!(db.peek_page(10).unwrap().len(), 1);
}

#[parameterized(
    first_page = { 0, 10 },
    second_page = { 1, 10 },
    last_page = { 2, 8 },
    drained = { 3, 0 },
)]
fn draining_28_entries_in_pages_of_10(pages_already_drained: usize, expected: usize) {
    let db = Database::open_in_memory().unwrap();
    for i in 0..28 {
        let kind = if i % 4 == 0 { Kind::Remove } else { Kind::Add };
        db.enqueue(&format!("user{i:02}"), kind).unwrap();
    }
    for _ in 0..pages_already_drained {
        for entry in db.peek_page(DEFAULT_PAGE_SIZE).unwrap() {
            db.dequeue(&entry.identifier, entry.kind).unwrap();
        }
    }
    assert_eq!(db.peek_page(DEFAULT_PAGE_SIZE).unwrap().len(), expected);
}

#[test]
fn peek_page_at_skips_leading_entries() {
    let db = seeded(&[
        ("alice", Kind::Add),
        ("bob", Kind::Add),
        ("carol", Kind::Remove),
    ]);

    let page = db.peek_page_at(2, 10).unwrap();
    assert_eq!(page, vec![TransactionEntry::remove("carol")]);
    assert!(db.peek_page_at(3, 10).unwrap().is_empty());
    assert_eq!(db.queue_len().unwrap(), 3);
}

#[parameterized(
    unknown = { "grant" },
    upper = { "ADD" },
    capitalized = { "Remove" },
)]
fn unknown_kind_is_rejected_as_corrupted(stored: &str) {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute(
            "INSERT INTO txlog (unique_id, txtype, queued_at) VALUES ('frank', ?1, '')",
            [stored],
        )
        .unwrap();

    let err = db.peek_page(10).unwrap_err();
    assert!(matches!(err, Error::Database(_)));
    assert!(err.to_string().contains(stored));
}

#[test]
fn users_insert_list_delete() {
    let db = Database::open_in_memory().unwrap();
    db.insert_user("gina").unwrap();
    db.insert_user("alex").unwrap();
    db.insert_user("gina").unwrap();

    assert_eq!(db.list_users().unwrap(), vec!["alex", "gina"]);
    assert_eq!(db.user_count().unwrap(), 2);
    assert!(db.user_exists("gina").unwrap());

    assert!(db.delete_user("gina").unwrap());
    assert!(!db.delete_user("gina").unwrap());
    assert!(!db.user_exists("gina").unwrap());
    assert_eq!(db.user_count().unwrap(), 1);
}

#[test]
fn size_bytes_is_positive() {
    let db = seeded(&[("hank", Kind::Add)]);
    assert!(db.size_bytes().unwrap() > 0);
}

#[test]
fn queue_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("mudwork.db");

    {
        let db = Database::open(&path).unwrap();
        db.enqueue("ivy", Kind::Add).unwrap();
        db.insert_user("jack").unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.list_entries().unwrap(), vec![TransactionEntry::add("ivy")]);
    assert_eq!(db.list_users().unwrap(), vec!["jack"]);
}
