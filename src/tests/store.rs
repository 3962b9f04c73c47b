// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::collections::HashMap;

use crate::{Document, DocumentDb, StoreError};
use proptest::{
    prelude::*,
    test_runner::{Config, TestRunner},
};
use proptest_derive::Arbitrary;

#[derive(Clone, Arbitrary, Debug)]
enum StoreOp {
    Insert(u8, i64),
    Update(u8, i64),
    Delete(u8),
    Get(u8),
    FlushReload,
}

fn doc(field: i64) -> Document {
    let mut doc = Document::new();
    doc.insert("field".to_string(), field.into());
    doc
}

// Fold the id into a small key space so ops collide on the same keys.
fn key(id: u8) -> String {
    format!("key_{}", id % 16)
}

fn store_matches_model(ops: &[StoreOp]) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.mdb");

    let mut db = DocumentDb::open(&path).unwrap();
    let mut model = HashMap::<String, Document>::new();

    for op in ops {
        match op {
            StoreOp::Insert(k, v) => {
                let k = key(*k);
                db.insert(k.clone(), doc(*v)).unwrap();
                model.insert(k, doc(*v));
            }
            StoreOp::Update(k, v) => {
                let k = key(*k);
                match db.update(&k, doc(*v)) {
                    Ok(()) => {
                        assert!(model.contains_key(&k), "phantom update target");
                        model.insert(k, doc(*v));
                    }
                    Err(StoreError::KeyNotFound(_)) => {
                        assert!(!model.contains_key(&k), "missing update target");
                    }
                    Err(e) => panic!("unexpected update error: {e}"),
                }
            }
            StoreOp::Delete(k) => {
                let k = key(*k);
                assert_eq!(db.delete(&k), model.remove(&k).is_some());
            }
            StoreOp::Get(k) => {
                let k = key(*k);
                assert_eq!(db.get(&k), model.get(&k));
            }
            StoreOp::FlushReload => {
                db.flush().unwrap();
                db = DocumentDb::open(&path).unwrap();
                assert_eq!(db.get_all(), &model);
            }
        }
    }

    assert_eq!(db.get_all(), &model);
}

#[test]
fn model_check_op_sweeps() {
    let config = Config {
        cases: 64,
        source_file: Some("src/tests/store.rs"),
        ..Config::default()
    };

    let strategy = proptest::collection::vec(any::<StoreOp>(), 0..128);

    let mut runner = TestRunner::new(config);
    runner
        .run(&strategy, |ops| {
            store_matches_model(&ops);
            Ok(())
        })
        .unwrap();
}

#[test]
fn insert_then_lookup_returns_every_payload() {
    let mut db = DocumentDb::open(":memory:").unwrap();

    let n = 100;
    for i in 0..n {
        db.insert(format!("key_{i}"), doc(i)).unwrap();
    }

    for i in 0..n {
        assert_eq!(db.get(&format!("key_{i}")), Some(&doc(i)));
    }
}

#[test]
fn insert_delete_then_lookup_misses_every_key() {
    let mut db = DocumentDb::open(":memory:").unwrap();

    let n = 100;
    for i in 0..n {
        db.insert(format!("key_{i}"), doc(i)).unwrap();
    }
    for i in 0..n {
        assert!(db.delete(&format!("key_{i}")));
    }
    for i in 0..n {
        assert_eq!(db.get(&format!("key_{i}")), None);
    }
    assert!(db.is_empty());
}

#[test]
fn three_record_scenario() {
    let mut db = DocumentDb::open(":memory:").unwrap();

    for i in 0..3 {
        db.insert(format!("key_{i}"), doc(i)).unwrap();
    }

    assert_eq!(db.get("key_1"), Some(&doc(1)));
    assert!(db.delete("key_1"));
    assert_eq!(db.get("key_1"), None);
    assert_eq!(db.get("key_0"), Some(&doc(0)));
    assert_eq!(db.get("key_2"), Some(&doc(2)));
}
