// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use memodocs::{Document, DocumentDb, StoreError};
use mimalloc::MiMalloc;
use std::{
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Arbitrary, Debug)]
enum Method {
    Insert(u8, i64),
    Update(u8, i64),
    Delete(u8),
    Get(u8),
    FlushReload,
}

// Fold the id into a small key space so ops collide on the same keys.
fn make_key(id: u8) -> String {
    format!("key_{}", id % 16)
}

fn make_doc(field: i64) -> Document {
    let mut doc = Document::new();
    doc.insert("field".to_string(), field.into());
    doc
}

// The seed bytes become the initial backing file: either they parse as a
// snapshot and the store then tracks a model through arbitrary ops and
// flush/reload cycles, or the store reports Corrupted. It must never panic.
fuzz_target!(|input: (&[u8], Vec<Method>)| {
    let (seed, methods) = input;

    let pid = std::process::id();
    let tid = {
        let mut hasher = DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);
        hasher.finish()
    };
    let tmp_file_path = std::env::temp_dir().join(format!("memodocs_fuzz_{pid}_{tid}.mdb"));
    std::fs::write(&tmp_file_path, seed).unwrap();

    let mut db = match DocumentDb::open(&tmp_file_path) {
        Ok(db) => db,
        Err(StoreError::Corrupted(_)) => {
            let _ = std::fs::remove_file(&tmp_file_path);
            return;
        }
        Err(e) => panic!("unexpected error: {e}"),
    };

    let mut model: HashMap<String, Document> = db.get_all().clone();

    for m in methods {
        match m {
            Method::Insert(k, v) => {
                let k = make_key(k);
                db.insert(k.clone(), make_doc(v)).unwrap();
                model.insert(k, make_doc(v));
            }
            Method::Update(k, v) => {
                let k = make_key(k);
                match db.update(&k, make_doc(v)) {
                    Ok(()) => {
                        assert!(model.contains_key(&k));
                        model.insert(k, make_doc(v));
                    }
                    Err(StoreError::KeyNotFound(_)) => assert!(!model.contains_key(&k)),
                    Err(e) => panic!("unexpected update error: {e}"),
                }
            }
            Method::Delete(k) => {
                let k = make_key(k);
                assert_eq!(db.delete(&k), model.remove(&k).is_some());
            }
            Method::Get(k) => {
                let k = make_key(k);
                assert_eq!(db.get(&k), model.get(&k));
            }
            Method::FlushReload => {
                db.flush().unwrap();
                db = DocumentDb::open(&tmp_file_path).unwrap();
                assert_eq!(db.get_all(), &model);
            }
        }
    }

    let _ = std::fs::remove_file(&tmp_file_path);
});
