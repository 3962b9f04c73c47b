// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod bench_e2e;
mod common;
mod wrappers;

pub use common::{record_key, BenchResult, Phase, PhaseResult};

/// Uniformed interface for a document store that can be benchmarked by us.
///
/// The benchmark is single threaded; the handle is owned by one driver and
/// passed through the phases explicitly.
pub trait DocStore {
    /// Open or create the store backed by `file_path`.
    fn open(file_path: impl AsRef<std::path::Path>) -> Result<Self, BenchStoreError>
    where
        Self: Sized;

    /// Store the single-field payload under `key`. Whether a duplicate key
    /// upserts or fails with `DuplicateKey` is the store's policy.
    fn insert(&mut self, key: &str, field: i64) -> Result<(), BenchStoreError>;

    /// Fetch the payload field for `key`. An absent key is `Ok(None)`, never
    /// an error.
    fn get(&mut self, key: &str) -> Result<Option<i64>, BenchStoreError>;

    /// Remove `key`. Must succeed even when the key is absent.
    fn delete(&mut self, key: &str) -> Result<(), BenchStoreError>;

    /// Persist all state to the backing path. Stores that are durable per
    /// operation may treat this as a no-op.
    fn flush(&mut self) -> Result<(), BenchStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BenchStoreError {
    DuplicateKey(String),
    Backend(String),
}

impl std::fmt::Display for BenchStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchStoreError::DuplicateKey(key) => write!(f, "duplicate key: {key}"),
            BenchStoreError::Backend(msg) => write!(f, "store failure: {msg}"),
        }
    }
}

impl std::error::Error for BenchStoreError {}

impl From<memodocs::StoreError> for BenchStoreError {
    fn from(value: memodocs::StoreError) -> Self {
        match value {
            memodocs::StoreError::DuplicateKey(key) => BenchStoreError::DuplicateKey(key),
            other => BenchStoreError::Backend(other.to_string()),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for BenchStoreError {
    fn from(value: rusqlite::Error) -> Self {
        BenchStoreError::Backend(value.to_string())
    }
}
