// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{
    collections::{hash_map::Entry, HashMap},
    path::Path,
};

use crate::{
    config::{Config, DuplicatePolicy},
    error::StoreError,
    Document,
};

/// An embedded document store: string keys mapped to JSON object payloads.
///
/// All documents live in memory; `flush` serializes the full state to the
/// backing file and `load` replaces it from disk. The handle is meant to be
/// passed around explicitly and accessed by one caller at a time.
#[derive(Debug)]
pub struct DocumentDb {
    pub(crate) data: HashMap<String, Document>,
    pub(crate) config: Config,
}

impl DocumentDb {
    /// Open the store at `file_path`, loading the snapshot if one exists.
    /// A path starting with `:memory:` opens a purely in-memory store.
    pub fn open(file_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_config(Config::new(file_path))
    }

    /// Open the store described by a config TOML file.
    pub fn new_with_config_file<P: AsRef<Path>>(config_file_path: P) -> Result<Self, StoreError> {
        Self::with_config(Config::new_with_config_file(config_file_path)?)
    }

    pub fn with_config(config: Config) -> Result<Self, StoreError> {
        config.validate()?;
        let mut db = Self {
            data: HashMap::new(),
            config,
        };
        db.load()?;
        Ok(db)
    }

    /// Insert a document under `key`.
    ///
    /// With `DuplicatePolicy::Upsert` (the default) an existing document is
    /// overwritten; with `DuplicatePolicy::Reject` the existing document is
    /// kept and `StoreError::DuplicateKey` is returned.
    ///
    /// Keys longer than `max_key_len` are rejected here; the serialized
    /// document size is checked when the snapshot is written.
    pub fn insert(&mut self, key: impl Into<String>, document: Document) -> Result<(), StoreError> {
        let key = key.into();
        self.check_key(&key)?;

        match self.config.duplicate_policy {
            DuplicatePolicy::Upsert => {
                self.data.insert(key, document);
            }
            DuplicatePolicy::Reject => match self.data.entry(key) {
                Entry::Occupied(entry) => {
                    return Err(StoreError::DuplicateKey(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(document);
                }
            },
        }

        Ok(())
    }

    /// Fetch the document under `key`. An absent key is not an error.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.data.get(key)
    }

    /// Replace the document under an existing `key`.
    /// Unlike `insert`, an absent key fails with `StoreError::KeyNotFound`.
    pub fn update(&mut self, key: &str, document: Document) -> Result<(), StoreError> {
        self.check_key(key)?;

        match self.data.get_mut(key) {
            Some(slot) => {
                *slot = document;
                Ok(())
            }
            None => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    /// Remove the document under `key`, returning whether one was present.
    /// Deleting an absent key is a no-op.
    pub fn delete(&mut self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    /// All documents currently in memory.
    pub fn get_all(&self) -> &HashMap<String, Document> {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn file_path(&self) -> &Path {
        &self.config.file_path
    }

    fn check_key(&self, key: &str) -> Result<(), StoreError> {
        if key.len() > self.config.max_key_len {
            return Err(StoreError::RecordTooLarge(format!(
                "key is {} bytes, max_key_len is {}",
                key.len(),
                self.config.max_key_len
            )));
        }
        Ok(())
    }
}
