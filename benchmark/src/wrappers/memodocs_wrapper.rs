// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use memodocs::{Document, DocumentDb};

use crate::{BenchStoreError, DocStore};

pub struct MemodocsWrapper {
    db: DocumentDb,
}

impl DocStore for MemodocsWrapper {
    fn open(file_path: impl AsRef<std::path::Path>) -> Result<Self, BenchStoreError>
    where
        Self: Sized,
    {
        Ok(Self {
            db: DocumentDb::open(file_path)?,
        })
    }

    fn insert(&mut self, key: &str, field: i64) -> Result<(), BenchStoreError> {
        let mut doc = Document::new();
        doc.insert("field".to_string(), field.into());
        self.db.insert(key, doc)?;
        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<Option<i64>, BenchStoreError> {
        Ok(self
            .db
            .get(key)
            .and_then(|doc| doc.get("field"))
            .and_then(|value| value.as_i64()))
    }

    fn delete(&mut self, key: &str) -> Result<(), BenchStoreError> {
        self.db.delete(key);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BenchStoreError> {
        self.db.flush()?;
        Ok(())
    }
}
