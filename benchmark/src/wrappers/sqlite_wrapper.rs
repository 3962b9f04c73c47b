// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use rusqlite::{params, Connection, OptionalExtension};

use crate::{BenchStoreError, DocStore};

pub struct SqliteWrapper {
    conn: Connection,
}

impl DocStore for SqliteWrapper {
    fn open(file_path: impl AsRef<std::path::Path>) -> Result<Self, BenchStoreError>
    where
        Self: Sized,
    {
        let conn = Connection::open(file_path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                key TEXT PRIMARY KEY,
                field INTEGER
            )",
        )?;
        Ok(Self { conn })
    }

    fn insert(&mut self, key: &str, field: i64) -> Result<(), BenchStoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO documents (key, field) VALUES (?1, ?2)")?;
        match stmt.execute(params![key, field]) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(BenchStoreError::DuplicateKey(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get(&mut self, key: &str) -> Result<Option<i64>, BenchStoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT field FROM documents WHERE key = ?1")?;
        Ok(stmt.query_row([key], |row| row.get(0)).optional()?)
    }

    fn delete(&mut self, key: &str) -> Result<(), BenchStoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("DELETE FROM documents WHERE key = ?1")?;
        stmt.execute([key])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BenchStoreError> {
        // The engine commits per statement, nothing is buffered on our side.
        Ok(())
    }
}
