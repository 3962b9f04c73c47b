// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Read, Write},
};

use crate::{
    config::{MAX_DOCUMENT_SIZE, MAX_KEY_LEN},
    document,
    error::StoreError,
    DocumentDb,
};

const SNAPSHOT_MAGIC: &[u8; 12] = b"MEMODOCS-V0\n";

/// Snapshot layout: the magic header, then one record per document with no
/// padding. Each record is `u64` LE key length, key bytes (UTF-8), `u64` LE
/// document length, document bytes (JSON object).
impl DocumentDb {
    /// Serialize the full in-memory state to the backing file.
    ///
    /// The snapshot is written to a sibling `.tmp` file, fsynced, and renamed
    /// over the backing file, so a crash mid-flush leaves the previous
    /// snapshot intact. No-op for in-memory stores.
    pub fn flush(&self) -> Result<(), StoreError> {
        if self.config.in_memory {
            return Ok(());
        }

        let temp_path = self.config.file_path.with_extension("tmp");
        if let Err(e) = self.write_snapshot(&temp_path) {
            // Don't leave a half-written temp file behind.
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }
        std::fs::rename(&temp_path, &self.config.file_path)?;

        crate::info!(
            "flushed {} documents to {:?}",
            self.data.len(),
            self.config.file_path
        );
        Ok(())
    }

    fn write_snapshot(&self, temp_path: &std::path::Path) -> Result<(), StoreError> {
        let mut writer = BufWriter::new(File::create(temp_path)?);
        writer.write_all(SNAPSHOT_MAGIC)?;

        for (doc_id, doc) in &self.data {
            let doc_bytes = document::encode_document(doc);
            if doc_bytes.len() > self.config.max_document_size {
                return Err(StoreError::RecordTooLarge(format!(
                    "document under key {:?} serializes to {} bytes, max_document_size is {}",
                    doc_id,
                    doc_bytes.len(),
                    self.config.max_document_size
                )));
            }

            writer.write_all(&(doc_id.len() as u64).to_le_bytes())?;
            writer.write_all(doc_id.as_bytes())?;
            writer.write_all(&(doc_bytes.len() as u64).to_le_bytes())?;
            writer.write_all(&doc_bytes)?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        file.sync_all()?;
        Ok(())
    }

    /// Replace the in-memory state with the snapshot on disk.
    ///
    /// A missing backing file leaves the store empty. On a malformed file the
    /// previous in-memory state is kept and `Corrupted` is returned. No-op
    /// for in-memory stores.
    pub fn load(&mut self) -> Result<(), StoreError> {
        if self.config.in_memory {
            return Ok(());
        }

        let path = self.config.file_path.as_path();
        if !path.exists() {
            self.data.clear();
            return Ok(());
        }

        let mut reader = BufReader::new(File::open(path)?);

        let mut magic = [0u8; SNAPSHOT_MAGIC.len()];
        reader
            .read_exact(&mut magic)
            .map_err(|_| StoreError::Corrupted("missing snapshot header".to_string()))?;
        if &magic != SNAPSHOT_MAGIC {
            return Err(StoreError::Corrupted(
                "bad snapshot magic, not a memodocs file".to_string(),
            ));
        }

        let mut data = HashMap::new();
        // Clean EOF is only valid at a record boundary.
        while let Some(id_len) = read_len_prefix(&mut reader)? {
            if id_len > MAX_KEY_LEN {
                return Err(StoreError::Corrupted(format!(
                    "key length {id_len} exceeds the format limit"
                )));
            }

            let mut id_bytes = vec![0; id_len];
            read_record_bytes(&mut reader, &mut id_bytes)?;
            let doc_id = String::from_utf8(id_bytes)
                .map_err(|e| StoreError::Corrupted(format!("key is not UTF-8: {e}")))?;

            let doc_len = read_len_prefix(&mut reader)?
                .ok_or_else(|| StoreError::Corrupted("truncated record".to_string()))?;
            if doc_len > MAX_DOCUMENT_SIZE {
                return Err(StoreError::Corrupted(format!(
                    "document length {doc_len} exceeds the format limit"
                )));
            }

            let mut doc_bytes = vec![0; doc_len];
            read_record_bytes(&mut reader, &mut doc_bytes)?;
            let doc = document::decode_document(&doc_bytes)?;

            data.insert(doc_id, doc);
        }

        crate::info!("loaded {} documents from {:?}", data.len(), path);
        self.data = data;
        Ok(())
    }
}

fn read_len_prefix(reader: &mut impl Read) -> Result<Option<usize>, StoreError> {
    let mut buffer = [0u8; 8];
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(None),
        8 => Ok(Some(u64::from_le_bytes(buffer) as usize)),
        // EOF in the middle of a length prefix is not a record boundary.
        _ => Err(StoreError::Corrupted(
            "truncated length prefix".to_string(),
        )),
    }
}

fn read_record_bytes(reader: &mut impl Read, buffer: &mut [u8]) -> Result<(), StoreError> {
    reader.read_exact(buffer).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            StoreError::Corrupted("truncated record".to_string())
        } else {
            e.into()
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::{error::StoreError, Document, DocumentDb};
    use std::io::Write;

    fn doc(field: i64) -> Document {
        let mut doc = Document::new();
        doc.insert("field".to_string(), field.into());
        doc
    }

    #[test]
    fn test_flush_empty_store_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mdb");

        let db = DocumentDb::open(&path).unwrap();
        db.flush().unwrap();

        let db = DocumentDb::open(&path).unwrap();
        assert_eq!(db.len(), 0);
    }

    #[test]
    fn test_flush_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.mdb");

        let mut db = DocumentDb::open(&path).unwrap();
        for i in 0..64 {
            db.insert(format!("key_{i}"), doc(i)).unwrap();
        }
        db.flush().unwrap();

        let reopened = DocumentDb::open(&path).unwrap();
        assert_eq!(reopened.get_all(), db.get_all());
    }

    #[test]
    fn test_flush_leaves_previous_snapshot_on_oversized_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("limit.mdb");

        let mut config = crate::Config::new(&path);
        config.max_document_size(32);
        let mut db = DocumentDb::with_config(config).unwrap();
        db.insert("small", doc(1)).unwrap();
        db.flush().unwrap();

        let mut big = Document::new();
        big.insert("field".to_string(), "x".repeat(64).into());
        db.insert("big", big).unwrap();
        let err = db.flush().unwrap_err();
        assert!(matches!(err, StoreError::RecordTooLarge(_)));
        assert!(!path.with_extension("tmp").exists());

        // The rename never happened, the old snapshot still loads.
        let reopened = DocumentDb::with_config({
            let mut c = crate::Config::new(&path);
            c.max_document_size(32);
            c
        })
        .unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.get("small").is_some());
    }

    #[test]
    fn test_load_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign.mdb");
        std::fs::write(&path, b"SQLite format 3\x00and then some").unwrap();

        let err = DocumentDb::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }

    #[test]
    fn test_load_rejects_truncated_length_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefix.mdb");

        let mut db = DocumentDb::open(&path).unwrap();
        db.insert("key_0", doc(0)).unwrap();
        db.flush().unwrap();

        // A partial length prefix after the last record must not pass as a
        // clean end of file.
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap();
        file.write_all(&[0x05, 0x00, 0x00, 0x00]).unwrap();
        drop(file);

        let err = DocumentDb::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }

    #[test]
    fn test_load_rejects_truncated_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trunc.mdb");

        let mut db = DocumentDb::open(&path).unwrap();
        db.insert("key_0", doc(0)).unwrap();
        db.flush().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&bytes[..bytes.len() - 3]).unwrap();
        drop(file);

        let err = DocumentDb::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }

    #[test]
    fn test_in_memory_store_never_touches_disk() {
        let mut db = DocumentDb::open(":memory:scratch").unwrap();
        db.insert("k", doc(1)).unwrap();
        db.flush().unwrap();
        assert!(!std::path::Path::new(":memory:scratch").exists());

        // load is a no-op as well, the data stays.
        db.load().unwrap();
        assert_eq!(db.len(), 1);
    }
}
