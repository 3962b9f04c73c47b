// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::error::StoreError;

/// A document payload: a JSON object keyed by field name.
///
/// The store does not interpret field values; the benchmark and the original
/// workloads use single-field objects like `{"field": 42}` but any object is
/// accepted.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Canonical byte encoding of a document, used by the snapshot format.
pub(crate) fn encode_document(doc: &Document) -> Vec<u8> {
    // A Map<String, Value> always serializes: keys are strings, values are JSON.
    serde_json::to_vec(doc).expect("JSON object serialization")
}

pub(crate) fn decode_document(bytes: &[u8]) -> Result<Document, StoreError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| StoreError::Corrupted(format!("bad document payload: {e}")))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::Corrupted(format!(
            "document payload is not an object: {other}"
        ))),
    }
}
