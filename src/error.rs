// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

/// Errors returned by `DocumentDb` operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Insert under `DuplicatePolicy::Reject` hit an already present key.
    DuplicateKey(String),
    /// Update of a key that is not present.
    KeyNotFound(String),
    /// Key or serialized document exceeds the configured size limits.
    RecordTooLarge(String),
    /// The backing file is not a memodocs snapshot, or is damaged.
    Corrupted(String),
    Io(String),
    Config(ConfigError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DuplicateKey(key) => write!(f, "duplicate key: {key}"),
            StoreError::KeyNotFound(key) => write!(f, "key not found: {key}"),
            StoreError::RecordTooLarge(msg) => write!(f, "record too large: {msg}"),
            StoreError::Corrupted(msg) => write!(f, "corrupted snapshot: {msg}"),
            StoreError::Io(msg) => write!(f, "io error: {msg}"),
            StoreError::Config(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        StoreError::Io(value.to_string())
    }
}

impl From<ConfigError> for StoreError {
    fn from(value: ConfigError) -> Self {
        StoreError::Config(value)
    }
}

/// Invalid `Config` parameter, reported by `Config::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    FilePath(String),
    MaxKeyLen(String),
    MaxDocumentSize(String),
    ConfigFile(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FilePath(msg)
            | ConfigError::MaxKeyLen(msg)
            | ConfigError::MaxDocumentSize(msg)
            | ConfigError::ConfigFile(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
