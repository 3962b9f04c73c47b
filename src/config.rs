// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_MAX_KEY_LEN: usize = 1024;
const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Hard limits enforced regardless of configuration; the snapshot loader
/// uses them to reject absurd length prefixes before allocating.
pub(crate) const MAX_KEY_LEN: usize = 64 * 1024;
pub(crate) const MAX_DOCUMENT_SIZE: usize = 256 * 1024 * 1024;

/// What `DocumentDb::insert` does when the key is already present.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Deserialize)]
pub enum DuplicatePolicy {
    /// Overwrite the existing document.
    #[default]
    Upsert,
    /// Leave the existing document in place and fail with `DuplicateKey`.
    Reject,
}

/// Memodocs configuration for advanced usage.
/// The defaults match the behavior of the stock store; most callers only
/// ever set the file path via `Config::new`.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) file_path: PathBuf,
    pub(crate) duplicate_policy: DuplicatePolicy,
    pub(crate) max_key_len: usize,
    pub(crate) max_document_size: usize,
    pub(crate) in_memory: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_path: PathBuf::new(),
            duplicate_policy: DuplicatePolicy::default(),
            max_key_len: DEFAULT_MAX_KEY_LEN,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            in_memory: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigFile {
    pub(crate) file_path: String,
    pub(crate) duplicate_policy: DuplicatePolicy,
    pub(crate) max_key_len: usize,
    pub(crate) max_document_size: usize,
}

impl Config {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        let mut config = Self::default();
        let in_memory = file_path
            .as_ref()
            .to_str()
            .is_some_and(|p| p.starts_with(":memory:"));

        config.in_memory(in_memory).file_path(file_path);

        config
    }

    /// Constructor of Config based on a config TOML file.
    /// The config file must have all fields defined in ConfigFile.
    pub fn new_with_config_file<P: AsRef<Path>>(config_file_path: P) -> Result<Self, ConfigError> {
        let config_file_str = fs::read_to_string(config_file_path)
            .map_err(|e| ConfigError::ConfigFile(format!("couldn't read config file: {e}")))?;
        let config_file: ConfigFile = toml::from_str(&config_file_str)
            .map_err(|e| ConfigError::ConfigFile(format!("failed to parse config file: {e}")))?;

        let in_memory = config_file.file_path.starts_with(":memory:");

        Ok(Self {
            file_path: PathBuf::from(config_file.file_path),
            duplicate_policy: config_file.duplicate_policy,
            max_key_len: config_file.max_key_len,
            max_document_size: config_file.max_document_size,
            in_memory,
        })
    }

    /// Default: Upsert
    ///
    /// Upsert silently overwrites an existing document on insert.
    /// Reject keeps the existing document and returns `StoreError::DuplicateKey`.
    pub fn duplicate_policy(&mut self, policy: DuplicatePolicy) -> &mut Self {
        self.duplicate_policy = policy;
        self
    }

    /// Default: 1024
    ///
    /// Maximum key length in bytes accepted by insert/update.
    pub fn max_key_len(&mut self, max_key_len: usize) -> &mut Self {
        self.max_key_len = max_key_len;
        self
    }

    /// Default: 16 MiB
    ///
    /// Maximum serialized document size in bytes accepted by insert/update.
    pub fn max_document_size(&mut self, max_document_size: usize) -> &mut Self {
        self.max_document_size = max_document_size;
        self
    }

    /// Default: false
    ///
    /// In-memory stores never touch the disk; flush and load are no-ops.
    pub fn in_memory(&mut self, in_memory: bool) -> &mut Self {
        self.in_memory = in_memory;
        self
    }

    pub fn file_path<P: AsRef<Path>>(&mut self, file_path: P) -> &mut Self {
        self.file_path = file_path.as_ref().to_path_buf();
        self
    }

    /// Returns the current max key length
    pub fn get_max_key_len(&self) -> usize {
        self.max_key_len
    }

    /// Returns the current max serialized document size
    pub fn get_max_document_size(&self) -> usize {
        self.max_document_size
    }

    /// Validate the configuration and report any invalid parameter, if found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.in_memory && self.file_path.as_os_str().is_empty() {
            return Err(ConfigError::FilePath(
                "file_path cannot be empty for an on-disk store".to_string(),
            ));
        }

        if self.max_key_len == 0 {
            return Err(ConfigError::MaxKeyLen(
                "max_key_len cannot be zero".to_string(),
            ));
        }

        if self.max_key_len > MAX_KEY_LEN {
            return Err(ConfigError::MaxKeyLen(format!(
                "max_key_len cannot be larger than {}",
                MAX_KEY_LEN
            )));
        }

        if self.max_document_size < 2 {
            return Err(ConfigError::MaxDocumentSize(
                "max_document_size must fit at least an empty JSON object".to_string(),
            ));
        }

        if self.max_document_size > MAX_DOCUMENT_SIZE {
            return Err(ConfigError::MaxDocumentSize(format!(
                "max_document_size cannot be larger than {}",
                MAX_DOCUMENT_SIZE
            )));
        }

        Ok(())
    }
}
