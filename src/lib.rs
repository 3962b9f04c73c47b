// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![doc = include_str!("../README.md")]
mod config;
mod document;
mod error;
mod snapshot;
mod store;

#[cfg(test)]
mod tests;

pub use config::{Config, DuplicatePolicy};
pub use document::Document;
pub use error::{ConfigError, StoreError};
pub use store::DocumentDb;

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        #[cfg(all(feature = "tracing", debug_assertions))]
        {
            tracing::info!($($arg)*);
        }

        #[cfg(not(all(feature = "tracing", debug_assertions)))]
        {
        }
    };
}
