// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod memodocs_wrapper;
#[cfg(feature = "sqlite")]
mod sqlite_wrapper;

pub use memodocs_wrapper::MemodocsWrapper;
#[cfg(feature = "sqlite")]
pub use sqlite_wrapper::SqliteWrapper;
