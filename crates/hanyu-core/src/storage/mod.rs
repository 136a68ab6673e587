//! Local persistence for the synchronized stores

mod error;
mod local;

pub use error::{StorageError, StorageResult};
pub use local::{FileCache, LocalCache};
