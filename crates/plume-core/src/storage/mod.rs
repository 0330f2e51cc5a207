//! Collection persistence
//!
//! The document collection is written to disk as a single JSON sequence on
//! every mutation and read back once at startup.

mod error;
mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::CollectionPersistence;
