//! Plume Core Library
//!
//! This crate provides the core functionality for Plume, a single-user,
//! local-first note editor built on a block-based content model.
//!
//! # Architecture
//!
//! - **Block/Document model**: documents are ordered sequences of typed
//!   blocks; mutating operations are pure and value-returning, with a
//!   version identifier regenerated on every change.
//! - **Document store**: the single owner of the canonical collection;
//!   serializes all mutations, persists the whole collection as one JSON
//!   sequence, and broadcasts change events to observers.
//! - **Tagging engine**: a pluggable `TagDeriver` enriches documents with
//!   classification labels as a background task after content changes.
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open(Arc::new(KeywordTagger))?;
//!
//! // Create a document
//! let doc = store.create("Team meeting notes").await;
//!
//! // Query documents
//! let docs = store.list(&ListFilter::default()).await;
//! ```
//!
//! # Modules
//!
//! - `store`: document store (main entry point)
//! - `block`: typed content units
//! - `document`: the persisted aggregate and its pure operations
//! - `tagger`: tag derivation capability and the keyword placeholder
//! - `storage`: whole-collection JSON persistence
//! - `config`: application configuration

pub mod block;
pub mod config;
pub mod document;
pub mod storage;
pub mod store;
pub mod tagger;

pub use block::{Block, BlockKind, ModelError};
pub use config::Config;
pub use document::{Cursor, Document};
pub use storage::{CollectionPersistence, StorageError};
pub use store::{ListFilter, Store, StoreError, StoreEvent};
pub use tagger::{normalize_tag, KeywordTagger, TagDeriver};
