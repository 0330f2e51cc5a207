//! Document store
//!
//! The `Store` owns the canonical in-memory document collection and is the
//! only mutation path. Every read-modify-persist sequence runs under one
//! async mutex, so observers never see a half-applied mutation. Documents
//! handed out are clones; callers route changes back through the store.
//!
//! After a content-affecting `create`/`update`, tag derivation runs as a
//! fire-and-forget background task that re-enters the store through
//! `add_tags`. Deleting a document while its derivation is in flight makes
//! the eventual `add_tags` a harmless no-op.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open(Arc::new(KeywordTagger))?;
//!
//! let doc = store.create("Team meeting notes").await;
//! let all = store.list(&ListFilter::default()).await;
//! ```

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::block::ModelError;
use crate::config::Config;
use crate::document::Document;
use crate::storage::CollectionPersistence;
use crate::tagger::{normalize_tag, TagDeriver};

/// Buffered change events per subscriber
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Errors surfaced by store operations
///
/// Persistence failures never appear here: a failed save is logged and the
/// in-memory state stays authoritative; a failed load degrades to an empty
/// collection at open.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced document id is absent
    #[error("document not found: {0}")]
    NotFound(Uuid),

    /// A model invariant was violated by caller input
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Change notification emitted after every successful store operation
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The post-mutation document
    Saved(Document),
    /// A document was removed; only the id remains
    Deleted(Uuid),
}

/// Filter for [`Store::list`]
///
/// The default filter matches everything, archived documents included.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Match documents with this archival state
    pub active: Option<bool>,
    /// Match documents carrying this tag
    pub tag: Option<String>,
}

/// Document store: CRUD, versioning, persistence, and tag application
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<StoreInner>>,
    events: broadcast::Sender<StoreEvent>,
    tagger: Arc<dyn TagDeriver>,
    config: Config,
}

struct StoreInner {
    documents: Vec<Document>,
    persistence: CollectionPersistence,
    author: String,
}

impl StoreInner {
    fn position(&self, id: Uuid) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    /// Overwrite the whole collection on disk
    ///
    /// A failed save is logged; the in-memory state remains authoritative
    /// for the rest of the session.
    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.documents) {
            tracing::error!(
                error = %e,
                "failed to persist document collection; in-memory state remains authoritative"
            );
        }
    }
}

impl Store {
    /// Open the store using the default configuration
    pub fn open(tagger: Arc<dyn TagDeriver>) -> anyhow::Result<Self> {
        use anyhow::Context;
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config, tagger))
    }

    /// Open the store with a specific configuration
    ///
    /// A missing collection file starts an empty collection. An unreadable
    /// or undecodable one does too, with a warning — the caller cannot
    /// distinguish "corrupted on disk" from "never had data".
    pub fn open_with_config(config: Config, tagger: Arc<dyn TagDeriver>) -> Self {
        let author = config.author_name();
        let persistence = CollectionPersistence::new(config.clone());
        let documents = match persistence.load() {
            Ok(Some(documents)) => documents,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "failed to load document collection; starting empty"
                );
                Vec::new()
            }
        };

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                documents,
                persistence,
                author,
            })),
            events,
            tagger,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Create a document with a single paragraph holding `initial_content`
    ///
    /// Persists, emits a `Saved` event, and schedules tag derivation.
    pub async fn create(&self, initial_content: &str) -> Document {
        let doc = {
            let mut inner = self.inner.lock().await;
            let doc = Document::new(initial_content, inner.author.clone());
            inner.documents.push(doc.clone());
            inner.persist();
            doc
        };

        self.emit(StoreEvent::Saved(doc.clone()));
        self.schedule_tagging(doc.id, doc.text_content());
        doc
    }

    /// Apply a caller's copy as the new block/cursor state
    ///
    /// Last-writer-wins; store-owned fields (`created_at`, `author`,
    /// `active`, `tags`) are preserved from the stored copy. Tag derivation
    /// is re-scheduled only when the textual content changed.
    pub async fn update(&self, document: Document) -> Result<Document, StoreError> {
        let (updated, text_changed) = {
            let mut inner = self.inner.lock().await;
            let index = inner
                .position(document.id)
                .ok_or(StoreError::NotFound(document.id))?;

            let current = &inner.documents[index];
            let text_changed = current.text_content() != document.text_content();
            let updated = current.replace_contents(document.blocks, document.cursor)?;

            inner.documents[index] = updated.clone();
            inner.persist();
            (updated, text_changed)
        };

        self.emit(StoreEvent::Saved(updated.clone()));
        if text_changed {
            self.schedule_tagging(updated.id, updated.text_content());
        }
        Ok(updated)
    }

    /// Remove a document from the store and from disk
    ///
    /// Idempotent: deleting an id that is not present is a no-op, keeping
    /// the caller's delete path simple.
    pub async fn delete(&self, id: Uuid) {
        let removed = {
            let mut inner = self.inner.lock().await;
            match inner.position(id) {
                Some(index) => {
                    inner.documents.remove(index);
                    inner.persist();
                    true
                }
                None => {
                    tracing::debug!(%id, "delete of unknown document ignored");
                    false
                }
            }
        };

        if removed {
            self.emit(StoreEvent::Deleted(id));
        }
    }

    /// Archive a document (soft delete; preserved until explicit deletion)
    pub async fn archive(&self, id: Uuid) -> Result<Document, StoreError> {
        self.set_active(id, false).await
    }

    /// Bring an archived document back
    pub async fn unarchive(&self, id: Uuid) -> Result<Document, StoreError> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Document, StoreError> {
        let updated = {
            let mut inner = self.inner.lock().await;
            let index = inner.position(id).ok_or(StoreError::NotFound(id))?;
            let updated = inner.documents[index].with_active(active);
            inner.documents[index] = updated.clone();
            inner.persist();
            updated
        };

        self.emit(StoreEvent::Saved(updated.clone()));
        Ok(updated)
    }

    /// Get a document by id
    pub async fn get(&self, id: Uuid) -> Result<Document, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// List documents, most recently updated first
    pub async fn list(&self, filter: &ListFilter) -> Vec<Document> {
        let inner = self.inner.lock().await;
        let mut documents: Vec<Document> = inner
            .documents
            .iter()
            .filter(|d| filter.active.map_or(true, |active| d.active == active))
            .filter(|d| {
                filter
                    .tag
                    .as_ref()
                    .map_or(true, |tag| d.tags.iter().any(|t| t == tag))
            })
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        documents
    }

    /// Union tags into a document's tag set
    ///
    /// Input tags are normalized; duplicates are silently absorbed. When
    /// the union changes nothing, the stored document is returned untouched
    /// (no version bump, no save).
    pub async fn add_tags(&self, id: Uuid, tags: &[String]) -> Result<Document, StoreError> {
        let normalized: Vec<String> = tags
            .iter()
            .map(|t| normalize_tag(t))
            .filter(|t| !t.is_empty())
            .collect();

        let updated = {
            let mut inner = self.inner.lock().await;
            let index = inner.position(id).ok_or(StoreError::NotFound(id))?;

            let mut next = inner.documents[index].clone();
            let mut changed = false;
            for tag in normalized {
                if !next.tags.contains(&tag) {
                    next.tags.push(tag);
                    changed = true;
                }
            }
            if !changed {
                return Ok(inner.documents[index].clone());
            }

            let next = next.touched();
            inner.documents[index] = next.clone();
            inner.persist();
            next
        };

        self.emit(StoreEvent::Saved(updated.clone()));
        Ok(updated)
    }

    /// All distinct tags across active documents, sorted
    pub async fn all_tags(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        let mut tags: Vec<String> = inner
            .documents
            .iter()
            .filter(|d| d.active)
            .flat_map(|d| d.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    /// Tags with usage counts across active documents, sorted by name
    pub async fn tags_with_counts(&self) -> Vec<(String, usize)> {
        let inner = self.inner.lock().await;
        let mut counts: std::collections::BTreeMap<String, usize> = Default::default();
        for doc in inner.documents.iter().filter(|d| d.active) {
            for tag in &doc.tags {
                *counts.entry(tag.clone()).or_default() += 1;
            }
        }
        counts.into_iter().collect()
    }

    /// Number of documents in the store, archived included
    pub async fn count(&self) -> usize {
        self.inner.lock().await.documents.len()
    }

    /// Dispatch tag derivation off the caller's execution path
    ///
    /// No cancellation: if the document is deleted before the result lands,
    /// the `add_tags` re-entry hits `NotFound` and is dropped. Derivation
    /// failures never fail the originating create/update.
    fn schedule_tagging(&self, id: Uuid, text: String) {
        let store = self.clone();
        tokio::spawn(async move {
            let derived: Vec<String> = store.tagger.derive_tags(&text).into_iter().collect();
            match store.add_tags(id, &derived).await {
                Ok(_) => {}
                Err(StoreError::NotFound(_)) => {
                    tracing::debug!(%id, "document gone before tag derivation landed");
                }
                Err(e) => {
                    tracing::debug!(%id, error = %e, "dropping tag derivation result");
                }
            }
        });
    }

    /// Absent or lagging subscribers never fail an operation
    fn emit(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }
}
