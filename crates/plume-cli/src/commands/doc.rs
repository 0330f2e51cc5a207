//! Document command handlers

use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::broadcast;
use uuid::Uuid;

use plume_core::{Document, ListFilter, Store, StoreEvent};

use crate::output::Output;

/// How long a one-shot command waits for background tagging to land
const TAGGING_WAIT: Duration = Duration::from_secs(2);

/// Create a new document
pub async fn create(store: &Store, content: String, tags: Vec<String>, output: &Output) -> Result<()> {
    let mut events = store.subscribe();

    let doc = store.create(&content).await;
    if !tags.is_empty() {
        store.add_tags(doc.id, &tags).await?;
    }

    // The process is short-lived, so give the background derivation a
    // chance to land before printing and exiting.
    let doc = wait_for_tagging(&mut events, doc.id)
        .await
        .unwrap_or(doc);

    output.print_document(&doc);
    Ok(())
}

/// List documents
pub async fn list(
    store: &Store,
    tag: Option<String>,
    all: bool,
    archived: bool,
    output: &Output,
) -> Result<()> {
    let active = if all {
        None
    } else if archived {
        Some(false)
    } else {
        Some(true)
    };

    let documents = store.list(&ListFilter { active, tag }).await;
    output.print_document_list(&documents);
    Ok(())
}

/// Show a single document
pub async fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_id(store, &id).await?;
    let doc = store.get(uuid).await?;
    output.print_document(&doc);
    Ok(())
}

/// Replace the content of a document's first block
pub async fn edit(store: &Store, id: String, content: String, output: &Output) -> Result<()> {
    let uuid = resolve_id(store, &id).await?;
    let mut events = store.subscribe();

    let doc = store.get(uuid).await?;
    let first_block = doc.blocks[0].id;
    let edited = doc.replace_block_content(first_block, content)?;
    let updated = store.update(edited).await?;

    let updated = wait_for_tagging(&mut events, updated.id)
        .await
        .unwrap_or(updated);

    output.print_document(&updated);
    Ok(())
}

/// Delete a document
pub async fn delete(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_id(store, &id).await?;
    store.delete(uuid).await;
    output.success(&format!("Deleted document: {}", &uuid.to_string()[..8]));
    Ok(())
}

/// Archive a document
pub async fn archive(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_id(store, &id).await?;
    store.archive(uuid).await?;
    output.success(&format!("Archived document: {}", &uuid.to_string()[..8]));
    Ok(())
}

/// Restore an archived document
pub async fn unarchive(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_id(store, &id).await?;
    store.unarchive(uuid).await?;
    output.success(&format!("Restored document: {}", &uuid.to_string()[..8]));
    Ok(())
}

/// Add tags to a document
pub async fn tag(store: &Store, id: String, tags: Vec<String>, output: &Output) -> Result<()> {
    if tags.is_empty() {
        bail!("No tags given");
    }
    let uuid = resolve_id(store, &id).await?;
    let doc = store.add_tags(uuid, &tags).await?;
    output.success(&format!(
        "Tags on {}: {}",
        &uuid.to_string()[..8],
        doc.tags.join(", ")
    ));
    Ok(())
}

/// Wait for the post-tagging `Saved` event for the given document
///
/// Returns `None` when the derivation does not land within the deadline;
/// tagging is best-effort and the command proceeds with what it has.
async fn wait_for_tagging(
    events: &mut broadcast::Receiver<StoreEvent>,
    id: Uuid,
) -> Option<Document> {
    let deadline = tokio::time::Instant::now() + TAGGING_WAIT;
    loop {
        let now = tokio::time::Instant::now();
        if now >= deadline {
            return None;
        }
        match tokio::time::timeout(deadline - now, events.recv()).await {
            Ok(Ok(StoreEvent::Saved(doc))) if doc.id == id && !doc.tags.is_empty() => {
                return Some(doc)
            }
            Ok(Ok(_)) => continue,
            Ok(Err(_)) | Err(_) => return None,
        }
    }
}

/// Parse a document ID (supports full UUID or prefix)
async fn resolve_id(store: &Store, id: &str) -> Result<Uuid> {
    // Try full UUID first
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    // Try prefix match
    let documents = store.list(&ListFilter::default()).await;
    let matches: Vec<_> = documents
        .iter()
        .filter(|d| d.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No document found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple documents match '{}':", id);
            for doc in &matches {
                eprintln!("  {}", doc.id);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
