//! Document aggregate
//!
//! A `Document` is the unit of persistence: an ordered sequence of blocks
//! plus metadata, cursor state, and version identity. Mutating operations
//! are pure — they take `&self` and return a new `Document` value with a
//! regenerated `version` and refreshed `updated_at`. None of them touch
//! `tags`; tag mutation belongs to the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::block::{Block, ModelError};

/// Last known edit position: a block plus a character offset into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// The block holding the cursor
    pub block_id: Uuid,
    /// Character offset within that block's content
    pub offset: usize,
}

/// A persisted note document
///
/// Invariants: `blocks` is never empty; block ids are unique;
/// `cursor.block_id`, when set, references a present block;
/// `updated_at >= created_at`; `tags` holds no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Globally unique identifier, immutable for the document's lifetime
    pub id: Uuid,
    /// Regenerated on every mutation; used for change detection
    pub version: Uuid,
    /// Ordered blocks; insertion order is the rendering order
    pub blocks: Vec<Block>,
    /// Last known edit position
    #[serde(default)]
    pub cursor: Option<Cursor>,
    /// Classification labels, deduplicated, case-sensitive
    #[serde(default)]
    pub tags: Vec<String>,
    /// When this document was created
    pub created_at: DateTime<Utc>,
    /// When this document was last mutated
    pub updated_at: DateTime<Utc>,
    /// Opaque author identifier
    #[serde(default = "default_author")]
    pub author: String,
    /// Soft-delete flag; archival is distinct from deletion
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_author() -> String {
    "local".to_string()
}

fn default_active() -> bool {
    true
}

impl Document {
    /// Create a document holding exactly one paragraph block
    pub fn new(initial_content: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            version: Uuid::new_v4(),
            blocks: vec![Block::paragraph(initial_content)],
            cursor: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            author: author.into(),
            active: true,
        }
    }

    /// Look up a block by id
    pub fn block(&self, id: Uuid) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Position of a block within the document
    pub fn block_index(&self, id: Uuid) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// All block contents joined by newlines; the tagging engine's input
    pub fn text_content(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Insert a block immediately after `after`, or at the start when `None`
    ///
    /// Fails with `BlockNotFound` when `after` is absent, and with
    /// `Validation` when the new block's id already exists in the document.
    pub fn insert_block(&self, after: Option<Uuid>, block: Block) -> Result<Self, ModelError> {
        if self.block(block.id).is_some() {
            return Err(ModelError::Validation(format!(
                "duplicate block id {}",
                block.id
            )));
        }
        let index = match after {
            None => 0,
            Some(id) => self.block_index(id).ok_or(ModelError::BlockNotFound(id))? + 1,
        };

        let mut next = self.clone();
        next.blocks.insert(index, block);
        Ok(next.touched())
    }

    /// Remove a block
    ///
    /// Removing the only block replaces it with a fresh empty paragraph — a
    /// document never has zero blocks. A cursor on the removed block moves
    /// to the start of the following block, else the preceding one.
    pub fn remove_block(&self, id: Uuid) -> Result<Self, ModelError> {
        let index = self.block_index(id).ok_or(ModelError::BlockNotFound(id))?;

        let mut next = self.clone();
        next.blocks.remove(index);
        if next.blocks.is_empty() {
            next.blocks.push(Block::paragraph(""));
        }

        if let Some(cursor) = self.cursor {
            if cursor.block_id == id {
                let target = if index < next.blocks.len() {
                    &next.blocks[index]
                } else {
                    &next.blocks[next.blocks.len() - 1]
                };
                next.cursor = Some(Cursor {
                    block_id: target.id,
                    offset: 0,
                });
            }
        }

        Ok(next.touched())
    }

    /// Replace a block's content in place, preserving id and position
    pub fn replace_block_content(
        &self,
        id: Uuid,
        content: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let index = self.block_index(id).ok_or(ModelError::BlockNotFound(id))?;

        let mut next = self.clone();
        next.blocks[index] = next.blocks[index].with_content(content);
        Ok(next.touched())
    }

    /// Move a block to `new_index`, clamped to the valid range
    pub fn move_block(&self, id: Uuid, new_index: usize) -> Result<Self, ModelError> {
        let index = self.block_index(id).ok_or(ModelError::BlockNotFound(id))?;
        let new_index = new_index.min(self.blocks.len() - 1);

        let mut next = self.clone();
        let block = next.blocks.remove(index);
        next.blocks.insert(new_index, block);
        Ok(next.touched())
    }

    /// Place the cursor at a character offset within a block
    ///
    /// Fails with `Validation` when the block is absent or the offset
    /// exceeds the block's content length.
    pub fn set_cursor(&self, block_id: Uuid, offset: usize) -> Result<Self, ModelError> {
        let block = self.block(block_id).ok_or_else(|| {
            ModelError::Validation(format!("cursor references missing block {}", block_id))
        })?;
        if offset > block.content_len() {
            return Err(ModelError::Validation(format!(
                "cursor offset {} exceeds content length {}",
                offset,
                block.content_len()
            )));
        }

        let mut next = self.clone();
        next.cursor = Some(Cursor { block_id, offset });
        Ok(next.touched())
    }

    /// Unset the cursor
    pub fn clear_cursor(&self) -> Self {
        let mut next = self.clone();
        next.cursor = None;
        next.touched()
    }

    /// Apply a caller's copy as the new block/cursor state (last-writer-wins)
    ///
    /// Store-owned fields — `id`, `created_at`, `author`, `active`, `tags` —
    /// are kept from `self`. Fails with `Validation` when the incoming state
    /// breaks a document invariant (zero blocks, duplicate block ids, cursor
    /// on a missing block).
    pub fn replace_contents(
        &self,
        blocks: Vec<Block>,
        cursor: Option<Cursor>,
    ) -> Result<Self, ModelError> {
        if blocks.is_empty() {
            return Err(ModelError::Validation(
                "a document must have at least one block".to_string(),
            ));
        }
        for (i, block) in blocks.iter().enumerate() {
            if blocks[..i].iter().any(|b| b.id == block.id) {
                return Err(ModelError::Validation(format!(
                    "duplicate block id {}",
                    block.id
                )));
            }
        }
        if let Some(cursor) = cursor {
            if !blocks.iter().any(|b| b.id == cursor.block_id) {
                return Err(ModelError::Validation(format!(
                    "cursor references missing block {}",
                    cursor.block_id
                )));
            }
        }

        let mut next = self.clone();
        next.blocks = blocks;
        next.cursor = cursor;
        Ok(next.touched())
    }

    /// New value with the archival flag set
    pub fn with_active(&self, active: bool) -> Self {
        let mut next = self.clone();
        next.active = active;
        next.touched()
    }

    /// Regenerate version identity and refresh the update timestamp
    pub(crate) fn touched(mut self) -> Self {
        self.version = Uuid::new_v4();
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;

    fn doc_with_blocks(contents: &[&str]) -> Document {
        let mut doc = Document::new(contents[0], "tester");
        for content in &contents[1..] {
            let last = doc.blocks.last().unwrap().id;
            doc = doc
                .insert_block(Some(last), Block::paragraph(*content))
                .unwrap();
        }
        doc
    }

    #[test]
    fn test_new_has_single_empty_paragraph() {
        let doc = Document::new("", "tester");
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(doc.blocks[0].content, "");
        assert!(doc.cursor.is_none());
        assert!(doc.tags.is_empty());
        assert!(doc.active);
        assert!(doc.updated_at >= doc.created_at);
    }

    #[test]
    fn test_insert_block_at_start() {
        let doc = doc_with_blocks(&["b"]);
        let next = doc.insert_block(None, Block::paragraph("a")).unwrap();
        assert_eq!(next.blocks[0].content, "a");
        assert_eq!(next.blocks[1].content, "b");
        assert_ne!(next.version, doc.version);
    }

    #[test]
    fn test_insert_block_after_reference() {
        let doc = doc_with_blocks(&["a", "c"]);
        let a = doc.blocks[0].id;
        let next = doc.insert_block(Some(a), Block::paragraph("b")).unwrap();
        let contents: Vec<_> = next.blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_block_missing_reference() {
        let doc = doc_with_blocks(&["a"]);
        let missing = Uuid::new_v4();
        let err = doc
            .insert_block(Some(missing), Block::paragraph("b"))
            .unwrap_err();
        assert_eq!(err, ModelError::BlockNotFound(missing));
    }

    #[test]
    fn test_insert_block_duplicate_id() {
        let doc = doc_with_blocks(&["a"]);
        let duplicate = doc.blocks[0].clone();
        let err = doc.insert_block(None, duplicate).unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));
    }

    #[test]
    fn test_remove_block() {
        let doc = doc_with_blocks(&["a", "b"]);
        let a = doc.blocks[0].id;
        let next = doc.remove_block(a).unwrap();
        assert_eq!(next.blocks.len(), 1);
        assert_eq!(next.blocks[0].content, "b");
    }

    #[test]
    fn test_remove_last_block_leaves_empty_paragraph() {
        let doc = doc_with_blocks(&["only"]);
        let only = doc.blocks[0].id;
        let next = doc.remove_block(only).unwrap();
        assert_eq!(next.blocks.len(), 1);
        assert_eq!(next.blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(next.blocks[0].content, "");
        assert_ne!(next.blocks[0].id, only);
    }

    #[test]
    fn test_remove_block_moves_cursor_to_following() {
        let doc = doc_with_blocks(&["a", "b", "c"]);
        let b = doc.blocks[1].id;
        let c = doc.blocks[2].id;
        let doc = doc.set_cursor(b, 1).unwrap();

        let next = doc.remove_block(b).unwrap();
        let contents: Vec<_> = next.blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "c"]);
        assert_eq!(next.cursor, Some(Cursor { block_id: c, offset: 0 }));
    }

    #[test]
    fn test_remove_block_moves_cursor_to_preceding() {
        let doc = doc_with_blocks(&["a", "b"]);
        let a = doc.blocks[0].id;
        let b = doc.blocks[1].id;
        let doc = doc.set_cursor(b, 0).unwrap();

        let next = doc.remove_block(b).unwrap();
        assert_eq!(next.cursor, Some(Cursor { block_id: a, offset: 0 }));
    }

    #[test]
    fn test_remove_block_keeps_unrelated_cursor() {
        let doc = doc_with_blocks(&["a", "b"]);
        let a = doc.blocks[0].id;
        let b = doc.blocks[1].id;
        let doc = doc.set_cursor(a, 1).unwrap();

        let next = doc.remove_block(b).unwrap();
        assert_eq!(next.cursor, Some(Cursor { block_id: a, offset: 1 }));
    }

    #[test]
    fn test_replace_block_content_preserves_identity() {
        let doc = doc_with_blocks(&["before", "other"]);
        let target = doc.blocks[0].id;
        let next = doc.replace_block_content(target, "after").unwrap();
        assert_eq!(next.blocks[0].id, target);
        assert_eq!(next.blocks[0].content, "after");
        assert_eq!(next.blocks[1].content, "other");
    }

    #[test]
    fn test_move_block_clamps_index() {
        let doc = doc_with_blocks(&["a", "b", "c"]);
        let a = doc.blocks[0].id;
        let next = doc.move_block(a, 99).unwrap();
        let contents: Vec<_> = next.blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_block_to_front() {
        let doc = doc_with_blocks(&["a", "b", "c"]);
        let c = doc.blocks[2].id;
        let next = doc.move_block(c, 0).unwrap();
        let contents: Vec<_> = next.blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_set_cursor_bounds() {
        let doc = doc_with_blocks(&["abc"]);
        let block = doc.blocks[0].id;

        assert!(doc.set_cursor(block, 0).is_ok());
        assert!(doc.set_cursor(block, 3).is_ok());
        assert!(matches!(
            doc.set_cursor(block, 4),
            Err(ModelError::Validation(_))
        ));
        assert!(matches!(
            doc.set_cursor(Uuid::new_v4(), 0),
            Err(ModelError::Validation(_))
        ));
    }

    #[test]
    fn test_clear_cursor() {
        let doc = doc_with_blocks(&["abc"]);
        let block = doc.blocks[0].id;
        let doc = doc.set_cursor(block, 2).unwrap();
        let next = doc.clear_cursor();
        assert!(next.cursor.is_none());
        assert_ne!(next.version, doc.version);
    }

    #[test]
    fn test_mutations_never_touch_tags() {
        let mut doc = doc_with_blocks(&["a"]);
        doc.tags = vec!["keep".to_string()];
        let block = doc.blocks[0].id;

        let next = doc
            .insert_block(Some(block), Block::paragraph("b"))
            .unwrap()
            .replace_block_content(block, "edited")
            .unwrap()
            .remove_block(block)
            .unwrap();
        assert_eq!(next.tags, vec!["keep"]);
    }

    #[test]
    fn test_replace_contents_last_writer_wins() {
        let mut doc = doc_with_blocks(&["a"]);
        doc.tags = vec!["kept".to_string()];

        let blocks = vec![Block::paragraph("x"), Block::paragraph("y")];
        let cursor = Some(Cursor {
            block_id: blocks[1].id,
            offset: 0,
        });
        let next = doc.replace_contents(blocks, cursor).unwrap();

        assert_eq!(next.id, doc.id);
        assert_eq!(next.created_at, doc.created_at);
        assert_eq!(next.tags, vec!["kept"]);
        assert_eq!(next.blocks.len(), 2);
        assert_ne!(next.version, doc.version);
    }

    #[test]
    fn test_replace_contents_rejects_invalid_state() {
        let doc = doc_with_blocks(&["a"]);

        assert!(matches!(
            doc.replace_contents(Vec::new(), None),
            Err(ModelError::Validation(_))
        ));

        let block = Block::paragraph("x");
        assert!(matches!(
            doc.replace_contents(vec![block.clone(), block.clone()], None),
            Err(ModelError::Validation(_))
        ));

        let cursor = Some(Cursor {
            block_id: Uuid::new_v4(),
            offset: 0,
        });
        assert!(matches!(
            doc.replace_contents(vec![Block::paragraph("x")], cursor),
            Err(ModelError::Validation(_))
        ));
    }

    #[test]
    fn test_text_content_joins_blocks() {
        let doc = doc_with_blocks(&["first", "second"]);
        assert_eq!(doc.text_content(), "first\nsecond");
    }

    #[test]
    fn test_with_active_regenerates_version() {
        let doc = doc_with_blocks(&["a"]);
        let archived = doc.with_active(false);
        assert!(!archived.active);
        assert_ne!(archived.version, doc.version);
        assert!(archived.updated_at >= doc.updated_at);
    }

    #[test]
    fn test_serialization_defaults_for_missing_fields() {
        let doc = doc_with_blocks(&["a"]);
        let mut value = serde_json::to_value(&doc).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("cursor");
        obj.remove("tags");
        obj.remove("author");
        obj.remove("active");

        let parsed: Document = serde_json::from_value(value).unwrap();
        assert!(parsed.cursor.is_none());
        assert!(parsed.tags.is_empty());
        assert_eq!(parsed.author, "local");
        assert!(parsed.active);
    }
}
