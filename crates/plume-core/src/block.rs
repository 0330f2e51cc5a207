//! Block content units
//!
//! A document is an ordered sequence of typed blocks. Blocks are value
//! objects: "editing" one produces a new `Block` carrying the same `id`,
//! which the document then substitutes at the same position.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from model-level operations (blocks, documents, cursors)
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// Input is structurally inconsistent with the model
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced block id is not present in the document
    #[error("block not found: {0}")]
    BlockNotFound(Uuid),
}

/// Smallest heading level
pub const MIN_HEADING_LEVEL: u8 = 1;
/// Largest heading level
pub const MAX_HEADING_LEVEL: u8 = 6;

/// The closed set of block variants and their payloads
///
/// Adding a variant means adding its payload validation in
/// [`BlockKind::validate`]; existing variants are never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// Section heading with a level in `1..=6`
    Heading { level: u8 },
    /// Plain text paragraph
    Paragraph,
    /// Checkable to-do item
    Todo { done: bool },
    /// Block quotation
    Quote,
}

impl BlockKind {
    /// Check the variant payload for structural consistency
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            BlockKind::Heading { level } => {
                if !(MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(level) {
                    return Err(ModelError::Validation(format!(
                        "heading level {} outside {}..={}",
                        level, MIN_HEADING_LEVEL, MAX_HEADING_LEVEL
                    )));
                }
                Ok(())
            }
            BlockKind::Paragraph | BlockKind::Todo { .. } | BlockKind::Quote => Ok(()),
        }
    }
}

/// A single typed content unit within a document
///
/// The `id` is unique within the owning document and stable for the
/// block's lifetime. Position is implied by the document's block order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identifier, never reassigned
    pub id: Uuid,
    /// Variant tag plus variant-specific payload
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Text payload
    pub content: String,
}

impl Block {
    /// Create a block, validating the variant payload
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Result<Self, ModelError> {
        kind.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
        })
    }

    /// Create a block with a specific id (for loading from storage)
    pub fn with_id(id: Uuid, kind: BlockKind, content: impl Into<String>) -> Result<Self, ModelError> {
        kind.validate()?;
        Ok(Self {
            id,
            kind,
            content: content.into(),
        })
    }

    /// Create a paragraph block; paragraphs carry no payload to validate
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: BlockKind::Paragraph,
            content: content.into(),
        }
    }

    /// New block value with the same id and replaced content
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            id: self.id,
            kind: self.kind.clone(),
            content: content.into(),
        }
    }

    /// New block value with the same id and a different variant
    pub fn with_kind(&self, kind: BlockKind) -> Result<Self, ModelError> {
        kind.validate()?;
        Ok(Self {
            id: self.id,
            kind,
            content: self.content.clone(),
        })
    }

    /// Content length in characters (the unit cursor offsets use)
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_new() {
        let block = Block::paragraph("hello");
        assert_eq!(block.kind, BlockKind::Paragraph);
        assert_eq!(block.content, "hello");
    }

    #[test]
    fn test_heading_level_validated() {
        assert!(Block::new(BlockKind::Heading { level: 1 }, "Title").is_ok());
        assert!(Block::new(BlockKind::Heading { level: 6 }, "Title").is_ok());

        let err = Block::new(BlockKind::Heading { level: 0 }, "Title").unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));

        let err = Block::new(BlockKind::Heading { level: 7 }, "Title").unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));
    }

    #[test]
    fn test_with_id_keeps_given_id() {
        let id = Uuid::new_v4();
        let block = Block::with_id(id, BlockKind::Quote, "cited").unwrap();
        assert_eq!(block.id, id);
        assert!(Block::with_id(id, BlockKind::Heading { level: 0 }, "bad").is_err());
    }

    #[test]
    fn test_with_content_keeps_id() {
        let block = Block::paragraph("before");
        let edited = block.with_content("after");
        assert_eq!(edited.id, block.id);
        assert_eq!(edited.content, "after");
        assert_eq!(edited.kind, block.kind);
    }

    #[test]
    fn test_with_kind_keeps_id_and_revalidates() {
        let block = Block::paragraph("text");
        let heading = block.with_kind(BlockKind::Heading { level: 2 }).unwrap();
        assert_eq!(heading.id, block.id);
        assert_eq!(heading.content, "text");
        assert_eq!(heading.kind, BlockKind::Heading { level: 2 });

        assert!(block.with_kind(BlockKind::Heading { level: 9 }).is_err());
    }

    #[test]
    fn test_todo_and_quote_validate() {
        assert!(Block::new(BlockKind::Todo { done: false }, "buy milk").is_ok());
        assert!(Block::new(BlockKind::Quote, "said someone").is_ok());
    }

    #[test]
    fn test_content_len_counts_chars() {
        let block = Block::paragraph("héllo");
        assert_eq!(block.content_len(), 5);
    }

    #[test]
    fn test_serialization_round_trip() {
        let block = Block::new(BlockKind::Heading { level: 3 }, "Notes").unwrap();
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"heading\""));
        assert!(json.contains("\"level\":3"));

        let parsed: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn test_deserialization_ignores_unknown_fields() {
        let json = r#"{
            "id": "4a1e4e4f-9b1f-4a37-9d5a-0d5a3e3f2a10",
            "type": "paragraph",
            "content": "hi",
            "color": "red"
        }"#;
        let parsed: Block = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.content, "hi");
        assert_eq!(parsed.kind, BlockKind::Paragraph);
    }
}
