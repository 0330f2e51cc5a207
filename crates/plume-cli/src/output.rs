//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use plume_core::{Block, BlockKind, Document};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a success message (suppressed in quiet mode)
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json | OutputFormat::Quiet => {}
        }
    }

    /// Print a single document with its blocks
    pub fn print_document(&self, doc: &Document) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", doc.id);
                println!("Author:   {}", doc.author);
                println!("Created:  {}", doc.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:  {}", doc.updated_at.format("%Y-%m-%d %H:%M"));
                if !doc.tags.is_empty() {
                    println!("Tags:     {}", doc.tags.join(", "));
                }
                if !doc.active {
                    println!("Archived: yes");
                }
                println!();
                for block in &doc.blocks {
                    println!("{}", render_block(block));
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(doc).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Quiet => {
                println!("{}", doc.id);
            }
        }
    }

    /// Print a document list, one summary line per document
    pub fn print_document_list(&self, documents: &[Document]) {
        match self.format {
            OutputFormat::Human => {
                if documents.is_empty() {
                    println!("No documents found.");
                    return;
                }
                for doc in documents {
                    let short_id = &doc.id.to_string()[..8];
                    let marker = if doc.active { " " } else { "A" };
                    let preview = preview_line(doc);
                    let tags = if doc.tags.is_empty() {
                        String::new()
                    } else {
                        format!("  [{}]", doc.tags.join(", "))
                    };
                    println!(
                        "{} {}  {}  {}{}",
                        marker,
                        short_id,
                        doc.updated_at.format("%Y-%m-%d %H:%M"),
                        preview,
                        tags
                    );
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(documents).unwrap_or_else(|_| "[]".to_string())
                );
            }
            OutputFormat::Quiet => {
                for doc in documents {
                    println!("{}", doc.id);
                }
            }
        }
    }

    /// Print tags with usage counts
    pub fn print_tags(&self, tags: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags.");
                    return;
                }
                for (tag, count) in tags {
                    println!("{}  ({})", tag, count);
                }
            }
            OutputFormat::Json => {
                let entries: Vec<_> = tags
                    .iter()
                    .map(|(tag, count)| serde_json::json!({ "tag": tag, "count": count }))
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
                );
            }
            OutputFormat::Quiet => {
                for (tag, _) in tags {
                    println!("{}", tag);
                }
            }
        }
    }
}

/// Render one block the way it would read in markdown
fn render_block(block: &Block) -> String {
    match &block.kind {
        BlockKind::Heading { level } => {
            format!("{} {}", "#".repeat(*level as usize), block.content)
        }
        BlockKind::Paragraph => block.content.clone(),
        BlockKind::Todo { done } => {
            format!("[{}] {}", if *done { "x" } else { " " }, block.content)
        }
        BlockKind::Quote => format!("> {}", block.content),
    }
}

/// First non-empty block content, truncated for list display
fn preview_line(doc: &Document) -> String {
    let text = doc
        .blocks
        .iter()
        .map(|b| b.content.as_str())
        .find(|c| !c.trim().is_empty())
        .unwrap_or("(empty)");
    let line = text.lines().next().unwrap_or("(empty)");
    if line.chars().count() > 60 {
        let truncated: String = line.chars().take(57).collect();
        format!("{}...", truncated)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        // Quiet wins over json
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_render_block_variants() {
        let heading = Block::new(BlockKind::Heading { level: 2 }, "Title").unwrap();
        assert_eq!(render_block(&heading), "## Title");

        let todo = Block::new(BlockKind::Todo { done: true }, "ship it").unwrap();
        assert_eq!(render_block(&todo), "[x] ship it");

        let quote = Block::new(BlockKind::Quote, "said once").unwrap();
        assert_eq!(render_block(&quote), "> said once");

        let para = Block::paragraph("plain");
        assert_eq!(render_block(&para), "plain");
    }

    #[test]
    fn test_preview_line_truncates() {
        let long = "x".repeat(80);
        let doc = Document::new(long, "tester");
        let preview = preview_line(&doc);
        assert_eq!(preview.chars().count(), 60);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_preview_line_skips_empty_blocks() {
        let doc = Document::new("", "tester");
        assert_eq!(preview_line(&doc), "(empty)");
    }
}
