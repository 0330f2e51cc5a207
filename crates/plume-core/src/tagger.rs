//! Tag derivation
//!
//! Classification labels are derived from document text behind the
//! [`TagDeriver`] capability so the current keyword matcher can be swapped
//! for a semantic classifier without touching the store.

use std::collections::BTreeSet;

/// Derives classification labels from document text
///
/// Implementations must be deterministic, pure, and perform no I/O. The
/// result is never empty.
pub trait TagDeriver: Send + Sync {
    fn derive_tags(&self, text: &str) -> BTreeSet<String>;
}

/// Tag applied when no keyword matches
pub const FALLBACK_TAG: &str = "general";

/// Fixed keyword-to-tag table for the placeholder matcher
const KEYWORD_TAGS: &[(&str, &str)] = &[
    ("meeting", "meeting"),
    ("project", "project"),
    ("urgent", "urgent"),
    ("deadline", "urgent"),
    ("budget", "finance"),
    ("invoice", "finance"),
    ("idea", "idea"),
    ("recipe", "cooking"),
    ("travel", "travel"),
    ("book", "reading"),
];

/// Placeholder keyword matcher
///
/// Lowercases the input and includes a tag whenever its keyword occurs as a
/// substring anywhere in the text. Known limitations, preserved on purpose:
/// keywords match inside unrelated words ("meetings" matches "meeting") and
/// negation is not handled ("not urgent" still yields "urgent").
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTagger;

impl TagDeriver for KeywordTagger {
    fn derive_tags(&self, text: &str) -> BTreeSet<String> {
        let normalized = text.to_lowercase();
        let mut tags: BTreeSet<String> = KEYWORD_TAGS
            .iter()
            .filter(|(keyword, _)| normalized.contains(keyword))
            .map(|(_, tag)| tag.to_string())
            .collect();
        if tags.is_empty() {
            tags.insert(FALLBACK_TAG.to_string());
        }
        tags
    }
}

/// Normalize a raw tag: lowercase, trimmed, whitespace runs collapsed to
/// single spaces
pub fn normalize_tag(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
