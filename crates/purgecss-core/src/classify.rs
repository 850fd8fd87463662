//! Content/style classification of bundle entries.

use crate::model::{BundleEntry, EntryKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `.css` and `.module.css` file names, with an optional query string.
pub const STYLESHEET_PATTERN: &str = r"(?i)^.*(\.module)?\.css(\?.*)?$";

static STYLESHEET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(STYLESHEET_PATTERN).expect("stylesheet pattern is a valid regex"));

/// Which analyzer input an entry feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Scanned for selector usage
    Content,
    /// Pruned and written back
    Style,
}

/// Returns true if `file_name` names a stylesheet.
pub fn is_stylesheet(file_name: &str) -> bool {
    STYLESHEET_RE.is_match(file_name)
}

/// Classify an entry. Chunks are always content, even when named like a
/// stylesheet.
pub fn classify(entry: &BundleEntry) -> Classification {
    match &entry.kind {
        EntryKind::Chunk { .. } => Classification::Content,
        EntryKind::Asset { .. } if is_stylesheet(&entry.file_name) => Classification::Style,
        EntryKind::Asset { .. } => Classification::Content,
    }
}
