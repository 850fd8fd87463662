//! Bundle data model shared by the orchestrator and host adapters.
//!
//! A [`Bundle`] is the set of files emitted by one build pass, keyed by entry
//! id (usually the output file name). Entries are either compiled chunks
//! (always text) or assets (text or raw bytes).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

/// Payload of an asset entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Text(String),
    Binary(Vec<u8>),
}

impl From<String> for AssetSource {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for AssetSource {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<u8>> for AssetSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<&[u8]> for AssetSource {
    fn from(value: &[u8]) -> Self {
        Self::Binary(value.to_vec())
    }
}

/// Kind of an emitted file together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Compiled program code.
    Chunk { code: String },
    /// Any other emitted file.
    Asset { source: AssetSource },
}

/// One emitted output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Output path relative to the output directory
    pub file_name: String,
    pub kind: EntryKind,
}

impl BundleEntry {
    pub fn chunk(file_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            kind: EntryKind::Chunk { code: code.into() },
        }
    }

    pub fn asset(file_name: impl Into<String>, source: impl Into<AssetSource>) -> Self {
        Self {
            file_name: file_name.into(),
            kind: EntryKind::Asset {
                source: source.into(),
            },
        }
    }

    pub fn is_chunk(&self) -> bool {
        matches!(self.kind, EntryKind::Chunk { .. })
    }

    /// Text form of the payload. Binary assets are decoded as UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.kind {
            EntryKind::Chunk { code } => Cow::Borrowed(code.as_str()),
            EntryKind::Asset { source } => source_string(source),
        }
    }

    /// Replace an asset's payload with purged stylesheet text.
    ///
    /// Returns `false` (and leaves the entry untouched) for chunks.
    pub fn set_css(&mut self, css: String) -> bool {
        match &mut self.kind {
            EntryKind::Asset { source } => {
                *source = AssetSource::Text(css);
                true
            }
            EntryKind::Chunk { .. } => false,
        }
    }
}

/// All files emitted by one build, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    entries: IndexMap<String, BundleEntry>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under `id`, returning the entry it replaced.
    pub fn insert(&mut self, id: impl Into<String>, entry: BundleEntry) -> Option<BundleEntry> {
        self.entries.insert(id.into(), entry)
    }

    pub fn insert_chunk(
        &mut self,
        id: impl Into<String>,
        file_name: impl Into<String>,
        code: impl Into<String>,
    ) {
        self.insert(id, BundleEntry::chunk(file_name, code));
    }

    pub fn insert_asset(
        &mut self,
        id: impl Into<String>,
        file_name: impl Into<String>,
        source: impl Into<AssetSource>,
    ) {
        self.insert(id, BundleEntry::asset(file_name, source));
    }

    pub fn get(&self, id: &str) -> Option<&BundleEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut BundleEntry> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BundleEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, BundleEntry)> for Bundle {
    fn from_iter<T: IntoIterator<Item = (String, BundleEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Analyzer input describing where selectors may be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub extension: String,
    pub raw: String,
}

/// Analyzer input describing one stylesheet to prune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleItem {
    /// Entry id, echoed back by the analyzer as [`AnalysisResult::file`]
    pub name: String,
    pub raw: String,
}

/// Pruned stylesheet returned by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Name of the submitted style source; absent for unnamed raw sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub css: String,
}

impl AnalysisResult {
    pub fn new(file: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            css: css.into(),
        }
    }
}

/// Convert an asset payload to text.
///
/// Text is returned as-is; bytes are decoded as UTF-8, with malformed
/// sequences replaced by U+FFFD.
pub fn source_string(source: &AssetSource) -> Cow<'_, str> {
    match source {
        AssetSource::Text(text) => Cow::Borrowed(text.as_str()),
        AssetSource::Binary(bytes) => String::from_utf8_lossy(bytes),
    }
}

/// Lower-cased extension of the last path segment, without the leading dot.
///
/// Dotfiles like `.env` have no extension.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
