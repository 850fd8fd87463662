//! Post-bundle purge pass.
//!
//! ```text
//! Bundle → prepare() → {content[], css[]} → Analyzer::purge → apply_results() → Bundle
//! ```
//!
//! Every entry is visited once. Chunks and non-stylesheet assets become
//! content items; stylesheet assets become style items named by their entry
//! id, and that id is how analyzer results are joined back onto the bundle.
//! Pre-seeded style sources are submitted first, so when a pre-seeded source
//! shares a name with a bundle stylesheet, the earlier results with that name
//! belong to the pre-seeded sources and the last one to the bundle entry.
//! All working state lives in [`PreparedPurge`], so one [`Orchestrator`] can
//! serve concurrent builds.

use crate::analyzer::{Analyzer, PurgeRequest};
use crate::classify::{Classification, classify};
use crate::error::PurgeError;
use crate::model::{AnalysisResult, Bundle, ContentItem, StyleItem, file_extension};
use crate::options::{ContentSource, PurgeOptions, StyleSource};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the purge pass over a bundle.
#[derive(Clone)]
pub struct Orchestrator {
    analyzer: Arc<dyn Analyzer>,
    options: Arc<PurgeOptions>,
}

/// Analyzer input for one bundle, plus what is needed to join results back.
#[derive(Debug, Clone)]
pub struct PreparedPurge {
    pub request: PurgeRequest,
    /// Ids of the bundle's stylesheet entries, in bundle order
    pub stylesheets: Vec<String>,
    /// Number of bundle entries submitted as content
    pub content_entries: usize,
    preseeded_names: HashMap<String, usize>,
    has_unnamed_preseeded: bool,
}

/// Summary of one purge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Content items submitted, including pre-seeded ones
    pub content_items: usize,
    /// Style items submitted, including pre-seeded ones
    pub style_items: usize,
    /// Ids of bundle stylesheets overwritten with analyzer output
    pub purged: Vec<String>,
    pub bytes_before: usize,
    pub bytes_after: usize,
}

impl Orchestrator {
    pub fn new(analyzer: impl Analyzer + 'static, options: Option<PurgeOptions>) -> Self {
        Self::from_shared(Arc::new(analyzer), Arc::new(options.unwrap_or_default()))
    }

    pub fn from_shared(analyzer: Arc<dyn Analyzer>, options: Arc<PurgeOptions>) -> Self {
        Self { analyzer, options }
    }

    pub fn options(&self) -> &PurgeOptions {
        &self.options
    }

    /// Split the options and classify every bundle entry.
    pub fn prepare(&self, bundle: &Bundle) -> PreparedPurge {
        let split = self.options.split();

        let mut preseeded_names: HashMap<String, usize> = HashMap::new();
        for name in split.css.iter().filter_map(StyleSource::result_name) {
            *preseeded_names.entry(name.to_string()).or_default() += 1;
        }
        let has_unnamed_preseeded = split.css.iter().any(|source| source.result_name().is_none());

        let mut content = split.content;
        let mut css = split.css;
        let mut stylesheets = Vec::new();
        let mut content_entries = 0;

        for (id, entry) in bundle.iter() {
            match classify(entry) {
                Classification::Content => {
                    let extension = file_extension(&entry.file_name);
                    debug!("[purgecss] content: {} ({})", id, extension);
                    content.push(ContentSource::Raw(ContentItem {
                        extension,
                        raw: entry.text().into_owned(),
                    }));
                    content_entries += 1;
                }
                Classification::Style => {
                    if preseeded_names.contains_key(id) {
                        debug!("[purgecss] stylesheet {} shares its name with a pre-seeded source", id);
                    } else {
                        debug!("[purgecss] stylesheet: {}", id);
                    }
                    css.push(StyleSource::from(StyleItem {
                        name: id.to_string(),
                        raw: entry.text().into_owned(),
                    }));
                    stylesheets.push(id.to_string());
                }
            }
        }

        PreparedPurge {
            request: PurgeRequest {
                options: split.passthrough,
                content,
                css,
            },
            stylesheets,
            content_entries,
            preseeded_names,
            has_unnamed_preseeded,
        }
    }

    /// Purge the bundle's stylesheets in place.
    ///
    /// Fails if the analyzer fails, returns a result that cannot be joined to
    /// a submitted stylesheet, or leaves a bundle stylesheet unanswered. On failure the bundle is left unchanged.
    pub async fn run(&self, bundle: &mut Bundle) -> Result<PurgeReport, PurgeError> {
        let prepared = self.prepare(bundle);
        let content_items = prepared.request.content.len();
        let style_items = prepared.request.css.len();

        if prepared.stylesheets.is_empty() {
            debug!("[purgecss] no stylesheets in bundle");
        }

        let PreparedPurge {
            request,
            stylesheets,
            preseeded_names,
            has_unnamed_preseeded,
            ..
        } = prepared;

        let results = self
            .analyzer
            .purge(request)
            .await
            .map_err(PurgeError::Analyzer)?;

        let lookup = StyleLookup {
            stylesheets: &stylesheets,
            preseeded_names: &preseeded_names,
            has_unnamed_preseeded,
        };
        let mut report = apply_results(bundle, &lookup, results)?;
        report.content_items = content_items;
        report.style_items = style_items;

        info!(
            "[purgecss] Purged {} stylesheet(s) ({} → {} bytes)",
            report.purged.len(),
            report.bytes_before,
            report.bytes_after
        );

        Ok(report)
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Names a result may legitimately carry.
pub struct StyleLookup<'a> {
    pub stylesheets: &'a [String],
    /// Pre-seeded style source names, with how many sources carry each
    pub preseeded_names: &'a HashMap<String, usize>,
    pub has_unnamed_preseeded: bool,
}

impl StyleLookup<'_> {
    fn preseeded_count(&self, name: &str) -> usize {
        self.preseeded_names.get(name).copied().unwrap_or(0)
    }
}

/// Write analyzer results back onto the bundle.
///
/// Results sharing a name are matched in submission order: pre-seeded
/// sources first, then the bundle stylesheet. Every bundle stylesheet must
/// receive exactly one result. All results are validated before any entry
/// is touched.
pub fn apply_results(
    bundle: &mut Bundle,
    lookup: &StyleLookup<'_>,
    results: Vec<AnalysisResult>,
) -> Result<PurgeReport, PurgeError> {
    let known: HashSet<&str> = lookup.stylesheets.iter().map(String::as_str).collect();
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut writes = Vec::with_capacity(results.len());

    for result in results {
        match result.file {
            Some(file) if known.contains(file.as_str()) => {
                let preseeded = lookup.preseeded_count(&file);
                let seen = occurrences.entry(file.clone()).or_default();
                *seen += 1;
                if *seen <= preseeded {
                    debug!("[purgecss] skipping result for pre-seeded stylesheet {}", file);
                } else if *seen == preseeded + 1 {
                    writes.push((file, result.css));
                } else {
                    return Err(PurgeError::DuplicateResult { file });
                }
            }
            Some(file) if lookup.preseeded_names.contains_key(&file) => {
                debug!("[purgecss] skipping result for pre-seeded stylesheet {}", file);
            }
            Some(file) => return Err(PurgeError::UnknownResult { file }),
            None if lookup.has_unnamed_preseeded => {
                debug!("[purgecss] skipping result for unnamed pre-seeded stylesheet");
            }
            None => return Err(PurgeError::UnnamedResult),
        }
    }

    let missing = {
        let written: HashSet<&str> = writes.iter().map(|(id, _)| id.as_str()).collect();
        lookup
            .stylesheets
            .iter()
            .find(|id| !written.contains(id.as_str()))
            .cloned()
    };
    if let Some(id) = missing {
        return Err(PurgeError::MissingResult { id });
    }

    for (id, _) in &writes {
        match bundle.get(id) {
            Some(entry) if !entry.is_chunk() => {}
            _ => return Err(PurgeError::NotAnAsset { id: id.clone() }),
        }
    }

    let mut report = PurgeReport::default();
    for (id, css) in writes {
        let Some(entry) = bundle.get_mut(&id) else {
            return Err(PurgeError::NotAnAsset { id });
        };
        report.bytes_before += entry.text().len();
        report.bytes_after += css.len();
        debug!("[purgecss] {} ({} → {} bytes)", id, entry.text().len(), css.len());
        entry.set_css(css);
        report.purged.push(id);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::PassthroughAnalyzer;
    use crate::model::{AssetSource, EntryKind};
    use async_trait::async_trait;

    struct Fixed(Vec<AnalysisResult>);

    #[async_trait]
    impl Analyzer for Fixed {
        async fn purge(&self, _request: PurgeRequest) -> anyhow::Result<Vec<AnalysisResult>> {
            Ok(self.0.clone())
        }
    }

    fn sample_bundle() -> Bundle {
        let mut bundle = Bundle::new();
        bundle.insert_asset("a.css", "a.css", ".x{color:red}.y{color:blue}");
        bundle.insert_chunk("b.js", "b.js", "document.body.className = 'x'");
        bundle.insert_asset("c.png", "c.png", vec![0x89u8, b'P', b'N', b'G']);
        bundle
    }

    #[test]
    fn prepare_partitions_every_entry_once() {
        let bundle = sample_bundle();
        let orchestrator = Orchestrator::new(PassthroughAnalyzer, None);
        let prepared = orchestrator.prepare(&bundle);

        assert_eq!(prepared.stylesheets, vec!["a.css".to_string()]);
        assert_eq!(prepared.content_entries, 2);
        assert_eq!(
            prepared.content_entries + prepared.stylesheets.len(),
            bundle.len()
        );

        let extensions: Vec<&str> = prepared
            .request
            .content
            .iter()
            .filter_map(|source| match source {
                ContentSource::Raw(item) => Some(item.extension.as_str()),
                ContentSource::Glob(_) => None,
            })
            .collect();
        assert_eq!(extensions, vec!["js", "png"]);
    }

    #[test]
    fn preseeded_sources_come_first() {
        let options = PurgeOptions::new()
            .with_content(ContentSource::Glob("./index.html".to_string()))
            .with_css(StyleSource::Path("./vendor.css".to_string()));
        let orchestrator = Orchestrator::new(PassthroughAnalyzer, Some(options));
        let prepared = orchestrator.prepare(&sample_bundle());

        assert_eq!(
            prepared.request.content[0],
            ContentSource::Glob("./index.html".to_string())
        );
        assert_eq!(
            prepared.request.css[0],
            StyleSource::Path("./vendor.css".to_string())
        );
        assert_eq!(prepared.request.css.len(), 2);
    }

    #[tokio::test]
    async fn unknown_result_fails_and_leaves_bundle_untouched() {
        let mut bundle = sample_bundle();
        let original = bundle.clone();
        let orchestrator = Orchestrator::new(
            Fixed(vec![
                AnalysisResult::new("a.css", ".x{color:red}"),
                AnalysisResult::new("missing.css", ""),
            ]),
            None,
        );

        let err = orchestrator.run(&mut bundle).await.unwrap_err();
        assert!(matches!(err, PurgeError::UnknownResult { ref file } if file == "missing.css"));
        assert_eq!(bundle, original);
    }

    #[tokio::test]
    async fn duplicate_result_fails() {
        let mut bundle = sample_bundle();
        let orchestrator = Orchestrator::new(
            Fixed(vec![
                AnalysisResult::new("a.css", ""),
                AnalysisResult::new("a.css", ".x{}"),
            ]),
            None,
        );

        let err = orchestrator.run(&mut bundle).await.unwrap_err();
        assert!(matches!(err, PurgeError::DuplicateResult { .. }));
    }

    #[tokio::test]
    async fn missing_result_fails_before_any_write() {
        let mut bundle = sample_bundle();
        bundle.insert_asset("d.css", "d.css", ".y{}.unused{}");
        let original = bundle.clone();
        let orchestrator =
            Orchestrator::new(Fixed(vec![AnalysisResult::new("a.css", ".x{}")]), None);

        let err = orchestrator.run(&mut bundle).await.unwrap_err();
        assert!(matches!(err, PurgeError::MissingResult { ref id } if id == "d.css"));
        assert_eq!(bundle, original);
    }

    #[tokio::test]
    async fn preseeded_source_sharing_a_bundle_name_is_answered_first() {
        let mut bundle = Bundle::new();
        bundle.insert_asset("style.css", "style.css", ".bundle{}.unused{}");
        let options = PurgeOptions::new().with_css(StyleSource::Path("style.css".to_string()));
        let orchestrator = Orchestrator::new(
            Fixed(vec![
                AnalysisResult::new("style.css", ".vendor{}"),
                AnalysisResult::new("style.css", ".bundle{}"),
            ]),
            Some(options),
        );

        let prepared = orchestrator.prepare(&bundle);
        assert_eq!(prepared.request.css.len(), 2);

        let report = orchestrator.run(&mut bundle).await.unwrap();
        assert_eq!(report.purged, vec!["style.css".to_string()]);
        assert_eq!(bundle.get("style.css").unwrap().text(), ".bundle{}");
    }

    #[tokio::test]
    async fn shared_name_with_extra_result_is_a_duplicate() {
        let mut bundle = Bundle::new();
        bundle.insert_asset("style.css", "style.css", ".bundle{}");
        let options = PurgeOptions::new().with_css(StyleSource::Path("style.css".to_string()));
        let orchestrator = Orchestrator::new(
            Fixed(vec![
                AnalysisResult::new("style.css", ""),
                AnalysisResult::new("style.css", ""),
                AnalysisResult::new("style.css", ""),
            ]),
            Some(options),
        );

        let err = orchestrator.run(&mut bundle).await.unwrap_err();
        assert!(matches!(err, PurgeError::DuplicateResult { ref file } if file == "style.css"));
    }

    #[tokio::test]
    async fn shared_name_answered_once_leaves_bundle_stylesheet_missing() {
        let mut bundle = Bundle::new();
        bundle.insert_asset("style.css", "style.css", ".bundle{}");
        let original = bundle.clone();
        let options = PurgeOptions::new().with_css(StyleSource::Path("style.css".to_string()));
        let orchestrator = Orchestrator::new(
            Fixed(vec![AnalysisResult::new("style.css", ".vendor{}")]),
            Some(options),
        );

        let err = orchestrator.run(&mut bundle).await.unwrap_err();
        assert!(matches!(err, PurgeError::MissingResult { .. }));
        assert_eq!(bundle, original);
    }

    #[tokio::test]
    async fn empty_css_is_kept_as_empty_text() {
        let mut bundle = sample_bundle();
        let orchestrator = Orchestrator::new(Fixed(vec![AnalysisResult::new("a.css", "")]), None);

        let report = orchestrator.run(&mut bundle).await.unwrap();
        assert_eq!(report.purged, vec!["a.css".to_string()]);
        assert_eq!(report.bytes_after, 0);
        assert_eq!(
            bundle.get("a.css").unwrap().kind,
            EntryKind::Asset {
                source: AssetSource::Text(String::new())
            }
        );
    }

    #[tokio::test]
    async fn unnamed_result_without_preseeded_css_fails() {
        let mut bundle = sample_bundle();
        let orchestrator = Orchestrator::new(
            Fixed(vec![AnalysisResult {
                file: None,
                css: String::new(),
            }]),
            None,
        );

        let err = orchestrator.run(&mut bundle).await.unwrap_err();
        assert!(matches!(err, PurgeError::UnnamedResult));
    }

    #[tokio::test]
    async fn results_for_preseeded_css_are_skipped() {
        let mut bundle = sample_bundle();
        let options = PurgeOptions::new().with_css(StyleSource::Raw {
            raw: ".z{}".to_string(),
            name: None,
        });
        let orchestrator = Orchestrator::new(PassthroughAnalyzer, Some(options));

        let report = orchestrator.run(&mut bundle).await.unwrap();
        assert_eq!(report.style_items, 2);
        assert_eq!(report.purged, vec!["a.css".to_string()]);
        assert_eq!(bundle.len(), 3);
    }

    #[tokio::test]
    async fn analyzer_errors_propagate() {
        struct Failing;

        #[async_trait]
        impl Analyzer for Failing {
            async fn purge(&self, _request: PurgeRequest) -> anyhow::Result<Vec<AnalysisResult>> {
                anyhow::bail!("purgecss exploded")
            }
        }

        let mut bundle = sample_bundle();
        let original = bundle.clone();
        let err = Orchestrator::new(Failing, None)
            .run(&mut bundle)
            .await
            .unwrap_err();

        assert!(matches!(err, PurgeError::Analyzer(_)));
        assert_eq!(err.to_string(), "purgecss exploded");
        assert_eq!(bundle, original);
    }
}
