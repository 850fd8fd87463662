//! The unused-CSS analyzer capability.
//!
//! The orchestrator never depends on a concrete analyzer. Anything that
//! satisfies [`Analyzer`] can be injected: the PurgeCSS bridge in
//! `purgecss-plugin`, or a stub in tests.

use crate::model::AnalysisResult;
use crate::options::{ContentSource, StyleSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// One analyzer call: pass-through options plus the two input collections.
///
/// Serializes to a single flat object, `{ ...options, content, css }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurgeRequest {
    #[serde(flatten)]
    pub options: Map<String, Value>,
    pub content: Vec<ContentSource>,
    pub css: Vec<StyleSource>,
}

/// Removes unused rules from stylesheets given the content that uses them.
///
/// Implementations must return one result per submitted style source, with
/// `file` set to the source's name.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn purge(&self, request: PurgeRequest) -> anyhow::Result<Vec<AnalysisResult>>;
}

#[async_trait]
impl<A: Analyzer + ?Sized> Analyzer for Arc<A> {
    async fn purge(&self, request: PurgeRequest) -> anyhow::Result<Vec<AnalysisResult>> {
        (**self).purge(request).await
    }
}

#[async_trait]
impl<A: Analyzer + ?Sized> Analyzer for Box<A> {
    async fn purge(&self, request: PurgeRequest) -> anyhow::Result<Vec<AnalysisResult>> {
        (**self).purge(request).await
    }
}

/// Analyzer that keeps every stylesheet as-is.
///
/// Only raw style sources can be echoed back; path sources are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughAnalyzer;

#[async_trait]
impl Analyzer for PassthroughAnalyzer {
    async fn purge(&self, request: PurgeRequest) -> anyhow::Result<Vec<AnalysisResult>> {
        Ok(request
            .css
            .into_iter()
            .filter_map(|source| match source {
                StyleSource::Raw { raw, name } => Some(AnalysisResult { file: name, css: raw }),
                StyleSource::Path(_) => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentItem;
    use serde_json::json;

    #[test]
    fn request_serializes_flat() {
        let mut options = Map::new();
        options.insert("safelist".to_string(), json!(["keep-me"]));

        let request = PurgeRequest {
            options,
            content: vec![ContentSource::Raw(ContentItem {
                extension: "js".to_string(),
                raw: "el.className = 'x'".to_string(),
            })],
            css: vec![StyleSource::raw("a.css", ".x{}")],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "safelist": ["keep-me"],
                "content": [{"extension": "js", "raw": "el.className = 'x'"}],
                "css": [{"raw": ".x{}", "name": "a.css"}]
            })
        );
    }

    #[tokio::test]
    async fn passthrough_echoes_raw_sources() {
        let request = PurgeRequest {
            css: vec![
                StyleSource::raw("a.css", ".a{}"),
                StyleSource::Path("./b.css".to_string()),
            ],
            ..Default::default()
        };

        let results = PassthroughAnalyzer.purge(request).await.unwrap();
        assert_eq!(results, vec![AnalysisResult::new("a.css", ".a{}")]);
    }
}
