//! User-facing purge options.
//!
//! Options are a free-form map forwarded verbatim to the analyzer, plus two
//! optional override collections (`content` and `css`) that pre-seed the
//! analyzer inputs ahead of the bundle-derived items.

use crate::error::ConfigError;
use crate::model::{ContentItem, StyleItem};
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Environment variable prefix merged over file-based options.
pub const ENV_PREFIX: &str = "PURGECSS_";

/// A pre-seeded content source: a glob resolved by the analyzer, or raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentSource {
    Glob(String),
    Raw(ContentItem),
}

impl From<ContentItem> for ContentSource {
    fn from(item: ContentItem) -> Self {
        Self::Raw(item)
    }
}

/// A stylesheet source: a path resolved by the analyzer, or raw CSS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleSource {
    Path(String),
    Raw {
        raw: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl From<StyleItem> for StyleSource {
    fn from(item: StyleItem) -> Self {
        Self::Raw {
            raw: item.raw,
            name: Some(item.name),
        }
    }
}

impl StyleSource {
    pub fn raw(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Raw {
            raw: raw.into(),
            name: Some(name.into()),
        }
    }

    /// The name the analyzer echoes back in its result, if any.
    pub fn result_name(&self) -> Option<&str> {
        match self {
            Self::Path(path) => Some(path.as_str()),
            Self::Raw { name, .. } => name.as_deref(),
        }
    }
}

/// Options captured when the plugin is registered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurgeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentSource>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<Vec<StyleSource>>,

    /// Everything else, forwarded to the analyzer untouched
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Working copies produced by [`PurgeOptions::split`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOptions {
    pub content: Vec<ContentSource>,
    pub css: Vec<StyleSource>,
    pub passthrough: Map<String, Value>,
}

impl PurgeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON value.
    ///
    /// ```
    /// use purgecss_core::PurgeOptions;
    /// use serde_json::json;
    ///
    /// let options = PurgeOptions::from_value(json!({
    ///     "content": ["./index.html"],
    ///     "safelist": ["keep-me"]
    /// }))
    /// .unwrap();
    /// assert_eq!(options.rest["safelist"], json!(["keep-me"]));
    /// ```
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|e| ConfigError::invalid_options(e.to_string()))
    }

    /// Load options from a `.toml` or `.json` file, with `PURGECSS_*`
    /// environment variables merged on top.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::Load {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }

        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Figment::new().merge(Toml::file(path)),
            Some("json") => Figment::new().merge(Json::file(path)),
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ConfigError::Load {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    pub fn with_content(mut self, source: impl Into<ContentSource>) -> Self {
        self.content.get_or_insert_with(Vec::new).push(source.into());
        self
    }

    pub fn with_css(mut self, source: StyleSource) -> Self {
        self.css.get_or_insert_with(Vec::new).push(source);
        self
    }

    /// Set a pass-through analyzer option.
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.rest.insert(key.into(), value);
        self
    }

    pub fn with_safelist<I, S>(self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = selectors
            .into_iter()
            .map(|s| Value::String(s.into()))
            .collect();
        self.with_option("safelist", Value::Array(list))
    }

    /// Copy the override collections and the pass-through remainder.
    ///
    /// `self` is left untouched so the same options can serve any number of
    /// builds.
    pub fn split(&self) -> SplitOptions {
        let mut passthrough = self.rest.clone();
        passthrough.remove("content");
        passthrough.remove("css");

        SplitOptions {
            content: self.content.clone().unwrap_or_default(),
            css: self.css.clone().unwrap_or_default(),
            passthrough,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_separates_overrides_from_passthrough() {
        let options = PurgeOptions::from_value(json!({
            "content": [{"extension": "html", "raw": "<p class=\"x\">"}],
            "css": [],
            "safelist": ["keep-me"],
            "variables": true
        }))
        .unwrap();

        let split = options.split();
        assert_eq!(
            split.content,
            vec![ContentSource::Raw(ContentItem {
                extension: "html".to_string(),
                raw: "<p class=\"x\">".to_string(),
            })]
        );
        assert!(split.css.is_empty());
        assert_eq!(split.passthrough["safelist"], json!(["keep-me"]));
        assert_eq!(split.passthrough["variables"], json!(true));
        assert!(!split.passthrough.contains_key("content"));
        assert!(!split.passthrough.contains_key("css"));
    }

    #[test]
    fn split_does_not_consume_options() {
        let options = PurgeOptions::new()
            .with_content(ContentSource::Glob("./src/**/*.html".to_string()))
            .with_safelist(["a"]);
        let before = options.clone();

        let first = options.split();
        let second = options.split();

        assert_eq!(first, second);
        assert_eq!(options, before);
    }

    #[test]
    fn absent_overrides_default_to_empty() {
        let split = PurgeOptions::new().split();
        assert!(split.content.is_empty());
        assert!(split.css.is_empty());
        assert!(split.passthrough.is_empty());
    }

    #[test]
    fn style_sources_parse_paths_and_raw() {
        let options = PurgeOptions::from_value(json!({
            "css": ["./vendor.css", {"raw": ".a{}", "name": "inline.css"}, {"raw": ".b{}"}]
        }))
        .unwrap();

        let css = options.css.unwrap();
        assert_eq!(css[0].result_name(), Some("./vendor.css"));
        assert_eq!(css[1].result_name(), Some("inline.css"));
        assert_eq!(css[2].result_name(), None);
    }

    #[test]
    fn malformed_options_are_rejected() {
        let err = PurgeOptions::from_value(json!({"content": "not-a-list"})).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOptions { .. }));

        let err = PurgeOptions::from_value(json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOptions { .. }));
    }
}
