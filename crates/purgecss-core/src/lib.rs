#![cfg_attr(docsrs, feature(doc_cfg))]

//! # purgecss-core
//!
//! Removes unused CSS from a finished bundle.
//!
//! The bundle is split into *content* (chunks and non-CSS assets, scanned for
//! selector usage) and *styles* (CSS assets, pruned). Both are handed to an
//! [`Analyzer`] in one call, and each pruned stylesheet is written back onto
//! the asset it came from.
//!
//! ```no_run
//! use purgecss_core::{Bundle, Orchestrator, PassthroughAnalyzer, PurgeOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut bundle = Bundle::new();
//! bundle.insert_chunk("index.js", "index.js", "el.className = 'btn'");
//! bundle.insert_asset("index.css", "index.css", ".btn{} .unused{}");
//!
//! let options = PurgeOptions::new().with_safelist(["keep-me"]);
//! let report = Orchestrator::new(PassthroughAnalyzer, Some(options))
//!     .run(&mut bundle)
//!     .await?;
//! println!("purged {:?}", report.purged);
//! # Ok(()) }
//! ```

pub mod analyzer;
pub mod classify;
pub mod error;
pub mod model;
pub mod options;
pub mod orchestrator;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

pub use analyzer::{Analyzer, PassthroughAnalyzer, PurgeRequest};
pub use classify::{Classification, STYLESHEET_PATTERN, classify, is_stylesheet};
pub use error::{ConfigError, PurgeError};
pub use model::{
    AnalysisResult, AssetSource, Bundle, BundleEntry, ContentItem, EntryKind, StyleItem,
    file_extension, source_string,
};
pub use options::{ContentSource, PurgeOptions, SplitOptions, StyleSource};
pub use orchestrator::{Orchestrator, PreparedPurge, PurgeReport, StyleLookup, apply_results};

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LOG_ENV, LogLevel, init_logging, init_logging_from_env};
