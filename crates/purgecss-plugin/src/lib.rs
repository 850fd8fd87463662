//! Rolldown plugin that removes unused CSS using PurgeCSS
//!
//! The plugin hooks `generate_bundle`, so it only runs during builds that
//! produce a final bundle, never while a dev server is serving modules.
//!
//! ## Architecture
//!
//! ```text
//! HostConfig → PurgeCssAdapter::config() → build.plugins += PurgeCssPlugin
//!                                                   ↓
//! rolldown outputs → generate_bundle() → Orchestrator → Analyzer (PurgeCSS) → outputs
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use purgecss_core::PurgeOptions;
//! use purgecss_plugin::{HostConfig, NodeAnalyzer, PurgeCssAdapter};
//! use std::sync::Arc;
//!
//! let options = PurgeOptions::new().with_safelist(["keep-me"]);
//! let adapter = PurgeCssAdapter::new(Arc::new(NodeAnalyzer::new(".")), Some(options));
//!
//! let mut config = HostConfig::new();
//! adapter.config(&mut config);
//! let plugins = config.into_plugins();
//! ```
//!
//! ## Logging
//!
//! The plugin emits `tracing` events under the `purgecss_core` and
//! `purgecss_plugin` targets. With the `logging` feature a subscriber scoped
//! to those targets can be installed; `PURGECSS_LOG` overrides the level.
//!
//! ```rust,no_run
//! # #[cfg(feature = "logging")]
//! purgecss_plugin::init_logging(purgecss_plugin::LogLevel::Debug);
//! ```

mod adapter;
mod error;
mod node;
mod plugin;

pub use adapter::{BuildSection, Command, Enforce, HostConfig, PurgeCssAdapter};
pub use error::NodeAnalyzerError;
pub use node::{JsRuntime, NodeAnalyzer};
pub use plugin::{PurgeCssPlugin, bundle_from_outputs, purge_outputs};

#[cfg(feature = "logging")]
pub use purgecss_core::{LOG_ENV, LogLevel, init_logging};
