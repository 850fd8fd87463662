//! Registers the purge plugin on a host build configuration.
//!
//! The adapter runs before bundling starts. It never inspects the bundle; it
//! only makes sure a [`PurgeCssPlugin`] sits at the end of the build's plugin
//! list, after everything the user already registered.

use crate::plugin::PurgeCssPlugin;
use purgecss_core::{Analyzer, ConfigError, Orchestrator, PurgeOptions};
use rolldown_plugin::__inner::SharedPluginable;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What the host is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Full production build with a bundle-generation step
    Build,
    /// Dev server / watch session
    Serve,
}

/// Ordering hint relative to the host's own plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforce {
    Pre,
    Post,
}

/// Host build configuration, as far as the adapter cares.
#[derive(Default)]
pub struct HostConfig {
    pub build: Option<BuildSection>,
}

/// The `build` section of a host configuration.
#[derive(Default)]
pub struct BuildSection {
    /// Bundler plugins, run in order
    pub plugins: Option<Vec<SharedPluginable>>,
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugins registered so far, empty when no build section exists.
    pub fn plugins(&self) -> &[SharedPluginable] {
        self.build
            .as_ref()
            .and_then(|build| build.plugins.as_deref())
            .unwrap_or_default()
    }

    /// Take the plugin list to hand to the bundler.
    pub fn into_plugins(self) -> Vec<SharedPluginable> {
        self.build
            .and_then(|build| build.plugins)
            .unwrap_or_default()
    }
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("build", &self.build)
            .finish()
    }
}

impl fmt::Debug for BuildSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSection")
            .field("plugins", &self.plugins.as_ref().map(Vec::len))
            .finish()
    }
}

/// Build-time adapter that registers [`PurgeCssPlugin`].
///
/// # Example
///
/// ```rust
/// use purgecss_core::{PassthroughAnalyzer, PurgeOptions};
/// use purgecss_plugin::{HostConfig, PurgeCssAdapter};
/// use std::sync::Arc;
///
/// let adapter = PurgeCssAdapter::new(Arc::new(PassthroughAnalyzer), Some(PurgeOptions::new()));
/// let mut config = HostConfig::new();
/// adapter.config(&mut config);
/// assert_eq!(config.plugins().len(), 1);
/// ```
#[derive(Clone)]
pub struct PurgeCssAdapter {
    analyzer: Arc<dyn Analyzer>,
    options: Arc<PurgeOptions>,
}

impl PurgeCssAdapter {
    pub fn new(analyzer: Arc<dyn Analyzer>, options: Option<PurgeOptions>) -> Self {
        Self {
            analyzer,
            options: Arc::new(options.unwrap_or_default()),
        }
    }

    /// Build the adapter from raw user options.
    ///
    /// Malformed options fail here, before anything is registered.
    pub fn from_value(
        analyzer: Arc<dyn Analyzer>,
        options: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let options = options.map(PurgeOptions::from_value).transpose()?;
        Ok(Self::new(analyzer, options))
    }

    pub fn name(&self) -> &'static str {
        "vite-plugin-purgecss"
    }

    pub fn enforce(&self) -> Enforce {
        Enforce::Post
    }

    /// Only full builds produce a final bundle to purge.
    pub fn apply(&self) -> Command {
        Command::Build
    }

    pub fn applies_to(&self, command: Command) -> bool {
        self.apply() == command
    }

    pub fn options(&self) -> &PurgeOptions {
        &self.options
    }

    /// Append a purge plugin to `config`, creating missing sections.
    ///
    /// Existing plugins and their order are kept. Each call registers a new
    /// plugin instance.
    pub fn config(&self, config: &mut HostConfig) {
        let build = config.build.get_or_insert_with(BuildSection::default);
        let plugins = build.plugins.get_or_insert_with(Vec::new);
        plugins.push(Arc::new(self.plugin()));
    }

    /// A fresh plugin sharing this adapter's analyzer and options.
    pub fn plugin(&self) -> PurgeCssPlugin {
        PurgeCssPlugin::from_orchestrator(Orchestrator::from_shared(
            Arc::clone(&self.analyzer),
            Arc::clone(&self.options),
        ))
    }
}

impl fmt::Debug for PurgeCssAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurgeCssAdapter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
