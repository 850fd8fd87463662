//! Rolldown `generate_bundle` hook that purges the finished bundle.

use purgecss_core::{
    Analyzer, AssetSource, Bundle, BundleEntry, EntryKind, Orchestrator, PurgeError,
    PurgeOptions, PurgeReport,
};
use rolldown_common::{Output, OutputAsset};
use rolldown_plugin::{HookGenerateBundleArgs, HookNoopReturn, HookUsage, Plugin, PluginContext};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// Rolldown plugin that removes unused CSS from emitted stylesheet assets.
///
/// Runs once per build in `generate_bundle`, after every chunk and asset has
/// been produced and before anything is written to disk. Only stylesheet
/// assets are ever modified; nothing is added to or removed from the bundle.
#[derive(Debug, Clone)]
pub struct PurgeCssPlugin {
    orchestrator: Orchestrator,
}

impl PurgeCssPlugin {
    pub fn new(analyzer: impl Analyzer + 'static, options: Option<PurgeOptions>) -> Self {
        Self {
            orchestrator: Orchestrator::new(analyzer, options),
        }
    }

    pub fn from_orchestrator(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}

impl Plugin for PurgeCssPlugin {
    fn name(&self) -> Cow<'static, str> {
        "rolldown-plugin-purgecss".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::GenerateBundle
    }

    fn generate_bundle(
        &self,
        _ctx: &PluginContext,
        args: &mut HookGenerateBundleArgs<'_>,
    ) -> impl std::future::Future<Output = HookNoopReturn> + Send {
        let orchestrator = self.orchestrator.clone();

        async move {
            let report = purge_outputs(&orchestrator, args.bundle).await?;
            debug!(
                "[purgecss] {} content item(s), {} style item(s), {} purged",
                report.content_items,
                report.style_items,
                report.purged.len()
            );
            Ok(())
        }
    }
}

/// Purge rolldown outputs in place.
///
/// Entries are keyed by output file name. Purged stylesheets replace their
/// `Output::Asset` with an asset that keeps the same names and file name.
pub async fn purge_outputs(
    orchestrator: &Orchestrator,
    outputs: &mut [Output],
) -> Result<PurgeReport, PurgeError> {
    let mut bundle = bundle_from_outputs(outputs);
    let report = orchestrator.run(&mut bundle).await?;

    for output in outputs.iter_mut() {
        let replacement = match output {
            Output::Asset(asset) if report.purged.contains(&asset.filename.to_string()) => {
                match bundle.get(&asset.filename.to_string()).map(|entry| &entry.kind) {
                    Some(EntryKind::Asset {
                        source: AssetSource::Text(css),
                    }) => Some(Output::Asset(Arc::new(OutputAsset {
                        names: asset.names.clone(),
                        original_file_names: asset.original_file_names.clone(),
                        filename: asset.filename.clone(),
                        source: css.clone().into(),
                    }))),
                    _ => None,
                }
            }
            Output::Asset(_) | Output::Chunk(_) => None,
        };

        if let Some(replacement) = replacement {
            *output = replacement;
        }
    }

    Ok(report)
}

/// Snapshot rolldown outputs as a [`Bundle`] keyed by file name.
pub fn bundle_from_outputs(outputs: &[Output]) -> Bundle {
    outputs
        .iter()
        .map(|output| match output {
            Output::Chunk(chunk) => {
                let file_name = chunk.filename.to_string();
                (
                    file_name.clone(),
                    BundleEntry::chunk(file_name, chunk.code.to_string()),
                )
            }
            Output::Asset(asset) => {
                let file_name = asset.filename.to_string();
                (
                    file_name.clone(),
                    BundleEntry::asset(file_name, asset.source.as_bytes()),
                )
            }
        })
        .collect()
}
