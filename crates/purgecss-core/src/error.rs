//! Error types for option loading and bundle purging

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading user options.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    /// Options did not match the expected shape
    #[error("invalid purgecss options: {message}")]
    #[diagnostic(
        code(purgecss::config::invalid_options),
        help("`content` and `css` must be lists of globs or raw sources; other keys are forwarded as-is")
    )]
    InvalidOptions { message: String },

    /// Options file could not be read or parsed
    #[error("failed to load purgecss options from {}: {message}", .path.display())]
    #[diagnostic(code(purgecss::config::load_failed))]
    Load { path: PathBuf, message: String },

    /// Options file extension is not supported
    #[error("unsupported options format: {}", .path.display())]
    #[diagnostic(
        code(purgecss::config::unsupported_format),
        help("Use a .toml or .json file")
    )]
    UnsupportedFormat { path: PathBuf },
}

impl ConfigError {
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }
}

/// Errors that abort a purge pass.
#[derive(Error, Debug, Diagnostic)]
pub enum PurgeError {
    /// Analyzer returned a result for a stylesheet that was never submitted
    #[error("purge result references unknown stylesheet '{file}'")]
    #[diagnostic(
        code(purgecss::unknown_result),
        help("The analyzer must echo back the `name` of each submitted style source")
    )]
    UnknownResult { file: String },

    /// Analyzer returned a result without a file name
    #[error("purge result has no file name but every submitted stylesheet was named")]
    #[diagnostic(code(purgecss::unnamed_result))]
    UnnamedResult,

    /// Analyzer returned more than one result for the same stylesheet
    #[error("purge returned more than one result for stylesheet '{file}'")]
    #[diagnostic(code(purgecss::duplicate_result))]
    DuplicateResult { file: String },

    /// A submitted bundle stylesheet got no result back
    #[error("purge returned no result for stylesheet '{id}'")]
    #[diagnostic(
        code(purgecss::missing_result),
        help("Unpurged CSS is never shipped; the analyzer must answer every submitted stylesheet")
    )]
    MissingResult { id: String },

    /// A stylesheet entry stopped being an asset between collection and write-back
    #[error("bundle entry '{id}' is not an asset and cannot receive purged CSS")]
    #[diagnostic(code(purgecss::not_an_asset))]
    NotAnAsset { id: String },

    /// The analyzer itself failed
    #[error(transparent)]
    #[diagnostic(code(purgecss::analyzer))]
    Analyzer(anyhow::Error),
}
