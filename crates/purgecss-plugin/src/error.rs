//! Error types for the PurgeCSS bridge process

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while running PurgeCSS in a JavaScript runtime
#[derive(Error, Debug, Diagnostic)]
pub enum NodeAnalyzerError {
    /// Runtime binary not found in PATH
    #[error("JavaScript runtime '{runtime}' binary '{binary}' not found in PATH")]
    #[diagnostic(
        code(purgecss::node::runtime_not_found),
        help("Install {runtime} or point the analyzer at another runtime")
    )]
    RuntimeNotFound { runtime: String, binary: String },

    /// Failed to spawn or talk to the bridge process
    #[error("Failed to run PurgeCSS bridge process: {source}")]
    #[diagnostic(
        code(purgecss::node::spawn_failed),
        help("Check that the runtime is installed and permissions are correct")
    )]
    SpawnFailed {
        #[source]
        source: std::io::Error,
    },

    /// Bridge exited with non-zero status
    #[error("PurgeCSS bridge exited with code {exit_code}")]
    #[diagnostic(code(purgecss::node::exit_error))]
    ExitError {
        exit_code: i32,
        #[help]
        stderr: String,
    },

    /// Output exceeded maximum allowed size
    #[error("PurgeCSS output too large: {actual_bytes} bytes (max: {max_bytes} bytes)")]
    #[diagnostic(code(purgecss::node::output_too_large))]
    OutputTooLarge {
        actual_bytes: usize,
        max_bytes: usize,
    },

    /// Request could not be encoded
    #[error("Failed to encode PurgeCSS request: {source}")]
    #[diagnostic(code(purgecss::node::encode_error))]
    EncodeError {
        #[source]
        source: serde_json::Error,
    },

    /// Output was not the expected JSON array of results
    #[error("Failed to parse PurgeCSS output: {source}")]
    #[diagnostic(
        code(purgecss::node::parse_error),
        help("Make sure the `purgecss` package is installed in the project")
    )]
    ParseError {
        #[source]
        source: serde_json::Error,
    },

    /// Bridge process timed out
    #[error("PurgeCSS timed out after {timeout_secs} seconds")]
    #[diagnostic(
        code(purgecss::node::timeout),
        help("Increase the timeout or reduce the amount of content scanned")
    )]
    Timeout { timeout_secs: u64 },
}

impl NodeAnalyzerError {
    pub fn spawn_failed(source: std::io::Error) -> Self {
        Self::SpawnFailed { source }
    }

    pub fn exit_error(exit_code: i32, stderr: String) -> Self {
        Self::ExitError { exit_code, stderr }
    }

    pub fn output_too_large(actual_bytes: usize, max_bytes: usize) -> Self {
        Self::OutputTooLarge {
            actual_bytes,
            max_bytes,
        }
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }
}
