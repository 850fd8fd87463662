//! PurgeCSS analyzer backed by a JavaScript runtime subprocess.
//!
//! The request is written as JSON to the stdin of a small bridge script,
//! which calls `new PurgeCSS().purge(options)` and prints the results as a
//! JSON array of `{file, css}` objects on stdout. The `purgecss` package is
//! resolved from the project root.

use crate::error::NodeAnalyzerError;
use async_trait::async_trait;
use purgecss_core::{AnalysisResult, Analyzer, PurgeRequest};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tokio::time::{Duration, timeout};
use tracing::debug;

/// Maximum allowed size for bridge output (50 MB)
const MAX_OUTPUT_SIZE: usize = 50 * 1024 * 1024;

/// Default timeout for one purge call (60 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const BRIDGE_SCRIPT: &str = r#"(async () => {
  const chunks = [];
  for await (const chunk of process.stdin) chunks.push(chunk);
  const options = JSON.parse(Buffer.concat(chunks).toString("utf8"));
  const { PurgeCSS } = await import("__PURGECSS_MODULE__");
  const results = await new PurgeCSS().purge(options);
  process.stdout.write(JSON.stringify(results.map((r) => ({ file: r.file, css: r.css }))));
})().catch((err) => {
  process.stderr.write(String((err && err.stack) || err));
  process.exit(1);
});"#;

/// JavaScript runtimes able to host the bridge script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsRuntime {
    #[default]
    Node,
    Bun,
    Deno,
}

impl JsRuntime {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Bun => "bun",
            Self::Deno => "deno",
        }
    }

    fn binary(&self) -> &'static str {
        self.name()
    }

    /// Specifier the bridge imports PurgeCSS from
    fn module_specifier(&self) -> &'static str {
        match self {
            Self::Node | Self::Bun => "purgecss",
            Self::Deno => "npm:purgecss",
        }
    }

    /// Arguments that evaluate `script`
    fn eval_args(&self, script: String) -> Vec<String> {
        match self {
            Self::Node | Self::Bun => vec!["-e".to_string(), script],
            Self::Deno => vec!["eval".to_string(), script],
        }
    }

    fn bridge_script(&self) -> String {
        BRIDGE_SCRIPT.replace("__PURGECSS_MODULE__", self.module_specifier())
    }
}

impl std::str::FromStr for JsRuntime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "node" | "nodejs" => Ok(Self::Node),
            "bun" => Ok(Self::Bun),
            "deno" => Ok(Self::Deno),
            other => Err(format!("Unsupported JavaScript runtime: {}", other)),
        }
    }
}

/// Runs PurgeCSS through a JavaScript runtime in the project root.
#[derive(Debug, Clone)]
pub struct NodeAnalyzer {
    runtime: JsRuntime,
    /// Overrides the runtime's default binary name
    binary: Option<PathBuf>,
    project_root: PathBuf,
    timeout_secs: u64,
    /// Set once the runtime binary has been found
    verified: Arc<OnceCell<()>>,
}

impl NodeAnalyzer {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            runtime: JsRuntime::default(),
            binary: None,
            project_root: project_root.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verified: Arc::new(OnceCell::new()),
        }
    }

    pub fn with_runtime(mut self, runtime: JsRuntime) -> Self {
        self.runtime = runtime;
        self
    }

    /// Use a specific executable for the runtime (e.g. a pinned `node`).
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn runtime(&self) -> JsRuntime {
        self.runtime
    }

    fn program(&self) -> PathBuf {
        self.binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.runtime.binary()))
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.runtime.eval_args(self.runtime.bridge_script()))
            .current_dir(&self.project_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Check that the runtime binary can be started.
    pub async fn verify_runtime(&self) -> Result<(), NodeAnalyzerError> {
        self.verified
            .get_or_try_init(|| async {
                let program = self.program();
                let status = Command::new(&program)
                    .arg("--version")
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .await;

                match status {
                    Ok(status) if status.success() => Ok(()),
                    _ => Err(NodeAnalyzerError::RuntimeNotFound {
                        runtime: self.runtime.name().to_string(),
                        binary: program.display().to_string(),
                    }),
                }
            })
            .await
            .map(|_| ())
    }

    /// Run one purge call through the bridge script.
    pub async fn run(
        &self,
        request: &PurgeRequest,
    ) -> Result<Vec<AnalysisResult>, NodeAnalyzerError> {
        self.verify_runtime().await?;

        let input = serde_json::to_vec(request)
            .map_err(|source| NodeAnalyzerError::EncodeError { source })?;

        debug!(
            "[purgecss] running {} bridge ({} content, {} css, {} bytes)",
            self.runtime.name(),
            request.content.len(),
            request.css.len(),
            input.len()
        );

        let mut child = self.command().spawn().map_err(NodeAnalyzerError::spawn_failed)?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            NodeAnalyzerError::spawn_failed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Failed to capture stdin",
            ))
        })?;

        stdin
            .write_all(&input)
            .await
            .map_err(NodeAnalyzerError::spawn_failed)?;
        drop(stdin); // Close stdin to signal EOF

        let output = timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| NodeAnalyzerError::timeout(self.timeout_secs))?
        .map_err(NodeAnalyzerError::spawn_failed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let exit_code = output.status.code().unwrap_or(-1);
            return Err(NodeAnalyzerError::exit_error(exit_code, stderr));
        }

        parse_output(&output.stdout)
    }
}

#[async_trait]
impl Analyzer for NodeAnalyzer {
    async fn purge(&self, request: PurgeRequest) -> anyhow::Result<Vec<AnalysisResult>> {
        Ok(self.run(&request).await?)
    }
}

fn parse_output(stdout: &[u8]) -> Result<Vec<AnalysisResult>, NodeAnalyzerError> {
    if stdout.len() > MAX_OUTPUT_SIZE {
        return Err(NodeAnalyzerError::output_too_large(
            stdout.len(),
            MAX_OUTPUT_SIZE,
        ));
    }

    serde_json::from_slice(stdout).map_err(|source| NodeAnalyzerError::ParseError { source })
}
