use crate::compilation::{verify_snippets, CheckResult};
use crate::config::SnippetConfig;
use crate::document::load_documents;
use crate::language::SnippetLanguage;
use crate::project::ProjectBuilder;
use crate::staging::stage_snippets;
use crate::toolchain::Toolchain;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Transient directories owned by one run.
///
/// Both directories are removed when the context is dropped, whichever way
/// the run ends.
pub struct RunContext {
    staging: TempDir,
    build_root: TempDir,
}

impl RunContext {
    pub fn new() -> Result<Self> {
        let staging = tempfile::Builder::new()
            .prefix("doc-check-snippets")
            .tempdir()
            .context("Failed to create staging directory")?;
        let build_root = tempfile::Builder::new()
            .prefix("doc-check-build")
            .tempdir()
            .context("Failed to create build directory")?;

        log::info!("Using staging directory: {:?}", staging.path());
        log::info!("Using build directory: {:?}", build_root.path());

        Ok(Self {
            staging,
            build_root,
        })
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    pub fn build_root(&self) -> &Path {
        self.build_root.path()
    }
}

/// Outcome of a snippet run: one result per staged snippet.
pub struct SnippetRun {
    pub results: Vec<CheckResult>,
    pub duration: Duration,
}

impl SnippetRun {
    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.success())
    }

    pub fn success(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Extracts code snippets from documentation and verifies each one compiles.
///
/// # Overview
///
/// Documents under the source root are scanned for fenced blocks whose tag
/// contains the configured language marker. Every such block is written to a
/// staging directory, then placed alone in a fresh project created by the
/// toolchain's `init` and checked with its `check` subcommand. Snippets are
/// handled one at a time in document order.
///
/// # Configuration
///
/// ```toml
/// [snippets]
/// language = "flix"
///
/// [snippets.toolchain]
/// command = "java"
/// args = ["-jar", "${FLIX_JAR}"]
/// ```
pub struct SnippetChecker {
    config: SnippetConfig,
}

impl SnippetChecker {
    pub fn new(config: SnippetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SnippetConfig {
        &self.config
    }

    fn timeout(&self) -> Option<Duration> {
        match self.config.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Runs the check on a single-threaded runtime.
    pub fn run(&self) -> Result<SnippetRun> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start runtime")?;
        runtime.block_on(self.run_async())
    }

    pub async fn run_async(&self) -> Result<SnippetRun> {
        let context = RunContext::new()?;
        self.run_in(&context).await
    }

    /// Runs the check using the given transient directories.
    pub async fn run_in(&self, context: &RunContext) -> Result<SnippetRun> {
        let language = SnippetLanguage::from_config(&self.config);

        let documents = load_documents(&self.config.src, &self.config.document_extension)?;
        log::debug!("Loaded {} document(s)", documents.len());

        let snippets = stage_snippets(&documents, &language, context.staging_dir())?;
        log::info!(
            "Staged {} {} snippet(s) from {} document(s)",
            snippets.len(),
            language.name(),
            documents.len()
        );

        let toolchain = Toolchain::new(self.config.toolchain.clone(), self.timeout());
        let builder = ProjectBuilder::new(context.build_root(), &toolchain);
        let (results, duration) = verify_snippets(&snippets, &builder, &toolchain).await?;

        Ok(SnippetRun { results, duration })
    }
}
