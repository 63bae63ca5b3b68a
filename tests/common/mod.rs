//! Common test utilities for integration tests
//!
//! This module contains shared test fixtures and helper functions used across
//! integration tests. These utilities are not compiled into the library.

#![allow(dead_code)]

use anyhow::Result;
use doc_check::{SnippetConfig, ToolchainConfig};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Isolated test fixture with automatic cleanup
///
/// Creates a temporary copy of a fixture directory, allowing tests to run in
/// parallel without interfering with each other.
pub struct TestFixture {
    _root_dir: TempDir,
    root: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture from a specific source directory
    pub fn new(source: impl AsRef<Path>) -> Result<Self> {
        let root_dir = TempDir::new()?;

        copy_dir_all(source.as_ref(), root_dir.path())?;

        Ok(Self {
            root: root_dir.path().to_path_buf(),
            _root_dir: root_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The documentation source directory of the fixture
    pub fn src(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Snippet configuration pointing at the fixture and the fake toolchain
    pub fn snippet_config(&self, script: &str) -> SnippetConfig {
        SnippetConfig {
            src: self.src(),
            timeout_secs: 30,
            toolchain: fake_toolchain(script),
            ..SnippetConfig::default()
        }
    }

    /// Writes a `doc-check.toml` using the fake toolchain and returns its path
    pub fn write_config(&self, script: &str) -> Result<PathBuf> {
        let path = self.root.join("doc-check.toml");
        let text = format!(
            "[snippets]\nsrc = \"src\"\ntimeout_secs = 30\n\n[snippets.toolchain]\ncommand = \"sh\"\nargs = [\"{}\"]\n",
            fixture_path(script).display()
        );
        std::fs::write(&path, text)?;
        Ok(path)
    }

    /// Runs the `doc-check` binary with the fixture as working directory
    pub fn run_binary(&self, args: &[&str]) -> Result<Output> {
        Ok(Command::new(env!("CARGO_BIN_EXE_doc-check"))
            .args(args)
            .current_dir(&self.root)
            .env("RUST_LOG", "off")
            .output()?)
    }
}

/// Absolute path of a file under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Toolchain configuration running one of the fixture shell scripts
pub fn fake_toolchain(script: &str) -> ToolchainConfig {
    ToolchainConfig {
        command: "sh".to_string(),
        args: vec![fixture_path(script).display().to_string()],
        ..ToolchainConfig::default()
    }
}

/// Recursively copy all files and directories from src to dst
fn copy_dir_all(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    std::fs::create_dir_all(&dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        if ty.is_dir() {
            copy_dir_all(entry.path(), dst.as_ref().join(entry.file_name()))?;
        } else {
            std::fs::copy(entry.path(), dst.as_ref().join(entry.file_name()))?;
        }
    }
    Ok(())
}
