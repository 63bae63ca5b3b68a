//! Error types for snippet verification.
//!
//! Errors fall into two groups. [`BuildError`] and [`ToolchainError::TimedOut`]
//! concern a single snippet and are turned into a failed result. Everything
//! else means the environment or the source tree is broken and ends the run.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while invoking the external toolchain.
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// The executable could not be started (missing, not executable, or the
    /// working directory is unusable)
    #[error("Failed to execute toolchain '{program}' in {}: {source}", .cwd.display())]
    Spawn {
        program: String,
        cwd: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process started but waiting on it failed
    #[error("Failed to wait for toolchain '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process did not finish within the configured bound
    #[error("Toolchain '{program}' timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
}

impl ToolchainError {
    /// Whether this error should abort the whole run rather than a single snippet.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ToolchainError::TimedOut { .. })
    }
}

/// Errors that abort the preparation of a single snippet project.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Project directory already exists: {}", .path.display())]
    DirectoryConflict { path: PathBuf },

    #[error("Toolchain init exited with status {code}:\n{output}")]
    InitFailed { code: i32, output: String },

    /// `init` did not produce the expected placeholder file, which usually
    /// means the toolchain version does not match the configuration
    #[error("Toolchain init did not create {}", .path.display())]
    MissingDefaultFile { path: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
}

impl BuildError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BuildError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            BuildError::Toolchain(e) => e.is_fatal(),
            _ => false,
        }
    }
}

/// Errors raised while writing snippets to the staging area.
#[derive(Error, Debug)]
pub enum StagingError {
    /// Two qualifying blocks map to the same staged file name. Document base
    /// names must be unique across the source tree.
    #[error(
        "Snippet file {name} from {} collides with one from {}",
        .document.display(),
        .previous.display()
    )]
    Collision {
        name: String,
        document: PathBuf,
        previous: PathBuf,
    },

    #[error("Failed to write snippet {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
