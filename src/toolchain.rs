use crate::config::ToolchainConfig;
use crate::error::ToolchainError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Exit status and captured output of a toolchain invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit code, -1 when terminated by a signal
    pub exit_code: i32,
    pub success: bool,
    /// stderr if non-empty, stdout otherwise
    pub output: String,
}

impl ToolOutput {
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// The external toolchain, driven through its command line.
///
/// The toolchain is a black box: `init` lays out a project in the working
/// directory and `check` verifies it, reporting through its exit status.
#[derive(Debug, Clone)]
pub struct Toolchain {
    config: ToolchainConfig,
    timeout: Option<Duration>,
}

impl Toolchain {
    pub fn new(config: ToolchainConfig, timeout: Option<Duration>) -> Self {
        Self { config, timeout }
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Runs the project initialization subcommand inside `project_dir`.
    pub async fn init(&self, project_dir: &Path) -> Result<ToolOutput, ToolchainError> {
        self.run(&self.config.init, project_dir).await
    }

    /// Runs the check subcommand inside `project_dir`.
    pub async fn check(&self, project_dir: &Path) -> Result<ToolOutput, ToolchainError> {
        self.run(&self.config.check, project_dir).await
    }

    async fn run(&self, subcommand: &[String], cwd: &Path) -> Result<ToolOutput, ToolchainError> {
        log::debug!(
            "Running {} {} {} in {}",
            self.config.command,
            self.config.args.join(" "),
            subcommand.join(" "),
            cwd.display()
        );

        let child = Command::new(&self.config.command)
            .args(&self.config.args)
            .args(subcommand)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolchainError::Spawn {
                program: self.config.command.clone(),
                cwd: cwd.to_path_buf(),
                source,
            })?;

        // Dropping the future on timeout drops the child, which kills it
        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| ToolchainError::TimedOut {
                    program: self.config.command.clone(),
                    timeout,
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|source| ToolchainError::Wait {
            program: self.config.command.clone(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let captured = if !stderr.is_empty() {
            stderr.to_string()
        } else {
            stdout.to_string()
        };

        Ok(ToolOutput {
            exit_code: output.status.code().unwrap_or(-1),
            success: output.status.success(),
            output: captured,
        })
    }
}
