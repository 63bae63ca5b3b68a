use crate::error::BuildError;
use crate::project::ProjectBuilder;
use crate::staging::StagedSnippet;
use crate::toolchain::Toolchain;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of verifying a single snippet.
///
/// Captures success or failure along with timing information for statistics
/// and debug logging.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    snippet: String,
    document: PathBuf,
    line: usize,
    succeeded: bool,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    duration: Duration,
    message: Option<String>,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl CheckResult {
    fn new(snippet: &StagedSnippet, duration: Duration, message: Option<String>) -> Self {
        Self {
            snippet: snippet.name.clone(),
            document: snippet.document.clone(),
            line: snippet.start_line,
            succeeded: message.is_none(),
            duration,
            message,
        }
    }

    pub fn success(&self) -> bool {
        self.succeeded
    }

    /// The staged file name identifying the snippet.
    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn error_message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Builds the snippet's project and checks it.
///
/// Per-snippet problems (a project that cannot be prepared, a failing or
/// timed-out check) become a failed [`CheckResult`]. Errors that point at a
/// broken environment, such as a missing toolchain executable, are returned.
pub async fn verify_snippet(
    builder: &ProjectBuilder<'_>,
    toolchain: &Toolchain,
    snippet: &StagedSnippet,
) -> anyhow::Result<CheckResult> {
    log::debug!("Checking {}", snippet.name);

    let start = Instant::now();
    let outcome = match builder.build_project(snippet).await {
        Ok(project_dir) => toolchain
            .check(&project_dir)
            .await
            .map_err(BuildError::from),
        Err(e) => Err(e),
    };
    let duration = start.elapsed();

    let message = match outcome {
        Ok(output) if output.passed() => None,
        Ok(output) => Some(format!(
            "check exited with status {}:\n{}",
            output.exit_code, output.output
        )),
        Err(e) if e.is_fatal() => {
            return Err(anyhow::Error::new(e)
                .context(format!("Toolchain unavailable while checking {}", snippet.name)));
        }
        Err(e) => Some(e.to_string()),
    };

    if let Some(message) = &message {
        log::warn!(
            "{} ({}:{}) failed: {}",
            snippet.name,
            snippet.document.display(),
            snippet.start_line,
            message
        );
    }

    Ok(CheckResult::new(snippet, duration, message))
}

/// Verifies all snippets one after another.
///
/// Returns a tuple of (results, total_duration). Stops at the first fatal error.
pub async fn verify_snippets(
    snippets: &[StagedSnippet],
    builder: &ProjectBuilder<'_>,
    toolchain: &Toolchain,
) -> anyhow::Result<(Vec<CheckResult>, Duration)> {
    let total_start = Instant::now();
    let mut results = Vec::with_capacity(snippets.len());

    for snippet in snippets {
        results.push(verify_snippet(builder, toolchain, snippet).await?);
    }

    Ok((results, total_start.elapsed()))
}

#[cfg(test)]
pub(crate) fn result_for_tests(name: &str, message: Option<&str>) -> CheckResult {
    CheckResult {
        snippet: name.to_string(),
        document: PathBuf::from("intro.md"),
        line: 3,
        succeeded: message.is_none(),
        duration: Duration::from_millis(10),
        message: message.map(str::to_string),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::ToolchainConfig;
    use std::fs;
    use tempfile::TempDir;

    // $1 is the subcommand; `check` fails when any source mentions BROKEN
    const SCRIPT: &str = r#"
case "$1" in
  init) mkdir -p src && echo 'def main(): Unit = ()' > src/Main.flix ;;
  check) if grep -q BROKEN src/*.flix; then echo 'Parse error' >&2; exit 1; fi ;;
esac
"#;

    fn toolchain(command: &str) -> Toolchain {
        Toolchain::new(
            ToolchainConfig {
                command: command.to_string(),
                args: vec!["-c".to_string(), SCRIPT.to_string(), "toolchain".to_string()],
                ..ToolchainConfig::default()
            },
            None,
        )
    }

    fn staged(dir: &Path, name: &str, line: usize, content: &str) -> StagedSnippet {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        StagedSnippet {
            name: name.to_string(),
            path,
            document: PathBuf::from("intro.md"),
            start_line: line,
        }
    }

    #[tokio::test]
    async fn test_one_result_per_snippet() {
        let staging = TempDir::new().unwrap();
        let build = TempDir::new().unwrap();
        let toolchain = toolchain("sh");
        let builder = ProjectBuilder::new(build.path(), &toolchain);

        let snippets = vec![
            staged(staging.path(), "intro_3.flix", 3, "def a(): Int32 = 1\n"),
            staged(staging.path(), "intro_9.flix", 9, "def b(): BROKEN\n"),
            staged(staging.path(), "intro_15.flix", 15, "def c(): Int32 = 3\n"),
        ];

        let (results, _) = verify_snippets(&snippets, &builder, &toolchain)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].success());
        assert!(!results[1].success());
        assert!(results[1].error_message().unwrap().contains("Parse error"));
        assert!(results[2].success());
        assert_eq!(results[1].snippet(), "intro_9.flix");
        assert_eq!(results[1].line(), 9);
    }

    #[tokio::test]
    async fn test_build_failure_is_recorded_not_raised() {
        let staging = TempDir::new().unwrap();
        let build = TempDir::new().unwrap();
        let toolchain = toolchain("sh");
        let builder = ProjectBuilder::new(build.path(), &toolchain);
        let snippet = staged(staging.path(), "intro_3.flix", 3, "x\n");

        fs::create_dir(build.path().join("intro_3")).unwrap();

        let result = verify_snippet(&builder, &toolchain, &snippet).await.unwrap();
        assert!(!result.success());
        assert!(result.error_message().unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn test_missing_toolchain_aborts() {
        let staging = TempDir::new().unwrap();
        let build = TempDir::new().unwrap();
        let toolchain = toolchain("doc-check-no-such-toolchain");
        let builder = ProjectBuilder::new(build.path(), &toolchain);
        let snippet = staged(staging.path(), "intro_3.flix", 3, "x\n");

        assert!(verify_snippet(&builder, &toolchain, &snippet).await.is_err());
    }

    #[test]
    fn test_serializes_duration_in_millis() {
        let json = serde_json::to_value(result_for_tests("a_2.flix", Some("boom"))).unwrap();
        assert_eq!(json["snippet"], "a_2.flix");
        assert_eq!(json["duration_ms"], 10);
        assert_eq!(json["succeeded"], false);
        assert_eq!(json["message"], "boom");
    }
}
