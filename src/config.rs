use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "doc-check.toml";

/// Configuration for both documentation checks.
///
/// This structure is deserialized from `doc-check.toml`. Every field has a
/// default, so an absent file or an empty section is valid.
///
/// # Example
///
/// ```toml
/// [snippets]
/// src = "src"
/// language = "flix"
/// timeout_secs = 120
///
/// [snippets.toolchain]
/// command = "java"
/// args = ["-jar", "${FLIX_JAR}"]
///
/// [page_width]
/// limit = 100
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocCheckConfig {
    pub snippets: SnippetConfig,
    pub page_width: PageWidthConfig,
}

/// Settings for snippet extraction and verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetConfig {
    /// Root directory holding the documents
    pub src: PathBuf,

    /// Marker a fence tag must contain for the block to be checked
    pub language: String,

    /// Marker that excludes a block even when the language matches
    pub ignore_marker: String,

    /// Extension of staged snippet files, derived from `language` when unset
    pub extension: Option<String>,

    /// Extension of the documents to scan
    pub document_extension: String,

    /// Upper bound for each toolchain invocation, 0 disables it
    pub timeout_secs: u64,

    pub toolchain: ToolchainConfig,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("src"),
            language: "flix".to_string(),
            ignore_marker: "ignore".to_string(),
            extension: None,
            document_extension: "md".to_string(),
            timeout_secs: 300,
            toolchain: ToolchainConfig::default(),
        }
    }
}

/// How to drive the external toolchain.
///
/// `command` and `args` support `${VAR_NAME}` environment variable expansion.
/// The full command line for a subcommand is `command args... init...` or
/// `command args... check...`.
///
/// # Security
///
/// The command is validated to prevent command injection. It cannot contain
/// shell metacharacters or use parent directory traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Toolchain executable (supports ${VAR} environment variable expansion)
    pub command: String,

    /// Arguments placed before every subcommand
    pub args: Vec<String>,

    /// Subcommand that lays out a fresh project in the working directory
    pub init: Vec<String>,

    /// Subcommand that checks the project without installing dependencies
    pub check: Vec<String>,

    /// Placeholder source file created by `init`, relative to the project
    pub entry_point: PathBuf,

    /// Directory receiving the snippet, relative to the project
    pub source_dir: PathBuf,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            command: "flix".to_string(),
            args: Vec::new(),
            init: vec!["init".to_string()],
            check: vec!["check".to_string(), "--no-install".to_string()],
            entry_point: PathBuf::from("src/Main.flix"),
            source_dir: PathBuf::from("src"),
        }
    }
}

impl ToolchainConfig {
    /// Validate the configuration for security and correctness
    pub fn validate(&self) -> Result<()> {
        // Ensure command doesn't contain shell metacharacters
        let dangerous_chars = [';', '|', '&', '`', '\n', '\r'];
        for ch in dangerous_chars {
            if self.command.contains(ch) {
                anyhow::bail!(
                    "Toolchain command contains invalid character '{}': {}",
                    ch.escape_default(),
                    self.command
                );
            }
        }

        let command_path = Path::new(&self.command);
        for component in command_path.components() {
            if matches!(component, std::path::Component::ParentDir) {
                anyhow::bail!("Toolchain command cannot contain '..': {}", self.command);
            }
        }

        if self.command.is_empty() {
            anyhow::bail!("Toolchain command cannot be empty");
        }

        if self.init.is_empty() {
            anyhow::bail!("Toolchain init subcommand cannot be empty");
        }

        if self.check.is_empty() {
            anyhow::bail!("Toolchain check subcommand cannot be empty");
        }

        for (name, path) in [
            ("entry_point", &self.entry_point),
            ("source_dir", &self.source_dir),
        ] {
            if path.is_absolute()
                || path
                    .components()
                    .any(|c| matches!(c, std::path::Component::ParentDir))
            {
                anyhow::bail!(
                    "Toolchain {} must be a path inside the project: {}",
                    name,
                    path.display()
                );
            }
        }

        Ok(())
    }
}

impl SnippetConfig {
    /// Returns the staged file extension, including the leading dot.
    pub fn file_extension(&self) -> String {
        match &self.extension {
            Some(ext) if ext.starts_with('.') => ext.clone(),
            Some(ext) => format!(".{}", ext),
            None => format!(".{}", self.language),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            anyhow::bail!("Snippet language marker cannot be empty");
        }

        self.toolchain
            .validate()
            .context("Invalid toolchain configuration")
    }
}

/// Settings for the page width check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageWidthConfig {
    pub src: PathBuf,

    /// Trimmed lines must be strictly shorter than this many characters
    pub limit: usize,

    pub document_extension: String,
}

impl Default for PageWidthConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("src"),
            limit: 100,
            document_extension: "md".to_string(),
        }
    }
}

impl DocCheckConfig {
    /// Parse configuration from TOML text and expand environment variables.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: DocCheckConfig =
            toml::from_str(text).context("Failed to parse configuration")?;
        config.expand_env();
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// When `path` is `None` the default file is used if it exists, otherwise
    /// built-in defaults apply. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            log::debug!("No {} found, using defaults", path.display());
            let mut config = Self::default();
            config.expand_env();
            return Ok(config);
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid {}", path.display()))
    }

    fn expand_env(&mut self) {
        let toolchain = &mut self.snippets.toolchain;
        toolchain.command = expand_env_vars(&toolchain.command);
        for arg in toolchain.args.iter_mut() {
            *arg = expand_env_vars(arg);
        }
    }
}

/// Expand environment variables in a string
/// Supports ${VAR_NAME} syntax
/// This function processes the string in a single pass to avoid re-processing expanded values
fn expand_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_name = String::new();
            let mut found_close = false;

            for ch in chars.by_ref() {
                if ch == '}' {
                    found_close = true;
                    break;
                }
                var_name.push(ch);
            }

            if found_close {
                match env::var(&var_name) {
                    Ok(value) => result.push_str(&value),
                    Err(_) => {
                        log::warn!(
                            "Environment variable '{}' not found, leaving unexpanded",
                            var_name
                        );
                        result.push_str("${");
                        result.push_str(&var_name);
                        result.push('}');
                    }
                }
            } else {
                // No closing brace found, treat as literal
                result.push_str("${");
                result.push_str(&var_name);
            }
        } else {
            result.push(ch);
        }
    }

    result
}
