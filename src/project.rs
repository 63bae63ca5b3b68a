use crate::error::BuildError;
use crate::staging::StagedSnippet;
use crate::toolchain::Toolchain;
use std::fs;
use std::path::{Path, PathBuf};

/// Prepares one isolated toolchain project per snippet.
///
/// Projects live under `build_root/<subject>`. Each one starts from the
/// toolchain's own skeleton with the placeholder entry point replaced by the
/// snippet, so snippets never see each other's definitions.
pub struct ProjectBuilder<'a> {
    build_root: &'a Path,
    toolchain: &'a Toolchain,
}

impl<'a> ProjectBuilder<'a> {
    pub fn new(build_root: &'a Path, toolchain: &'a Toolchain) -> Self {
        Self {
            build_root,
            toolchain,
        }
    }

    /// Builds the project for a staged snippet and returns its directory.
    pub async fn build_project(&self, snippet: &StagedSnippet) -> Result<PathBuf, BuildError> {
        let project_dir = self.build_root.join(snippet.subject());
        let config = self.toolchain.config();

        // `create_dir` (not `create_dir_all`) so an existing project is an error
        fs::create_dir(&project_dir).map_err(|source| {
            if source.kind() == std::io::ErrorKind::AlreadyExists {
                BuildError::DirectoryConflict {
                    path: project_dir.clone(),
                }
            } else {
                BuildError::io(
                    format!("Failed to create {}", project_dir.display()),
                    source,
                )
            }
        })?;

        let init = self.toolchain.init(&project_dir).await?;
        if !init.passed() {
            return Err(BuildError::InitFailed {
                code: init.exit_code,
                output: init.output,
            });
        }

        let entry_point = project_dir.join(&config.entry_point);
        if !entry_point.is_file() {
            return Err(BuildError::MissingDefaultFile {
                path: config.entry_point.clone(),
            });
        }
        fs::remove_file(&entry_point).map_err(|source| {
            BuildError::io(format!("Failed to remove {}", entry_point.display()), source)
        })?;

        let source_dir = project_dir.join(&config.source_dir);
        fs::create_dir_all(&source_dir).map_err(|source| {
            BuildError::io(format!("Failed to create {}", source_dir.display()), source)
        })?;

        let target = source_dir.join(&snippet.name);
        fs::copy(&snippet.path, &target).map_err(|source| {
            BuildError::io(
                format!("Failed to copy {} into project", snippet.name),
                source,
            )
        })?;

        log::debug!("Prepared project {}", project_dir.display());
        Ok(project_dir)
    }
}
