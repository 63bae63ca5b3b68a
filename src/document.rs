use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A documentation file read from the source root.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the source root
    pub path: PathBuf,
    pub content: String,
}

impl Document {
    /// Reads a document. Unreadable or non-UTF-8 files are fatal.
    pub fn read(root: &Path, relative: &Path) -> Result<Self> {
        let full_path = root.join(relative);
        let content = fs::read_to_string(&full_path)
            .with_context(|| format!("Failed to read document {}", full_path.display()))?;
        Ok(Self {
            path: relative.to_path_buf(),
            content,
        })
    }

    /// The file name without its extension, used to name snippet files and
    /// project directories.
    pub fn subject(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|s| s.starts_with('.'))
}

/// Lists documents with the given extension below `root`, relative to it.
///
/// Hidden files and directories are skipped. The result is sorted so runs
/// over the same tree are reproducible.
pub fn discover_documents(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("Source directory not found: {}", root.display());
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.context("Failed to read directory entry")?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
        log::debug!("Found document {}", relative.display());
        documents.push(relative.to_path_buf());
    }

    documents.sort();
    Ok(documents)
}

/// Reads every document below `root` in discovery order.
pub fn load_documents(root: &Path, extension: &str) -> Result<Vec<Document>> {
    discover_documents(root, extension)?
        .iter()
        .map(|relative| Document::read(root, relative))
        .collect()
}
