use crate::document::Document;
use crate::error::StagingError;
use crate::extractor::{extract_code_blocks, CodeBlock};
use crate::language::SnippetLanguage;
use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum size of a single code block in bytes (1MB)
pub const MAX_CODE_BLOCK_SIZE: usize = 1_000_000;

/// Maximum number of code blocks per document
pub const MAX_BLOCKS_PER_DOCUMENT: usize = 1000;

/// A snippet written to the staging area, ready to be turned into a project.
#[derive(Debug, Clone)]
pub struct StagedSnippet {
    /// File name inside the staging area, e.g. `effects_12.flix`
    pub name: String,
    pub path: PathBuf,
    /// Document the snippet came from, relative to the source root
    pub document: PathBuf,
    pub start_line: usize,
}

impl StagedSnippet {
    /// The staged file name without its extension.
    pub fn subject(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.name)
    }
}

/// Writes qualifying code blocks into a staging directory.
///
/// Each block becomes `<subject>_<start line><extension>`. A name that was
/// already produced in this run is rejected instead of overwritten.
pub struct SnippetStager<'a> {
    dir: &'a Path,
    language: &'a SnippetLanguage,
    staged: HashMap<String, PathBuf>,
}

impl<'a> SnippetStager<'a> {
    pub fn new(dir: &'a Path, language: &'a SnippetLanguage) -> Self {
        Self {
            dir,
            language,
            staged: HashMap::new(),
        }
    }

    pub fn file_name(&self, document: &Document, block: &CodeBlock) -> String {
        format!(
            "{}_{}{}",
            document.subject(),
            block.start_line,
            self.language.file_extension()
        )
    }

    /// Writes one block's content verbatim to the staging area.
    pub fn materialize(
        &mut self,
        document: &Document,
        block: &CodeBlock,
    ) -> Result<StagedSnippet, StagingError> {
        let name = self.file_name(document, block);

        if let Some(previous) = self.staged.get(&name) {
            return Err(StagingError::Collision {
                name,
                document: document.path.clone(),
                previous: previous.clone(),
            });
        }

        let path = self.dir.join(&name);
        fs::write(&path, &block.content).map_err(|source| StagingError::Write {
            path: path.clone(),
            source,
        })?;

        log::debug!(
            "Staged {} from {}:{}",
            name,
            document.path.display(),
            block.start_line
        );
        self.staged.insert(name.clone(), document.path.clone());

        Ok(StagedSnippet {
            name,
            path,
            document: document.path.clone(),
            start_line: block.start_line,
        })
    }
}

/// Extracts, filters and stages the snippets of every document.
///
/// # Errors
///
/// Returns an error if:
/// - A document exceeds MAX_BLOCKS_PER_DOCUMENT
/// - A qualifying code block exceeds MAX_CODE_BLOCK_SIZE
/// - Two snippets map to the same staged file name
/// - A staged file cannot be written
pub fn stage_snippets(
    documents: &[Document],
    language: &SnippetLanguage,
    staging_dir: &Path,
) -> Result<Vec<StagedSnippet>> {
    let mut stager = SnippetStager::new(staging_dir, language);
    let mut snippets = Vec::new();
    let mut collection_errors = Vec::new();

    for document in documents {
        let code_blocks = extract_code_blocks(&document.content);

        if code_blocks.len() > MAX_BLOCKS_PER_DOCUMENT {
            collection_errors.push(format!(
                "Document {} has {} code blocks, exceeding limit of {}",
                document.path.display(),
                code_blocks.len(),
                MAX_BLOCKS_PER_DOCUMENT
            ));
            continue;
        }

        for block in code_blocks {
            if !language.matches(&block.language) {
                continue;
            }

            if block.content.len() > MAX_CODE_BLOCK_SIZE {
                collection_errors.push(format!(
                    "Code block at {}:{} exceeds size limit of {} bytes ({} bytes)",
                    document.path.display(),
                    block.start_line,
                    MAX_CODE_BLOCK_SIZE,
                    block.content.len()
                ));
                continue;
            }

            snippets.push(stager.materialize(document, &block)?);
        }
    }

    if !collection_errors.is_empty() {
        for error in &collection_errors {
            log::error!("{}", error);
        }
        anyhow::bail!(
            "Failed to collect snippets due to {} error(s)",
            collection_errors.len()
        );
    }

    snippets.sort_by(|a, b| {
        a.document
            .cmp(&b.document)
            .then(a.start_line.cmp(&b.start_line))
    });

    Ok(snippets)
}
