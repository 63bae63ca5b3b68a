//! Line width check for documentation sources.
//!
//! Lines are trimmed before measuring, so indentation and trailing
//! whitespace never count. Length is measured in characters.

use crate::document::{load_documents, Document};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// A line at or beyond the width limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub document: PathBuf,
    /// 1-based
    pub line_number: usize,
    /// The trimmed line
    pub line: String,
}

/// Returns true if the trimmed line is strictly shorter than `limit`.
pub fn is_within_limit(line: &str, limit: usize) -> bool {
    line.trim().chars().count() < limit
}

pub fn check_document(document: &Document, limit: usize) -> Vec<Violation> {
    document
        .content
        .lines()
        .enumerate()
        .filter(|(_, line)| !is_within_limit(line, limit))
        .map(|(i, line)| Violation {
            document: document.path.clone(),
            line_number: i + 1,
            line: line.trim().to_string(),
        })
        .collect()
}

/// Checks every document below `root`.
pub fn check_tree(root: &Path, extension: &str, limit: usize) -> Result<Vec<Violation>> {
    let documents = load_documents(root, extension)?;
    let violations: Vec<_> = documents
        .iter()
        .flat_map(|doc| check_document(doc, limit))
        .collect();

    log::debug!(
        "Checked {} document(s), {} line(s) too wide",
        documents.len(),
        violations.len()
    );
    Ok(violations)
}
