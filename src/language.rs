use crate::config::SnippetConfig;

/// Selects which fenced blocks are verified.
///
/// A block qualifies when its fence tag contains the language marker and does
/// not contain the ignore marker. Matching is by substring so compound tags
/// like `flix,ignore` or `flix-repl` work without parsing, at the price of
/// false positives for markers that appear inside unrelated words.
///
/// # Example
///
/// ```ignore
/// let language = SnippetLanguage::new("flix", "ignore", ".flix");
/// assert!(language.matches("flix"));
/// assert!(!language.matches("flix,ignore"));
/// assert!(!language.matches("java"));
/// ```
#[derive(Debug, Clone)]
pub struct SnippetLanguage {
    marker: String,
    ignore_marker: String,
    file_extension: String,
}

impl SnippetLanguage {
    pub fn new(
        marker: impl Into<String>,
        ignore_marker: impl Into<String>,
        file_extension: impl Into<String>,
    ) -> Self {
        Self {
            marker: marker.into(),
            ignore_marker: ignore_marker.into(),
            file_extension: file_extension.into(),
        }
    }

    pub fn from_config(config: &SnippetConfig) -> Self {
        Self::new(
            config.language.clone(),
            config.ignore_marker.clone(),
            config.file_extension(),
        )
    }

    /// Returns the language marker (e.g., "flix").
    pub fn name(&self) -> &str {
        &self.marker
    }

    /// Returns the extension for staged snippet files (e.g., ".flix").
    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    /// Returns true if a block with this fence tag should be verified.
    pub fn matches(&self, tag: &str) -> bool {
        if !tag.contains(&self.marker) {
            return false;
        }
        // An empty ignore marker would exclude everything
        self.ignore_marker.is_empty() || !tag.contains(&self.ignore_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_code_blocks;

    fn flix() -> SnippetLanguage {
        SnippetLanguage::new("flix", "ignore", ".flix")
    }

    #[test]
    fn test_exact_tag_matches() {
        assert!(flix().matches("flix"));
    }

    #[test]
    fn test_compound_tags() {
        let language = flix();
        assert!(language.matches("flix,no_run"));
        assert!(!language.matches("flix,ignore"));
        assert!(!language.matches("ignore flix"));
    }

    #[test]
    fn test_non_matching_tags() {
        let language = flix();
        assert!(!language.matches(""));
        assert!(!language.matches("java"));
        assert!(!language.matches("Flix"));
    }

    #[test]
    fn test_substring_false_positive_is_accepted() {
        assert!(SnippetLanguage::new("go", "ignore", ".go").matches("golang"));
        assert!(SnippetLanguage::new("c", "ignore", ".c").matches("scala"));
    }

    #[test]
    fn test_empty_ignore_marker() {
        let language = SnippetLanguage::new("flix", "", ".flix");
        assert!(language.matches("flix,ignore"));
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let markdown = "```flix\na\n```\n```flix,ignore\nb\n```\n```java\nc\n```\n```flix\nd\n```\n";
        let language = flix();

        let once: Vec<_> = extract_code_blocks(markdown)
            .into_iter()
            .filter(|b| language.matches(&b.language))
            .collect();
        let twice: Vec<_> = once
            .clone()
            .into_iter()
            .filter(|b| language.matches(&b.language))
            .collect();

        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_from_config() {
        let config = SnippetConfig {
            language: "scala".to_string(),
            extension: Some("sc".to_string()),
            ..SnippetConfig::default()
        };
        let language = SnippetLanguage::from_config(&config);
        assert_eq!(language.name(), "scala");
        assert_eq!(language.file_extension(), ".sc");
    }
}
