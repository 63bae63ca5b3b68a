/// The marker that opens and closes a fenced code block.
pub const FENCE_MARKER: &str = "```";

/// A code block extracted from a document with its metadata.
///
/// Code blocks are identified by fence lines in markdown:
///
/// ````markdown
/// ```flix
/// def main(): Unit = ()
/// ```
/// ````
///
/// Everything after the opening marker is kept as the language tag, so a
/// fence such as ```` ```flix,ignore ```` yields the tag `flix,ignore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// The raw lines between the fences, line terminators included
    pub content: String,
    /// The trimmed text following the opening marker (may be empty)
    pub language: String,
    /// 1-based line number of the first line after the opening fence
    pub start_line: usize,
}

/// Returns true if the line, once trimmed, opens or closes a fenced block.
fn is_fence(line: &str) -> bool {
    line.trim().starts_with(FENCE_MARKER)
}

/// Extracts fenced code blocks from markdown content.
///
/// This is a single pass over the lines of the document. A fence line toggles
/// between "outside" and "inside" a block; lines seen while inside are
/// accumulated verbatim. Blocks are returned in document order.
///
/// A block still open when the document ends is dropped.
///
/// # Example
///
/// ```ignore
/// let blocks = extract_code_blocks("# Title\n```flix\ndef f(): Int32 = 1\n```\n");
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].language, "flix");
/// assert_eq!(blocks[0].start_line, 3);
/// ```
pub fn extract_code_blocks(content: &str) -> Vec<CodeBlock> {
    let mut code_blocks = Vec::new();
    let mut in_code_block = false;
    let mut current_code = String::new();
    let mut current_language = String::new();
    let mut current_start = 0;

    for (index, line) in content.split_inclusive('\n').enumerate() {
        if is_fence(line) {
            if in_code_block {
                code_blocks.push(CodeBlock {
                    content: std::mem::take(&mut current_code),
                    language: std::mem::take(&mut current_language),
                    start_line: current_start,
                });
                in_code_block = false;
            } else {
                in_code_block = true;
                current_code.clear();
                current_language = line.trim()[FENCE_MARKER.len()..].trim().to_string();
                // `index` is 0-based, the first content line sits one past the fence
                current_start = index + 2;
            }
        } else if in_code_block {
            current_code.push_str(line);
        }
    }

    if in_code_block {
        log::debug!(
            "Dropping unterminated code block starting at line {}",
            current_start
        );
    }

    code_blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_code_block() {
        let markdown = r#"
# Test

```flix
def main(): Unit \ IO =
    println("Hello")
```
"#;

        let blocks = extract_code_blocks(markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "flix");
        assert_eq!(blocks[0].start_line, 5);
        assert_eq!(
            blocks[0].content,
            "def main(): Unit \\ IO =\n    println(\"Hello\")\n"
        );
    }

    #[test]
    fn test_no_fences_yields_nothing() {
        let blocks = extract_code_blocks("# Heading\n\nJust prose.\n");
        assert!(blocks.is_empty());

        assert!(extract_code_blocks("").is_empty());
    }

    #[test]
    fn test_unterminated_block_is_dropped() {
        let markdown = "intro\n```flix\ndef f(): Int32 = 1\n";
        assert!(extract_code_blocks(markdown).is_empty());
    }

    #[test]
    fn test_unterminated_block_after_complete_one() {
        let markdown = "```flix\na\n```\n\n```flix\nb\n";
        let blocks = extract_code_blocks(markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "a\n");
    }

    #[test]
    fn test_language_tag_with_modifiers() {
        let markdown = "```  flix,ignore  \nx\n```\n";
        let blocks = extract_code_blocks(markdown);
        assert_eq!(blocks[0].language, "flix,ignore");
    }

    #[test]
    fn test_empty_language_tag() {
        let blocks = extract_code_blocks("```\nplain\n```\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "");
        assert_eq!(blocks[0].start_line, 2);
    }

    #[test]
    fn test_indented_fences_and_blank_lines() {
        let markdown = "1. item\n   ```flix\n   a\n\n   b\n   ```\n";
        let blocks = extract_code_blocks(markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 3);
        assert_eq!(blocks[0].content, "   a\n\n   b\n");
    }

    #[test]
    fn test_multiple_blocks_are_independent() {
        let markdown = "```flix\none\n```\ntext\n```java\ntwo\nthree\n```\n";
        let blocks = extract_code_blocks(markdown);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].language, "flix");
        assert_eq!(blocks[0].start_line, 2);
        assert_eq!(blocks[0].content, "one\n");

        assert_eq!(blocks[1].language, "java");
        assert_eq!(blocks[1].start_line, 6);
        assert_eq!(blocks[1].content, "two\nthree\n");
    }

    #[test]
    fn test_crlf_terminators_preserved() {
        let blocks = extract_code_blocks("```flix\r\nx\r\n```\r\n");
        assert_eq!(blocks[0].language, "flix");
        assert_eq!(blocks[0].content, "x\r\n");
    }

    #[test]
    fn test_closing_fence_without_trailing_newline() {
        let blocks = extract_code_blocks("```flix\nx\n```");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "x\n");
    }
}
