use crate::compilation::CheckResult;
use crate::page_width::Violation;
use chrono::Local;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

/// Formats a line with mdBook-style timestamp, level and prefix.
fn format_line(level: &str, message: &str) -> String {
    format!(
        "{} [{}] (doc_check): {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        message
    )
}

/// Summary of a snippet run.
#[derive(Debug, Serialize)]
pub struct SnippetReport<'a> {
    pub checked: usize,
    pub failed: Vec<&'a str>,
    pub results: &'a [CheckResult],
}

impl<'a> SnippetReport<'a> {
    pub fn new(results: &'a [CheckResult]) -> Self {
        Self {
            checked: results.len(),
            failed: results
                .iter()
                .filter(|r| !r.success())
                .map(|r| r.snippet())
                .collect(),
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Writes the human-readable report.
    ///
    /// On failure: the number of failing snippets, then one staged file name
    /// per line. On success: a confirmation line.
    pub fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        if self.checked == 0 {
            writeln!(out, "{}", format_line("INFO", "No snippets found to check"))?;
        } else if self.success() {
            writeln!(
                out,
                "{}",
                format_line(
                    "INFO",
                    &format!(
                        "All snippets compiled successfully ({} checked)",
                        self.checked
                    )
                )
            )?;
        } else {
            writeln!(
                out,
                "{}",
                format_line(
                    "ERROR",
                    &format!("{} snippet(s) failed to compile:", self.failed.len())
                )
            )?;
            for name in &self.failed {
                writeln!(out, "{}", format_line("ERROR", &format!("  {}", name)))?;
            }
        }
        Ok(())
    }

    pub fn write_json(&self, out: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }
}

/// Prints timing statistics to stderr.
///
/// Shows the total and average time per snippet, and individual timings at
/// debug level (RUST_LOG=debug).
pub fn print_check_statistics(results: &[CheckResult], total_duration: Duration) {
    if results.is_empty() {
        return;
    }

    let sum_ms: u128 = results.iter().map(|r| r.duration().as_millis()).sum();
    let avg_ms = sum_ms / results.len() as u128;

    eprintln!(
        "{}",
        format_line(
            "INFO",
            &format!(
                "Checked {} snippet(s) in {}ms (avg {}ms per snippet)",
                results.len(),
                total_duration.as_millis(),
                avg_ms
            )
        )
    );

    log::debug!("Individual check timings:");
    for result in results {
        log::debug!(
            "[SNIPPET_CHECK_TIME] {} ({}:{}): {}ms",
            result.snippet(),
            result.document().display(),
            result.line(),
            result.duration().as_millis()
        );
    }
}

/// Writes one entry per line exceeding the page width.
pub fn write_width_violations(violations: &[Violation], out: &mut impl Write) -> io::Result<()> {
    for violation in violations {
        writeln!(
            out,
            "Page width exceeded in {} on line {}",
            violation.document.display(),
            violation.line_number
        )?;
        writeln!(out, "\t{}", violation.line)?;
    }
    Ok(())
}
