//! doc-check library
//!
//! This library provides two checks for documentation sources: verifying that
//! fenced code snippets still compile against the current toolchain, and
//! flagging lines wider than the page. The primary interface is the
//! `doc-check` binary, but the library can be used programmatically for
//! testing or custom integrations.
//!
//! ## Public API
//!
//! - [`SnippetChecker`] - Extracts snippets and checks each in an isolated project
//! - [`page_width::check_tree`] - Reports lines at or beyond the width limit
//! - [`DocCheckConfig`] - Configuration loaded from `doc-check.toml`
//!
//! Lower-level pieces ([`extract_code_blocks`], [`SnippetLanguage`]) are
//! exported for reuse.

mod checker;
mod compilation;
mod config;
mod document;
mod error;
mod extractor;
mod language;
pub mod page_width;
mod project;
pub mod reporting;
mod staging;
mod toolchain;

pub use checker::{RunContext, SnippetChecker, SnippetRun};
pub use compilation::CheckResult;
pub use config::{DocCheckConfig, PageWidthConfig, SnippetConfig, ToolchainConfig};
pub use document::Document;
pub use error::{BuildError, StagingError, ToolchainError};
pub use extractor::{extract_code_blocks, CodeBlock};
pub use language::SnippetLanguage;
