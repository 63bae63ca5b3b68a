use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use doc_check::reporting::{print_check_statistics, write_width_violations, SnippetReport};
use doc_check::{page_width, DocCheckConfig, SnippetChecker};
use std::io;
use std::path::PathBuf;
use std::process::exit;

/// Exit status when a check found problems.
const EXIT_FAILED: i32 = 1;
/// Exit status when the run itself could not complete.
const EXIT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "doc-check", version, about = "Checks documentation sources")]
struct Cli {
    /// Configuration file (defaults to ./doc-check.toml when present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify that fenced code snippets compile
    Snippets {
        /// Directory holding the documents
        #[arg(long)]
        src: Option<PathBuf>,

        /// Seconds allowed per toolchain invocation (0 for no limit)
        #[arg(long)]
        timeout: Option<u64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Report lines at or beyond the page width
    PageWidth {
        #[arg(long)]
        src: Option<PathBuf>,

        /// Maximum width; trimmed lines must be shorter than this
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => exit(0),
        Ok(false) => exit(EXIT_FAILED),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(EXIT_ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = DocCheckConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Snippets {
            src,
            timeout,
            format,
        } => {
            let mut snippets = config.snippets;
            if let Some(src) = src {
                snippets.src = src;
            }
            if let Some(timeout) = timeout {
                snippets.timeout_secs = timeout;
            }
            check_snippets(SnippetChecker::new(snippets)?, format)
        }
        Commands::PageWidth { src, limit } => {
            let mut width = config.page_width;
            if let Some(src) = src {
                width.src = src;
            }
            if let Some(limit) = limit {
                width.limit = limit;
            }
            check_page_width(&width)
        }
    }
}

fn check_snippets(checker: SnippetChecker, format: OutputFormat) -> Result<bool> {
    let run = checker.run()?;
    let report = SnippetReport::new(&run.results);

    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Text => {
            report.write_text(&mut stdout)?;
            print_check_statistics(&run.results, run.duration);
        }
        OutputFormat::Json => report.write_json(&mut stdout)?,
    }

    Ok(report.success())
}

fn check_page_width(config: &doc_check::PageWidthConfig) -> Result<bool> {
    let violations = page_width::check_tree(&config.src, &config.document_extension, config.limit)?;

    write_width_violations(&violations, &mut io::stdout().lock())?;
    if !violations.is_empty() {
        eprintln!(
            "{} line(s) reach the page width limit of {}",
            violations.len(),
            config.limit
        );
    }

    Ok(violations.is_empty())
}
