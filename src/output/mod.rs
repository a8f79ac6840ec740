//! Output module for rendering crawl reports
//!
//! This module handles:
//! - Computing statistics over link outcomes
//! - Rendering reports as a text table, markdown or JSON
//! - Writing reports to stdout or a file

mod markdown;
pub mod stats;
mod text;

pub use markdown::format_markdown_report;
pub use stats::{print_statistics, CrawlStatistics};
pub use text::format_text_report;

use crate::crawler::{CrawlReport, LinkOutcome};
use std::fmt;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Report rendering formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

/// Serializes outcomes as a pretty-printed JSON array
pub fn to_json(outcomes: &[LinkOutcome]) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}

/// Renders a crawl run in the requested format
pub fn render_report(
    report: &CrawlReport,
    seed_url: &str,
    format: ReportFormat,
) -> OutputResult<String> {
    match format {
        ReportFormat::Text => Ok(format_text_report(report)),
        ReportFormat::Json => to_json(&report.outcomes).map(|mut json| {
            json.push('\n');
            json
        }),
        ReportFormat::Markdown => Ok(format_markdown_report(report, seed_url)),
    }
}

/// Renders a crawl run and writes it to `path`, or stdout when `None`
pub fn write_report(
    report: &CrawlReport,
    seed_url: &str,
    format: ReportFormat,
    path: Option<&Path>,
) -> OutputResult<()> {
    let rendered = render_report(report, seed_url, format)?;

    match path {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|e| {
                OutputError::Write(format!("{}: {}", path.display(), e))
            })?;
            tracing::info!("Wrote {} report to {}", format, path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
