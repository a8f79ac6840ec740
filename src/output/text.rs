//! Plain-text report for terminals

use crate::crawler::{CrawlReport, LinkOutcome};
use crate::output::stats::CrawlStatistics;

/// Widest URL column before truncation
const MAX_URL_WIDTH: usize = 72;

/// Formats a crawl run as an aligned text table followed by a summary
///
/// Broken links are listed first, then by depth and URL.
pub fn format_text_report(report: &CrawlReport) -> String {
    let mut rows: Vec<&LinkOutcome> = report.outcomes.iter().collect();
    rows.sort_by(|a, b| {
        a.is_working
            .cmp(&b.is_working)
            .then(a.depth.cmp(&b.depth))
            .then_with(|| a.url.cmp(&b.url))
    });

    let url_width = rows
        .iter()
        .map(|o| o.url.chars().count().min(MAX_URL_WIDTH))
        .max()
        .unwrap_or(3)
        .max(3);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<6} {:<5} {:<url_width$} {:>10}  {}\n",
        "STATUS", "DEPTH", "URL", "TIME", "DETAIL"
    ));

    for outcome in rows {
        let status = if outcome.status_code == 0 {
            "ERR".to_string()
        } else {
            outcome.status_code.to_string()
        };
        let detail = match (&outcome.error, &outcome.parent_url) {
            (Some(error), _) => error.clone(),
            (None, Some(parent)) if !outcome.is_working => format!("found on {}", parent),
            _ => String::new(),
        };
        out.push_str(&format!(
            "{:<6} {:<5} {:<url_width$} {:>10}  {}\n",
            status,
            outcome.depth,
            truncate(&outcome.url, MAX_URL_WIDTH),
            format!("{}ms", outcome.response_time.as_millis()),
            detail
        ));
    }

    let stats = CrawlStatistics::from_outcomes(&report.outcomes);
    out.push_str(&format!(
        "\n{} links checked in {:?} ({} mode): {} working, {} broken\n",
        stats.total_links,
        report.elapsed,
        report.mode,
        stats.working_links,
        stats.broken_links
    ));

    out
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
