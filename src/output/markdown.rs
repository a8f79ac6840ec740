//! Markdown report generation
//!
//! This module renders a human-readable markdown report of a crawl run,
//! including an overview, a per-depth breakdown and every broken link.

use crate::crawler::CrawlReport;
use crate::output::stats::CrawlStatistics;

/// Formats a crawl run as a markdown document
pub fn format_markdown_report(report: &CrawlReport, seed_url: &str) -> String {
    let stats = CrawlStatistics::from_outcomes(&report.outcomes);
    let mut md = String::new();

    md.push_str("# Link Ripple Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed URL**: {}\n", seed_url));
    md.push_str(&format!("- **Fetch Mode**: {}\n", report.mode));
    md.push_str(&format!("- **Duration**: {:?}\n", report.elapsed));
    md.push_str(&format!(
        "- **Peak Concurrent Fetches**: {}\n\n",
        report.peak_in_flight
    ));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Links Checked**: {}\n", stats.total_links));
    md.push_str(&format!("- **Working**: {}\n", stats.working_links));
    md.push_str(&format!(
        "- **Broken**: {} ({} unreachable)\n",
        stats.broken_links, stats.unreachable_links
    ));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n", stats.success_rate()));
    md.push_str(&format!(
        "- **Average Response Time**: {:?}\n",
        stats.average_response_time
    ));
    if let Some((url, time)) = &stats.slowest {
        md.push_str(&format!("- **Slowest**: {} ({:?})\n", url, time));
    }
    md.push('\n');

    if !stats.links_by_depth.is_empty() {
        md.push_str("## Links by Depth\n\n");
        md.push_str("| Depth | Links |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &stats.links_by_depth {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    let mut broken: Vec<_> = report.outcomes.iter().filter(|o| !o.is_working).collect();
    broken.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));

    md.push_str("## Broken Links\n\n");
    if broken.is_empty() {
        md.push_str("No broken links found.\n");
    } else {
        md.push_str("| URL | Found On | Status | Error |\n");
        md.push_str("|-----|----------|--------|-------|\n");
        for outcome in broken {
            let status = if outcome.status_code == 0 {
                "-".to_string()
            } else {
                outcome.status_code.to_string()
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&outcome.url),
                outcome.parent_url.as_deref().map(escape_cell).unwrap_or_default(),
                status,
                outcome.error.as_deref().map(escape_cell).unwrap_or_default(),
            ));
        }
    }

    md
}

/// Keeps pipes and newlines from breaking a table row
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\n', '\r'], " ")
}
