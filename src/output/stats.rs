//! Statistics over the outcomes of a crawl run

use crate::crawler::LinkOutcome;
use std::collections::BTreeMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Total number of URLs checked
    pub total_links: usize,

    /// URLs with a 2xx/3xx response
    pub working_links: usize,

    /// URLs with an error status or no response at all
    pub broken_links: usize,

    /// URLs that produced no response (status 0)
    pub unreachable_links: usize,

    /// Count of URLs per depth
    pub links_by_depth: BTreeMap<u32, usize>,

    /// Count of URLs per status code (0 = unreachable)
    pub status_codes: BTreeMap<u16, usize>,

    /// Mean response time over all checked URLs
    pub average_response_time: Duration,

    /// Slowest URL and its response time
    pub slowest: Option<(String, Duration)>,
}

impl CrawlStatistics {
    /// Computes statistics from a set of outcomes
    pub fn from_outcomes(outcomes: &[LinkOutcome]) -> Self {
        let mut stats = Self {
            total_links: outcomes.len(),
            ..Self::default()
        };

        let mut total_time = Duration::ZERO;

        for outcome in outcomes {
            if outcome.is_working {
                stats.working_links += 1;
            } else {
                stats.broken_links += 1;
            }
            if outcome.status_code == 0 {
                stats.unreachable_links += 1;
            }

            *stats.links_by_depth.entry(outcome.depth).or_insert(0) += 1;
            *stats.status_codes.entry(outcome.status_code).or_insert(0) += 1;

            total_time += outcome.response_time;

            let slower = match &stats.slowest {
                Some((_, slowest)) => outcome.response_time > *slowest,
                None => true,
            };
            if slower {
                stats.slowest = Some((outcome.url.clone(), outcome.response_time));
            }
        }

        if !outcomes.is_empty() {
            stats.average_response_time = total_time / outcomes.len() as u32;
        }

        stats
    }

    /// Percentage of checked URLs that are working
    pub fn success_rate(&self) -> f64 {
        if self.total_links == 0 {
            return 0.0;
        }
        (self.working_links as f64 / self.total_links as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Link Statistics ===\n");

    println!("Overview:");
    println!("  Links checked: {}", stats.total_links);
    println!("  Working: {}", stats.working_links);
    println!(
        "  Broken: {} ({} unreachable)",
        stats.broken_links, stats.unreachable_links
    );
    println!("  Average response time: {:?}", stats.average_response_time);
    if let Some((url, time)) = &stats.slowest {
        println!("  Slowest: {} ({:?})", url, time);
    }
    println!();

    println!("Links by Depth:");
    for (depth, count) in &stats.links_by_depth {
        println!("  {}: {}", depth, count);
    }
    println!();

    println!("Status Codes:");
    // Most frequent first
    let mut codes: Vec<_> = stats.status_codes.iter().collect();
    codes.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (code, count) in codes {
        let label = if *code == 0 {
            "no response".to_string()
        } else {
            code.to_string()
        };
        println!("  {}: {}", label, count);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} links working)",
        stats.success_rate(),
        stats.working_links,
        stats.total_links
    );
}
