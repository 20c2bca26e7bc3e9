//! Console and Markdown run summaries

use crate::fetcher::CrawlOutcome;
use crate::filter::FilterChain;
use crate::stats::{FilterStats, TraversalStatsSnapshot};
use crate::DeepCrawlError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum failures listed in a summary
const MAX_LISTED_FAILURES: usize = 20;

/// Counters of one filter, copied out of its [`FilterStats`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRow {
    pub name: String,
    pub seen: u64,
    pub passed: u64,
    pub rejected: u64,
}

impl FilterRow {
    fn new(name: &str, stats: &FilterStats) -> Self {
        Self {
            name: name.to_string(),
            seen: stats.total_seen(),
            passed: stats.passed(),
            rejected: stats.rejected(),
        }
    }
}

/// Everything a summary reports about one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub strategy: String,
    pub start_url: String,
    pub config_hash: String,
    pub cancelled: bool,
    pub stats: TraversalStatsSnapshot,
    /// The whole chain first, then each filter in chain order
    pub filters: Vec<FilterRow>,
    pub depth_breakdown: BTreeMap<u32, u64>,
    pub total_links: usize,
    /// (url, error message) of every failed outcome
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    pub fn new(
        strategy: &str,
        start_url: &str,
        config_hash: &str,
        stats: TraversalStatsSnapshot,
        chain: &FilterChain,
        outcomes: &[CrawlOutcome],
    ) -> Self {
        let mut filters = vec![FilterRow::new("chain", chain.stats())];
        filters.extend(
            chain
                .filters()
                .iter()
                .map(|f| FilterRow::new(f.name(), f.stats())),
        );

        let mut depth_breakdown = BTreeMap::new();
        let mut failures = Vec::new();
        let mut total_links = 0;

        for outcome in outcomes {
            if let Some(depth) = outcome.depth() {
                *depth_breakdown.entry(depth).or_insert(0) += 1;
            }
            total_links += outcome.links.len();
            if !outcome.success {
                failures.push((
                    outcome.url.clone(),
                    outcome
                        .error_message
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string()),
                ));
            }
        }

        Self {
            strategy: strategy.to_string(),
            start_url: start_url.to_string(),
            config_hash: config_hash.to_string(),
            cancelled: false,
            stats,
            filters,
            depth_breakdown,
            total_links,
            failures,
        }
    }

    pub fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn status(&self) -> &'static str {
        if self.cancelled {
            "cancelled"
        } else {
            "completed"
        }
    }

    /// Share of attempted pages that succeeded, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.stats.pages_processed + self.stats.pages_failed;
        if attempted == 0 {
            0.0
        } else {
            self.stats.pages_processed as f64 / attempted as f64 * 100.0
        }
    }
}

/// Prints a summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Deep Crawl Summary ===\n");

    println!("Run:");
    println!("  Strategy: {}", summary.strategy);
    println!("  Start URL: {}", summary.start_url);
    println!("  Status: {}", summary.status());
    if let Some(duration) = summary.stats.duration() {
        println!("  Duration: {:.2}s", duration.as_secs_f64());
    }
    println!();

    println!("Pages:");
    println!("  Processed: {}", summary.stats.pages_processed);
    println!("  Failed: {}", summary.stats.pages_failed);
    println!("  Skipped links: {}", summary.stats.pages_skipped);
    println!("  Deepest level: {}", summary.stats.max_depth_reached);
    println!("  Links found: {}", summary.total_links);
    println!();

    if !summary.depth_breakdown.is_empty() {
        println!("Pages by Depth:");
        for (depth, count) in &summary.depth_breakdown {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    if summary.filters.len() > 1 {
        println!("Filters:");
        for row in &summary.filters {
            println!(
                "  {}: {} seen, {} passed, {} rejected",
                row.name, row.seen, row.passed, row.rejected
            );
        }
        println!();
    }

    if !summary.failures.is_empty() {
        println!("Failures ({}):", summary.failures.len());
        for (url, error) in summary.failures.iter().take(MAX_LISTED_FAILURES) {
            println!("  - {}: {}", url, error);
        }
        println!();
    }

    println!("Success Rate: {:.1}%", summary.success_rate());
}

/// Writes a Markdown summary to `output_path`
pub fn write_markdown_summary(summary: &RunSummary, output_path: &Path) -> Result<(), DeepCrawlError> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Ripple-Deepcrawl Run Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Strategy**: {}\n", summary.strategy));
    md.push_str(&format!("- **Start URL**: {}\n", summary.start_url));
    md.push_str(&format!("- **Status**: {}\n", summary.status()));
    if let Some(started) = summary.stats.start_time {
        md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
    }
    if let Some(finished) = summary.stats.end_time {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = summary.stats.duration() {
        md.push_str(&format!(
            "- **Duration**: {:.2} seconds\n",
            duration.as_secs_f64()
        ));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    md.push_str("## Statistics\n\n");
    md.push_str("| Counter | Value |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!(
        "| Pages processed | {} |\n",
        summary.stats.pages_processed
    ));
    md.push_str(&format!("| Pages failed | {} |\n", summary.stats.pages_failed));
    md.push_str(&format!(
        "| Links skipped | {} |\n",
        summary.stats.pages_skipped
    ));
    md.push_str(&format!(
        "| Deepest level | {} |\n",
        summary.stats.max_depth_reached
    ));
    md.push_str(&format!("| Links found | {} |\n", summary.total_links));
    md.push_str(&format!(
        "| Success rate | {:.2}% |\n\n",
        summary.success_rate()
    ));

    if summary.filters.len() > 1 {
        md.push_str("## Filters\n\n");
        md.push_str("| Filter | Seen | Passed | Rejected |\n");
        md.push_str("|--------|------|--------|----------|\n");
        for row in &summary.filters {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.name, row.seen, row.passed, row.rejected
            ));
        }
        md.push('\n');
    }

    if !summary.depth_breakdown.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &summary.depth_breakdown {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !summary.failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");
        for (url, error) in summary.failures.iter().take(MAX_LISTED_FAILURES) {
            md.push_str(&format!("| {} | {} |\n", url, error));
        }
        if summary.failures.len() > MAX_LISTED_FAILURES {
            md.push_str(&format!(
                "\n... and {} more\n",
                summary.failures.len() - MAX_LISTED_FAILURES
            ));
        }
        md.push('\n');
    }

    md
}
