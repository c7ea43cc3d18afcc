//! Markdown report generation
//!
//! This module renders a `ReportSummary` as a markdown document: overview
//! figures, the three rankings, and the last recorded run.

use crate::output::stats::ReportSummary;
use crate::output::ReportResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report for `summary` to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(ReportError)` - Failed to write the report
pub fn generate_markdown_report(summary: &ReportSummary, output_path: &Path) -> ReportResult<()> {
    let markdown = format_markdown_report(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a report summary as markdown
pub fn format_markdown_report(summary: &ReportSummary) -> String {
    let mut md = String::new();

    md.push_str("# Trust-Scout Company Report\n\n");

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Source**: {}\n", summary.source));
    md.push_str(&format!("- **Companies**: {}\n", summary.total_records));
    md.push_str(&format!("- **With Rating**: {}\n", summary.rated_records));
    md.push_str(&format!("- **With Location**: {}\n", summary.located_records));
    match summary.average_trust_score {
        Some(average) => md.push_str(&format!("- **Average TrustScore**: {:.2}\n", average)),
        None => md.push_str("- **Average TrustScore**: n/a\n"),
    }
    md.push_str(&format!("- **Total Reviews**: {}\n\n", summary.total_reviews));

    if let Some(run) = &summary.last_run {
        md.push_str("## Last Run\n\n");
        md.push_str(&format!("- **Run ID**: {}\n", run.id));
        md.push_str(&format!("- **Category**: {}\n", run.category));
        md.push_str(&format!("- **Started**: {}\n", run.started_at));
        if let Some(finished) = &run.finished_at {
            md.push_str(&format!("- **Finished**: {}\n", finished));
        }
        md.push_str(&format!("- **Status**: {}\n", run.status.to_db_string()));
        md.push_str(&format!("- **Rows Written**: {}\n", run.rows_written));
        md.push_str(&format!("- **Config Hash**: {}\n\n", run.config_hash));
    }

    if !summary.top_trust_scores.is_empty() {
        md.push_str(&format!(
            "## Top {} Companies by TrustScore\n\n",
            summary.top_trust_scores.len()
        ));
        md.push_str("| # | Company | TrustScore |\n");
        md.push_str("|---|---------|------------|\n");
        for (rank, (name, score)) in summary.top_trust_scores.iter().enumerate() {
            md.push_str(&format!("| {} | {} | {:.1} |\n", rank + 1, escape_cell(name), score));
        }
        md.push('\n');
    }

    if !summary.top_reviews.is_empty() {
        md.push_str(&format!(
            "## Top {} Companies by Number of Reviews\n\n",
            summary.top_reviews.len()
        ));
        md.push_str("| # | Company | Reviews | Share |\n");
        md.push_str("|---|---------|---------|-------|\n");
        let shares = summary.review_shares();
        for (rank, ((name, reviews), (_, share))) in
            summary.top_reviews.iter().zip(shares.iter()).enumerate()
        {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% |\n",
                rank + 1,
                escape_cell(name),
                reviews,
                share
            ));
        }
        md.push('\n');
    }

    if !summary.top_locations.is_empty() {
        md.push_str("## Locations with Most Companies\n\n");
        md.push_str("| Location | Companies |\n");
        md.push_str("|----------|-----------|\n");
        for (location, count) in &summary.top_locations {
            md.push_str(&format!("| {} | {} |\n", escape_cell(location), count));
        }
        md.push('\n');
    }

    md
}

/// Keeps a value from breaking out of its table cell
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
