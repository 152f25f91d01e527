//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a harvested
//! document set.

use crate::output::stats::{percentage, DocumentStatistics};
use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Writes a markdown summary of a document set
///
/// # Arguments
///
/// * `stats` - Statistics of the document set
/// * `source` - Where the documents were read from
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    stats: &DocumentStatistics,
    source: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(stats, source, Utc::now());

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output_path, markdown)?;

    Ok(())
}

/// Formats document statistics as markdown
///
/// # Arguments
///
/// * `stats` - Statistics of the document set
/// * `source` - Where the documents were read from
/// * `generated_at` - Timestamp written into the header
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(
    stats: &DocumentStatistics,
    source: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut md = String::new();

    md.push_str("# Reel Harvester Summary\n\n");
    md.push_str(&format!("- **Source**: `{}`\n", source));
    md.push_str(&format!(
        "- **Generated**: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Reviews**: {}\n", stats.total));
    md.push_str(&format!(
        "- **Rated**: {} ({:.1}%)\n",
        stats.rated,
        stats.rated_percentage()
    ));
    md.push_str(&format!(
        "- **With Review Text**: {} ({:.1}%)\n",
        stats.with_review_text,
        percentage(stats.with_review_text, stats.total)
    ));
    md.push_str(&format!("- **With Critic**: {}\n", stats.with_critic));
    md.push_str(&format!(
        "- **With Review Date**: {}\n",
        stats.with_review_date
    ));
    md.push_str(&format!(
        "- **Unknown Release Year**: {}\n",
        stats.unknown_year
    ));
    if let Some((first, last)) = stats.year_range {
        md.push_str(&format!("- **Release Years**: {} - {}\n", first, last));
    }
    md.push('\n');

    if let Some(average) = stats.average_rating {
        md.push_str("## Ratings\n\n");
        md.push_str(&format!("Average rating: **{:.2}** / 10\n\n", average));
        md.push_str("| Rating | Reviews |\n");
        md.push_str("|--------|---------|\n");
        for (bucket, count) in &stats.rating_histogram {
            md.push_str(&format!("| {} | {} |\n", bucket, count));
        }
        md.push('\n');
    }

    if !stats.top_genres.is_empty() {
        md.push_str("## Top Genres\n\n");
        md.push_str("| Genre | Reviews |\n");
        md.push_str("|-------|---------|\n");
        for (genre, count) in &stats.top_genres {
            md.push_str(&format!("| {} | {} |\n", genre, count));
        }
        md.push('\n');
    }

    if !stats.top_critics.is_empty() {
        md.push_str("## Top Critics\n\n");
        md.push_str("| Critic | Reviews |\n");
        md.push_str("|--------|---------|\n");
        for (critic, count) in &stats.top_critics {
            md.push_str(&format!("| {} | {} |\n", critic, count));
        }
        md.push('\n');
    }

    md
}
