//! Statistics over a harvested document set
//!
//! This module provides functionality for summarizing a checkpoint file and
//! displaying the result.

use crate::document::Document;
use std::collections::{BTreeMap, HashMap};

/// Number of entries shown in the genre and critic rankings
pub const TOP_N: usize = 10;

/// Document set statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStatistics {
    /// Total number of documents
    pub total: usize,

    /// Documents carrying a normalized rating
    pub rated: usize,

    /// Documents with a non-empty review body
    pub with_review_text: usize,

    pub with_critic: usize,
    pub with_review_date: usize,

    /// Documents whose release year is unknown (stored as 0)
    pub unknown_year: usize,

    /// Mean of the normalized ratings
    pub average_rating: Option<f64>,

    /// Rated documents per whole point of the 0-10 scale
    pub rating_histogram: BTreeMap<u32, usize>,

    /// Earliest and latest known release year
    pub year_range: Option<(i32, i32)>,

    /// Most frequent genres, most frequent first
    pub top_genres: Vec<(String, usize)>,

    /// Most prolific critics, most frequent first
    pub top_critics: Vec<(String, usize)>,
}

impl DocumentStatistics {
    /// Computes statistics for a document set
    pub fn from_documents(documents: &[Document]) -> Self {
        let ratings: Vec<f64> = documents.iter().filter_map(|d| d.rating).collect();

        let average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        let mut rating_histogram = BTreeMap::new();
        for rating in &ratings {
            let bucket = rating.clamp(0.0, 10.0).floor() as u32;
            *rating_histogram.entry(bucket).or_insert(0) += 1;
        }

        let known_years = documents.iter().map(|d| d.year).filter(|year| *year > 0);
        let year_range = known_years.fold(None, |range: Option<(i32, i32)>, year| {
            Some(match range {
                Some((min, max)) => (min.min(year), max.max(year)),
                None => (year, year),
            })
        });

        let mut genres: HashMap<&str, usize> = HashMap::new();
        let mut critics: HashMap<&str, usize> = HashMap::new();
        for document in documents {
            for genre in &document.genres {
                *genres.entry(genre.as_str()).or_insert(0) += 1;
            }
            if let Some(critic) = &document.critic {
                *critics.entry(critic.as_str()).or_insert(0) += 1;
            }
        }

        Self {
            total: documents.len(),
            rated: ratings.len(),
            with_review_text: documents.iter().filter(|d| !d.reviews.is_empty()).count(),
            with_critic: documents.iter().filter(|d| d.critic.is_some()).count(),
            with_review_date: documents.iter().filter(|d| d.review_date.is_some()).count(),
            unknown_year: documents.iter().filter(|d| d.year == 0).count(),
            average_rating,
            rating_histogram,
            year_range,
            top_genres: ranked(genres),
            top_critics: ranked(critics),
        }
    }

    /// Share of documents with a rating, as a percentage
    pub fn rated_percentage(&self) -> f64 {
        percentage(self.rated, self.total)
    }
}

/// Counts sorted by descending frequency, ties broken by name
fn ranked(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_N);
    ranked
}

pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DocumentStatistics) {
    println!("=== Review Statistics ===\n");

    println!("Overview:");
    println!("  Total reviews: {}", stats.total);
    println!(
        "  Rated: {} ({:.1}%)",
        stats.rated,
        stats.rated_percentage()
    );
    println!(
        "  With review text: {} ({:.1}%)",
        stats.with_review_text,
        percentage(stats.with_review_text, stats.total)
    );
    println!("  With critic: {}", stats.with_critic);
    println!("  With review date: {}", stats.with_review_date);
    println!("  Unknown release year: {}", stats.unknown_year);
    if let Some((first, last)) = stats.year_range {
        println!("  Release years: {} - {}", first, last);
    }
    println!();

    if let Some(average) = stats.average_rating {
        println!("Ratings (0-10):");
        println!("  Average: {:.2}", average);
        for (bucket, count) in &stats.rating_histogram {
            println!("  {:>2}: {}", bucket, count);
        }
        println!();
    }

    if !stats.top_genres.is_empty() {
        println!("Top Genres:");
        for (genre, count) in &stats.top_genres {
            println!("  {}: {}", genre, count);
        }
        println!();
    }

    if !stats.top_critics.is_empty() {
        println!("Top Critics:");
        for (critic, count) in &stats.top_critics {
            println!("  {}: {}", critic, count);
        }
        println!();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_documents() -> Vec<Document> {
        let base = |url: &str, title: &str| -> Document {
            serde_json::from_value(serde_json::json!({
                "id": "rogerebert_000000000000",
                "title": title,
                "site": "rogerebert",
                "url": url,
            }))
            .unwrap()
        };

        let mut past_lives = base("https://www.rogerebert.com/reviews/past-lives-2023", "Past Lives");
        past_lives.year = 2023;
        past_lives.rating = Some(10.0);
        past_lives.genres = vec!["Drama".to_string(), "Romance".to_string()];
        past_lives.critic = Some("Glenn Kenny".to_string());
        past_lives.reviews = "Body.".to_string();

        let mut heat = base("https://www.rogerebert.com/reviews/heat-1995-review", "Heat");
        heat.year = 1995;
        heat.rating = Some(7.5);
        heat.genres = vec!["Drama".to_string(), "Crime".to_string()];
        heat.critic = Some("Roger Ebert".to_string());
        heat.review_date = Some("1995-12-15".to_string());

        let unrated = base("https://www.rogerebert.com/reviews/unknown-film-review", "Unknown");

        vec![past_lives, heat, unrated]
    }

    #[test]
    fn test_statistics_from_documents() {
        let stats = DocumentStatistics::from_documents(&sample_documents());

        assert_eq!(stats.total, 3);
        assert_eq!(stats.rated, 2);
        assert_eq!(stats.with_review_text, 1);
        assert_eq!(stats.with_critic, 2);
        assert_eq!(stats.with_review_date, 1);
        assert_eq!(stats.unknown_year, 1);
        assert_eq!(stats.average_rating, Some(8.75));
        assert_eq!(stats.year_range, Some((1995, 2023)));
        assert_eq!(stats.rating_histogram.get(&10), Some(&1));
        assert_eq!(stats.rating_histogram.get(&7), Some(&1));
        assert_eq!(stats.top_genres[0], ("Drama".to_string(), 2));
        assert_eq!(stats.top_genres[1], ("Crime".to_string(), 1));
    }

    #[test]
    fn test_statistics_of_empty_set() {
        let stats = DocumentStatistics::from_documents(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_rating, None);
        assert_eq!(stats.year_range, None);
        assert_eq!(stats.rated_percentage(), 0.0);
    }
}
