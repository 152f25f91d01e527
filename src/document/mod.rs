//! Review data model
//!
//! - `ListingEntry`: one review link discovered on a listing page
//! - `ReviewDetails`: the fields extracted from one review page
//! - `Document`: the canonical record persisted to the checkpoint and consumed
//!   by the downstream merge and indexing stages

mod builder;

pub use builder::{build_document, document_id, normalize_rating};

use serde::{Deserialize, Serialize};

/// Rating scale used when a review page does not state one
pub const DEFAULT_RATING_SCALE: f64 = 4.0;

/// A candidate review discovered on a listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    /// Anchor text of the link
    pub title: String,

    /// Canonical absolute URL of the review page (the dedup key)
    pub url: String,

    /// Release year guessed from the anchor text or teaser
    pub year: Option<i32>,

    /// Critic name, rarely known at this stage
    pub critic: Option<String>,

    /// Teaser text found next to the link, possibly empty
    pub summary: String,
}

/// Fields extracted from a single review page
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDetails {
    pub review_text: String,
    pub rating_value: Option<f64>,
    pub rating_scale: f64,
    pub review_date: Option<String>,
    pub critic: Option<String>,
    pub movie_year: Option<i32>,
    pub movie_title: Option<String>,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    pub cast: Vec<String>,
}

impl Default for ReviewDetails {
    fn default() -> Self {
        Self {
            review_text: String::new(),
            rating_value: None,
            rating_scale: DEFAULT_RATING_SCALE,
            review_date: None,
            critic: None,
            movie_year: None,
            movie_title: None,
            genres: Vec::new(),
            directors: Vec::new(),
            cast: Vec::new(),
        }
    }
}

/// A harvested review in the schema shared with the other collectors
///
/// Field names and types are a contract with the merge stage, which joins
/// records from several sources by key. Documents are written once and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// `{site}_{12 hex chars}`, derived from title, year and site
    pub id: String,
    pub title: String,

    /// Release year, 0 when unknown
    #[serde(default)]
    pub year: i32,
    pub site: String,

    /// Review page URL; unique across the whole document set
    pub url: String,

    /// Rating on a 0-10 scale
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub plot: String,

    /// Full review body
    #[serde(default)]
    pub reviews: String,

    /// Always null for this source; other collectors fill it
    #[serde(default)]
    pub num_reviews: Option<u32>,
    #[serde(default)]
    pub critic: Option<String>,
    #[serde(default)]
    pub review_date: Option<String>,

    /// Rating as published, before normalization
    #[serde(default)]
    pub rating_value: Option<f64>,
    #[serde(default = "default_rating_scale")]
    pub rating_scale: f64,

    /// Listing teaser, possibly empty
    #[serde(default)]
    pub summary: String,
}

fn default_rating_scale() -> f64 {
    DEFAULT_RATING_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_json_field_names() {
        let document = Document {
            id: "rogerebert_0123456789ab".to_string(),
            title: "Past Lives".to_string(),
            year: 2023,
            site: "rogerebert".to_string(),
            url: "https://www.rogerebert.com/reviews/past-lives-2023".to_string(),
            rating: Some(10.0),
            genres: vec!["Drama".to_string()],
            directors: vec!["Celine Song".to_string()],
            cast: vec![],
            plot: "plot".to_string(),
            reviews: "body".to_string(),
            num_reviews: None,
            critic: Some("Someone".to_string()),
            review_date: Some("2023-06-02".to_string()),
            rating_value: Some(4.0),
            rating_scale: 4.0,
            summary: String::new(),
        };

        let value = serde_json::to_value(&document).unwrap();
        for key in [
            "id",
            "title",
            "year",
            "site",
            "url",
            "rating",
            "genres",
            "directors",
            "cast",
            "plot",
            "reviews",
            "num_reviews",
            "critic",
            "review_date",
            "rating_value",
            "rating_scale",
            "summary",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert!(value["num_reviews"].is_null());
    }

    #[test]
    fn test_document_tolerates_sparse_records() {
        let json = r#"{
            "id": "rogerebert_aaaaaaaaaaaa",
            "title": "Old Record",
            "site": "rogerebert",
            "url": "https://www.rogerebert.com/reviews/old-record-1999"
        }"#;

        let document: Document = serde_json::from_str(json).unwrap();
        assert_eq!(document.year, 0);
        assert_eq!(document.rating, None);
        assert_eq!(document.rating_scale, DEFAULT_RATING_SCALE);
        assert!(document.genres.is_empty());
    }
}
