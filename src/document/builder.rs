use crate::document::{Document, ListingEntry, ReviewDetails};
use sha2::{Digest, Sha256};

/// Number of hex characters of the hash kept in a document id
const ID_HASH_LEN: usize = 12;

/// Merges listing and review page data into a canonical document
///
/// # Merge Rules
///
/// | Field | Source |
/// |-------|--------|
/// | title, year | review page if present, else listing |
/// | rating | review page, normalized to 0-10 |
/// | plot | listing teaser if non-empty, else review body |
/// | critic | review page if present, else listing |
/// | url | listing (the canonical dedup key) |
pub fn build_document(entry: &ListingEntry, details: &ReviewDetails, site: &str) -> Document {
    let title = details
        .movie_title
        .clone()
        .unwrap_or_else(|| entry.title.clone());
    let year = details.movie_year.or(entry.year).unwrap_or(0);

    let rating = details
        .rating_value
        .and_then(|value| normalize_rating(value, details.rating_scale));

    let plot = if entry.summary.is_empty() {
        details.review_text.clone()
    } else {
        entry.summary.clone()
    };

    Document {
        id: document_id(&title, year, site),
        title,
        year,
        site: site.to_string(),
        url: entry.url.clone(),
        rating,
        genres: details.genres.clone(),
        directors: details.directors.clone(),
        cast: details.cast.clone(),
        plot,
        reviews: details.review_text.clone(),
        num_reviews: None,
        critic: details.critic.clone().or_else(|| entry.critic.clone()),
        review_date: details.review_date.clone(),
        rating_value: details.rating_value,
        rating_scale: details.rating_scale,
        summary: entry.summary.clone(),
    }
}

const RATING_ROUNDING_EPSILON: f64 = 1e-9;

/// Converts a rating on `scale` to the 0-10 scale, rounded to one decimal
///
/// Returns None when the scale is not a positive number.
///
/// # Examples
///
/// ```
/// use reel_harvester::document::normalize_rating;
///
/// assert_eq!(normalize_rating(3.0, 4.0), Some(7.5));
/// assert_eq!(normalize_rating(4.0, 5.0), Some(8.0));
/// assert_eq!(normalize_rating(3.0, 0.0), None);
/// ```
pub fn normalize_rating(value: f64, scale: f64) -> Option<f64> {
    if !scale.is_finite() || scale <= 0.0 || !value.is_finite() {
        return None;
    }

    // Midpoints must round up even when the division lands one ulp short
    let tenths = value / scale * 100.0;
    Some((tenths + RATING_ROUNDING_EPSILON).round() / 10.0)
}

/// Derives the stable document id for a title, year and site
///
/// The id is the site name followed by the first 12 hex characters of the
/// SHA-256 digest of `"{title}_{year}_{site}"`.
///
/// # Examples
///
/// ```
/// use reel_harvester::document::document_id;
///
/// let id = document_id("Past Lives", 2023, "rogerebert");
/// assert!(id.starts_with("rogerebert_"));
/// assert_eq!(id.len(), "rogerebert_".len() + 12);
/// assert_eq!(id, document_id("Past Lives", 2023, "rogerebert"));
/// ```
pub fn document_id(title: &str, year: i32, site: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}_{}_{}", title, year, site).as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}_{}", site, &digest[..ID_HASH_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DEFAULT_RATING_SCALE;
    use std::collections::HashSet;

    fn entry() -> ListingEntry {
        ListingEntry {
            title: "Past Lives movie review".to_string(),
            url: "https://www.rogerebert.com/reviews/past-lives-2023".to_string(),
            year: Some(2022),
            critic: Some("Listing Critic".to_string()),
            summary: "A teaser.".to_string(),
        }
    }

    fn details() -> ReviewDetails {
        ReviewDetails {
            review_text: "Full review text.".to_string(),
            rating_value: Some(4.0),
            rating_scale: DEFAULT_RATING_SCALE,
            review_date: Some("2023-06-02".to_string()),
            critic: Some("Page Critic".to_string()),
            movie_year: Some(2023),
            movie_title: Some("Past Lives".to_string()),
            genres: vec!["Drama".to_string(), "Romance".to_string()],
            directors: vec!["Celine Song".to_string()],
            cast: vec!["Greta Lee".to_string(), "Teo Yoo".to_string()],
        }
    }

    #[test]
    fn test_detail_values_win_over_listing() {
        let document = build_document(&entry(), &details(), "rogerebert");
        assert_eq!(document.title, "Past Lives");
        assert_eq!(document.year, 2023);
        assert_eq!(document.critic.as_deref(), Some("Page Critic"));
        assert_eq!(document.url, entry().url);
    }

    #[test]
    fn test_listing_values_fill_gaps() {
        let mut details = details();
        details.movie_title = None;
        details.movie_year = None;
        details.critic = None;

        let document = build_document(&entry(), &details, "rogerebert");
        assert_eq!(document.title, "Past Lives movie review");
        assert_eq!(document.year, 2022);
        assert_eq!(document.critic.as_deref(), Some("Listing Critic"));
    }

    #[test]
    fn test_unknown_year_is_zero() {
        let mut entry = entry();
        entry.year = None;
        let mut details = details();
        details.movie_year = None;

        let document = build_document(&entry, &details, "rogerebert");
        assert_eq!(document.year, 0);
        assert_eq!(document.id, document_id(&document.title, 0, "rogerebert"));
    }

    #[test]
    fn test_plot_prefers_teaser() {
        let document = build_document(&entry(), &details(), "rogerebert");
        assert_eq!(document.plot, "A teaser.");
        assert_eq!(document.summary, "A teaser.");
        assert_eq!(document.reviews, "Full review text.");

        let mut entry = entry();
        entry.summary = String::new();
        let document = build_document(&entry, &details(), "rogerebert");
        assert_eq!(document.plot, "Full review text.");
    }

    #[test]
    fn test_rating_normalized_and_raw_value_kept() {
        let document = build_document(&entry(), &details(), "rogerebert");
        assert_eq!(document.rating, Some(10.0));
        assert_eq!(document.rating_value, Some(4.0));
        assert_eq!(document.rating_scale, 4.0);
    }

    #[test]
    fn test_missing_rating_stays_absent() {
        let mut details = details();
        details.rating_value = None;
        let document = build_document(&entry(), &details, "rogerebert");
        assert_eq!(document.rating, None);
        assert_eq!(document.title, "Past Lives");
        assert_eq!(document.genres.len(), 2);
    }

    #[test]
    fn test_normalize_rating_values() {
        assert_eq!(normalize_rating(0.0, 4.0), Some(0.0));
        assert_eq!(normalize_rating(2.5, 4.0), Some(6.3));
        assert_eq!(normalize_rating(3.5, 4.0), Some(8.8));
        assert_eq!(normalize_rating(4.0, 4.0), Some(10.0));
        assert_eq!(normalize_rating(7.0, 10.0), Some(7.0));
    }

    #[test]
    fn test_normalize_rating_rejects_bad_scale() {
        assert_eq!(normalize_rating(3.0, 0.0), None);
        assert_eq!(normalize_rating(3.0, -4.0), None);
        assert_eq!(normalize_rating(f64::NAN, 4.0), None);
    }

    #[test]
    fn test_normalize_rating_is_scale_invariant() {
        let ratings = (0..=8).map(|half_stars| half_stars as f64 / 2.0);
        for rating in ratings {
            for k in [0.3, 0.5, 0.7, 1.1, 2.0, 2.5, 3.0, 4.0, 10.0] {
                assert_eq!(
                    normalize_rating(rating, 4.0),
                    normalize_rating(rating * k, 4.0 * k),
                    "rating {} scaled by {}",
                    rating,
                    k
                );
            }
        }
    }

    #[test]
    fn test_normalize_rating_midpoints_round_up() {
        assert_eq!(normalize_rating(1.5, 4.0), Some(3.8));
        assert_eq!(normalize_rating(1.5 * 0.7, 4.0 * 0.7), Some(3.8));
        assert_eq!(normalize_rating(0.5, 4.0), Some(1.3));
        assert_eq!(normalize_rating(0.5 * 1.1, 4.0 * 1.1), Some(1.3));
    }

    #[test]
    fn test_document_id_is_deterministic() {
        let a = document_id("Past Lives", 2023, "rogerebert");
        let b = document_id("Past Lives", 2023, "rogerebert");
        assert_eq!(a, b);
        assert!(a.starts_with("rogerebert_"));
        assert!(a["rogerebert_".len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_document_id_distinguishes_inputs() {
        let ids: HashSet<String> = [
            ("Past Lives", 2023, "rogerebert"),
            ("Past Lives", 2022, "rogerebert"),
            ("Past Lives", 2023, "imdb"),
            ("Past Life", 2023, "rogerebert"),
            ("Oppenheimer", 2023, "rogerebert"),
        ]
        .iter()
        .map(|(title, year, site)| document_id(title, *year, site))
        .collect();

        assert_eq!(ids.len(), 5);
    }
}
