//! Review page extraction
//!
//! Turns a fetched review page into `ReviewDetails`. Each field has its own
//! cascade of probes (see `rules`); a field that cannot be found is left empty
//! and never prevents the other fields from being extracted.
//!
//! # Probe Order
//!
//! | Field | Probes |
//! |-------|--------|
//! | rating | `itemprop=ratingValue` meta, `starNN` class on the star box, `data-rating` widget |
//! | date | `itemprop=datePublished` meta, `og:updated_time` date part, visible date label |
//! | critic | author meta, contributor profile link, byline |
//! | title | `h1.page-title`, first `h1` |
//! | summary | deck element, description meta |
//! | genres | genre links of the primary credit column, labelled metadata pairs |
//! | directors | "Directed by"/"Director" credit section, labelled metadata pairs |
//! | cast | "Cast" credit section |
//! | body | paragraphs of the first known content container |

use crate::crawler::rules::FieldRule;
use crate::crawler::text::{
    clean_text, closest_ancestor, element_text, element_text_spaced, extract_year, first_attr,
    first_text, selector, split_list,
};
use crate::document::{ReviewDetails, DEFAULT_RATING_SCALE};
use scraper::{ElementRef, Html};

const GENRE_LABELS: &[&str] = &["genre", "genres"];
const DIRECTOR_LABELS: &[&str] = &["directed by", "director"];
const CAST_LABELS: &[&str] = &["cast"];

/// Content containers holding the review body, most specific first
const BODY_CONTAINERS: &[&str] = &["div.review__body", "div.article-body", "div.entry-content"];

/// Site navigation label that shows up among genre links
const GENRE_NOISE: &str = "movie reviews";

/// Extraction rules for every review page field
#[derive(Debug, Clone)]
pub struct DetailRules {
    pub rating: FieldRule<f64>,
    pub date: FieldRule<String>,
    pub critic: FieldRule<String>,
    pub title: FieldRule<String>,
    pub summary: FieldRule<String>,
    pub genres: FieldRule<Vec<String>>,
    pub directors: FieldRule<Vec<String>>,
    pub cast: FieldRule<Vec<String>>,
    pub body: FieldRule<String>,

    /// Scale the site's ratings are published on
    pub rating_scale: f64,
}

impl Default for DetailRules {
    fn default() -> Self {
        Self {
            rating: FieldRule::new("rating")
                .then(rating_from_meta)
                .then(rating_from_star_class)
                .then(rating_from_widget),
            date: FieldRule::new("review_date")
                .then(date_from_meta)
                .then(date_from_updated_time)
                .then(date_from_label),
            critic: FieldRule::new("critic")
                .then(critic_from_meta)
                .then(critic_from_contributor_link)
                .then(critic_from_byline),
            title: FieldRule::new("title")
                .then(title_from_page_title)
                .then(title_from_heading),
            summary: FieldRule::new("summary")
                .then(summary_from_deck)
                .then(summary_from_description),
            genres: FieldRule::new("genres")
                .then(genres_from_credit_column)
                .then(genres_from_metadata),
            directors: FieldRule::new("directors")
                .then(directors_from_credits)
                .then(directors_from_metadata),
            cast: FieldRule::new("cast").then(cast_from_credits),
            body: FieldRule::new("review_body").then(body_from_containers),
            rating_scale: DEFAULT_RATING_SCALE,
        }
    }
}

impl DetailRules {
    /// Default rules for a site publishing ratings on `rating_scale`
    pub fn with_rating_scale(rating_scale: f64) -> Self {
        Self {
            rating_scale,
            ..Self::default()
        }
    }

    /// Extracts all fields from the HTML of a review page
    pub fn extract(&self, html: &str) -> ReviewDetails {
        let document = Html::parse_document(html);
        self.extract_from(&document)
    }

    /// Extracts all fields from an already parsed review page
    pub fn extract_from(&self, document: &Html) -> ReviewDetails {
        let movie_title = self.title.apply(document);
        let movie_year = movie_title.as_deref().and_then(extract_year);
        let summary = self.summary.apply(document).unwrap_or_default();
        let body = self.body.apply(document).unwrap_or_default();

        ReviewDetails {
            review_text: if body.is_empty() { summary } else { body },
            rating_value: self.rating.apply(document),
            rating_scale: self.rating_scale,
            review_date: self.date.apply(document),
            critic: self.critic.apply(document),
            movie_year,
            movie_title,
            genres: self.genres.apply(document).unwrap_or_default(),
            directors: self.directors.apply(document).unwrap_or_default(),
            cast: self.cast.apply(document).unwrap_or_default(),
        }
    }
}

/// Extracts review details using the default rules
pub fn extract_details(html: &str) -> ReviewDetails {
    DetailRules::default().extract(html)
}

// ===== Rating =====

fn rating_from_meta(document: &Html) -> Option<f64> {
    first_attr(document, r#"meta[itemprop="ratingValue"]"#, "content").and_then(parse_rating)
}

/// `<img class="filled star25">` encodes 2.5 stars
fn rating_from_star_class(document: &Html) -> Option<f64> {
    let selector = selector("div.star-box img.filled")?;
    let star = document.select(&selector).next()?;

    star.value().classes().find_map(|class| {
        let tenths = class.strip_prefix("star")?;
        if tenths.is_empty() || !tenths.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        tenths.parse::<f64>().ok().map(|value| value / 10.0)
    })
}

fn rating_from_widget(document: &Html) -> Option<f64> {
    first_attr(document, "span.star-rating[data-rating]", "data-rating").and_then(parse_rating)
}

fn parse_rating(raw: String) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

// ===== Date =====

fn date_from_meta(document: &Html) -> Option<String> {
    first_attr(document, r#"meta[itemprop="datePublished"]"#, "content")
}

/// Keeps the date portion of an ISO timestamp
fn date_from_updated_time(document: &Html) -> Option<String> {
    let timestamp = first_attr(document, r#"meta[property="og:updated_time"]"#, "content")?;
    timestamp
        .split('T')
        .next()
        .map(str::to_string)
        .filter(|date| !date.is_empty())
}

fn date_from_label(document: &Html) -> Option<String> {
    first_text(document, "span.review-info__date")
        .or_else(|| first_text(document, "span.publish-date"))
}

// ===== Critic =====

fn critic_from_meta(document: &Html) -> Option<String> {
    first_attr(document, r#"meta[name="author"]"#, "content").map(|name| clean_text(&name))
}

fn critic_from_contributor_link(document: &Html) -> Option<String> {
    first_text(document, r#"a[href*="/contributors/"]"#)
}

fn critic_from_byline(document: &Html) -> Option<String> {
    first_text(document, ".byline__name").or_else(|| first_text(document, "a.author"))
}

// ===== Title =====

fn title_from_page_title(document: &Html) -> Option<String> {
    first_text(document, "h1.page-title")
}

fn title_from_heading(document: &Html) -> Option<String> {
    first_text(document, "h1")
}

// ===== Summary =====

fn summary_from_deck(document: &Html) -> Option<String> {
    [".review-info__deck", ".article-info__deck"]
        .iter()
        .find_map(|css| {
            let selector = selector(css)?;
            document.select(&selector).next().map(element_text_spaced)
        })
        .filter(|text| !text.is_empty())
}

fn summary_from_description(document: &Html) -> Option<String> {
    first_attr(document, r#"meta[name="description"]"#, "content")
        .or_else(|| first_attr(document, r#"meta[property="og:description"]"#, "content"))
        .map(|description| clean_text(&description))
}

// ===== Credits =====

/// The credit column whose heading carries the film title
fn primary_credit_column(document: &Html) -> Option<ElementRef<'_>> {
    let container_selector = selector("#content-lower")?;
    let heading_selector = selector(".credit-col h4.page-title")?;

    let container = document.select(&container_selector).next()?;
    let heading = container.select(&heading_selector).next()?;
    closest_ancestor(heading, "div")
}

fn genres_from_credit_column(document: &Html) -> Option<Vec<String>> {
    let column = primary_credit_column(document)?;
    let link_selector = selector(r#"a[href*="/genre/"]"#)?;

    let mut genres: Vec<String> = Vec::new();
    for link in column.select(&link_selector) {
        let text = element_text(link);
        if text.is_empty() || text.to_lowercase() == GENRE_NOISE {
            continue;
        }
        if !genres.contains(&text) {
            genres.push(text);
        }
    }

    non_empty(genres)
}

fn genres_from_metadata(document: &Html) -> Option<Vec<String>> {
    non_empty(metadata_list(document, GENRE_LABELS))
        .or_else(|| non_empty(credit_list(document, GENRE_LABELS)))
}

fn directors_from_credits(document: &Html) -> Option<Vec<String>> {
    non_empty(credit_list(document, DIRECTOR_LABELS))
}

fn directors_from_metadata(document: &Html) -> Option<Vec<String>> {
    non_empty(metadata_list(document, DIRECTOR_LABELS))
}

fn cast_from_credits(document: &Html) -> Option<Vec<String>> {
    non_empty(credit_list(document, CAST_LABELS))
}

/// Entries of every credit-column section whose heading is one of `labels`
///
/// Linked names are preferred; sections without links contribute the text of
/// their list items instead.
fn credit_list(document: &Html, labels: &[&str]) -> Vec<String> {
    let (Some(column_selector), Some(heading_selector), Some(link_selector), Some(item_selector)) = (
        selector("#content-lower .credit-col"),
        selector("h4"),
        selector("li a"),
        selector("li"),
    ) else {
        return Vec::new();
    };

    let mut values = Vec::new();
    for column in document.select(&column_selector) {
        let Some(heading) = column.select(&heading_selector).next() else {
            continue;
        };
        if !label_matches(&element_text(heading), labels) {
            continue;
        }

        let links: Vec<String> = column
            .select(&link_selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();

        if links.is_empty() {
            values.extend(
                column
                    .select(&item_selector)
                    .map(element_text_spaced)
                    .filter(|text| !text.is_empty()),
            );
        } else {
            values.extend(links);
        }
    }

    values
}

/// Values of `label: value` metadata items whose label is one of `labels`
///
/// A value may list several entries, either as separate elements or comma
/// separated.
fn metadata_list(document: &Html, labels: &[&str]) -> Vec<String> {
    let (Some(item_selector), Some(label_selector), Some(value_selector)) = (
        selector("div.review-info__item"),
        selector("span.review-info__label"),
        selector("span.review-info__value"),
    ) else {
        return Vec::new();
    };

    let mut values = Vec::new();
    for item in document.select(&item_selector) {
        let (Some(label), Some(value)) = (
            item.select(&label_selector).next(),
            item.select(&value_selector).next(),
        ) else {
            continue;
        };
        if !label_matches(&element_text(label), labels) {
            continue;
        }

        let raw = value
            .text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        values.extend(split_list(&raw, ','));
    }

    values
}

fn label_matches(label: &str, labels: &[&str]) -> bool {
    let label = label.trim_end_matches(':').trim().to_lowercase();
    labels.iter().any(|candidate| *candidate == label)
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

// ===== Body =====

/// Paragraphs of the first content container present on the page
///
/// A container that exists but holds no text still wins and yields an empty
/// body.
fn body_from_containers(document: &Html) -> Option<String> {
    let paragraph_selector = selector("p")?;
    let container = BODY_CONTAINERS.iter().find_map(|css| {
        let selector = selector(css)?;
        document.select(&selector).next()
    })?;

    let paragraphs: Vec<String> = container
        .select(&paragraph_selector)
        .map(element_text_spaced)
        .filter(|text| !text.is_empty())
        .collect();

    Some(paragraphs.join(" "))
}
