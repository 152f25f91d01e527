//! Listing page parser
//!
//! Extracts candidate review links and further listing pages from a fetched
//! listing page.
//!
//! # Pagination Discovery
//!
//! Three independent strategies are tried and their results are merged:
//!
//! 1. `<link rel="next">` in the document head
//! 2. a visible "next" control (`a[rel~=next]` or `.pagination__next a`)
//! 3. an anchor whose text reads like "Load more" / "More reviews"
//!
//! Only URLs on the site's own origin are kept.

use crate::crawler::text::{
    closest_ancestor, element_text, extract_year, first_attr, selector,
};
use crate::document::ListingEntry;
use crate::url::{is_same_origin, resolve_link, ReviewPathMatcher};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

/// Title used for review links without anchor text
pub const UNTITLED_REVIEW: &str = "Untitled Review";

/// Default upper bound on candidates taken from one listing page
pub const DEFAULT_CANDIDATE_CAP: usize = 50;

static LOAD_MORE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn load_more_pattern() -> &'static Regex {
    LOAD_MORE_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:load\s+more|more\s+reviews)\b").expect("load-more pattern is valid")
    })
}

/// Everything extracted from one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Candidate reviews in document order, without duplicates
    pub entries: Vec<ListingEntry>,

    /// Further listing pages on the site's origin, without duplicates
    pub next_urls: Vec<Url>,
}

/// Parser for the listing pages of one site
#[derive(Debug, Clone)]
pub struct ListingParser {
    matcher: ReviewPathMatcher,
    candidate_cap: usize,
}

impl ListingParser {
    /// Creates a parser accepting links recognized by `matcher`
    pub fn new(matcher: ReviewPathMatcher, candidate_cap: usize) -> Self {
        Self {
            matcher,
            candidate_cap,
        }
    }

    /// Parses a listing page fetched from `page_url`
    ///
    /// Relative links are resolved against `page_url`. A page without any
    /// review links yields an empty entry list; that is not an error.
    pub fn parse(&self, html: &str, page_url: &Url) -> ListingPage {
        let document = Html::parse_document(html);

        ListingPage {
            entries: self.extract_entries(&document, page_url),
            next_urls: self.extract_next_urls(&document, page_url),
        }
    }

    /// Collects candidate review entries, first occurrence of each URL wins
    fn extract_entries(&self, document: &Html, page_url: &Url) -> Vec<ListingEntry> {
        let Some(anchor_selector) = selector("a[href]") else {
            return Vec::new();
        };

        let mut entries = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for anchor in document.select(&anchor_selector) {
            if entries.len() >= self.candidate_cap {
                tracing::debug!(
                    "Candidate cap of {} reached on {}",
                    self.candidate_cap,
                    page_url
                );
                break;
            }

            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(review_url) = resolve_link(href, page_url) else {
                continue;
            };
            if !self.matcher.matches(&review_url) {
                continue;
            }
            if !seen.insert(review_url.to_string()) {
                continue;
            }

            let mut title = element_text(anchor);
            if title.is_empty() {
                title = UNTITLED_REVIEW.to_string();
            }
            let summary = teaser_near(anchor);
            let year = extract_year(&title).or_else(|| extract_year(&summary));

            entries.push(ListingEntry {
                title,
                url: review_url.to_string(),
                year,
                critic: None,
                summary,
            });
        }

        entries
    }

    /// Union of the three pagination strategies, restricted to the site origin
    fn extract_next_urls(&self, document: &Html, page_url: &Url) -> Vec<Url> {
        let head_next = first_attr(document, r#"link[rel~="next"][href]"#, "href");
        let control_next = first_attr(document, r#"a[rel~="next"][href]"#, "href")
            .or_else(|| first_attr(document, ".pagination__next a[href]", "href"));
        let load_more = load_more_href(document);

        let mut seen: HashSet<String> = HashSet::new();
        [head_next, control_next, load_more]
            .into_iter()
            .flatten()
            .filter_map(|href| resolve_link(&href, page_url))
            .filter(|url| is_same_origin(url, self.matcher.site()))
            .filter(|url| seen.insert(url.to_string()))
            .collect()
    }
}

/// Teaser text near a review link
///
/// Looks in the closest `article` ancestor, or failing that the closest `div`,
/// for a dedicated teaser element and then for the first paragraph.
fn teaser_near(anchor: ElementRef<'_>) -> String {
    let Some(container) =
        closest_ancestor(anchor, "article").or_else(|| closest_ancestor(anchor, "div"))
    else {
        return String::new();
    };

    [".review-stack__tease", "p"]
        .iter()
        .find_map(|css| {
            let selector = selector(css)?;
            container.select(&selector).next()
        })
        .map(element_text)
        .unwrap_or_default()
}

/// href of the first anchor labelled like a "load more" button
fn load_more_href(document: &Html) -> Option<String> {
    let anchor_selector = selector("a[href]")?;
    document
        .select(&anchor_selector)
        .find(|anchor| load_more_pattern().is_match(&element_text(*anchor)))
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}
