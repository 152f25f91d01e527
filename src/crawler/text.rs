//! Text helpers shared by the listing parser and the review extractor

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// A four-digit year between 1900 and 2099 not embedded in a longer number
static YEAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn year_pattern() -> &'static Regex {
    YEAR_PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|\D)((?:19|20)\d{2})(?:\D|$)").expect("year pattern is valid")
    })
}

/// Collapses runs of whitespace into single spaces and trims both ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Finds the first plausible release year in the text
pub fn extract_year(text: &str) -> Option<i32> {
    year_pattern()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|year| year.as_str().parse().ok())
}

/// Splits a delimited list, trimming items and dropping empty ones
pub fn split_list(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a CSS selector, None if the selector is invalid
pub fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Concatenated text of an element, whitespace-normalized
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Text nodes of an element joined with spaces, whitespace-normalized
///
/// Keeps words in adjacent inline elements apart (`<b>Two</b><i>Words</i>`).
pub fn element_text_spaced(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first element matching `css`, if it has any
pub fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Trimmed value of an attribute on the first element matching `css`
pub fn first_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr(attr)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Nearest ancestor element with the given tag name
pub fn closest_ancestor<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == tag)
}
