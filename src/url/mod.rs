//! URL handling module for Reel Harvester
//!
//! This module provides canonicalization of discovered links, resolution of
//! relative hrefs and recognition of review-page URLs.

mod matcher;
mod normalize;

pub use matcher::{is_same_origin, ReviewPathMatcher};
pub use normalize::{canonicalize_url, resolve_link};
