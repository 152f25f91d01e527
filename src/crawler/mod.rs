//! Crawler module for review harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with fixed politeness delays
//! - Listing page parsing and pagination discovery
//! - Field extraction from review pages
//! - Overall crawl coordination

mod coordinator;
mod detail;
mod fetcher;
mod listing;
mod rules;
mod text;

pub use coordinator::{run_crawl, seed_frontier, Coordinator};
pub use detail::{extract_details, DetailRules};
pub use fetcher::{build_http_client, fetch_url, FetchKind, FetchResult, Fetcher};
pub use listing::{ListingPage, ListingParser, DEFAULT_CANDIDATE_CAP, UNTITLED_REVIEW};
pub use rules::{FieldRule, Probe};
pub use text::{clean_text, extract_year};
