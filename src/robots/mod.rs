//! Robots.txt handling module
//!
//! Checking robots.txt is optional (`respect-robots` in the crawler
//! settings). When enabled, the site's robots.txt is fetched once at the start
//! of a crawl and every listing and review URL is checked before it is fetched.

mod parser;

pub use parser::{product_token, ParsedRobots};

use reqwest::Client;
use url::Url;

/// Fetches and parses robots.txt for a site
///
/// Any failure (network error, non-success status, unreadable body) yields a
/// permissive result so the crawl can proceed.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `site` - Any URL on the site; only its origin is used
pub async fn fetch_robots(client: &Client, site: &Url) -> ParsedRobots {
    let robots_url = match site.join("/robots.txt") {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Cannot build robots.txt URL for {}: {}", site, e);
            return ParsedRobots::allow_all();
        }
    };

    let response = match client.get(robots_url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::info!(
            "No usable robots.txt at {} (HTTP {}), allowing all",
            robots_url,
            response.status().as_u16()
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            tracing::debug!("Loaded robots.txt from {} ({} bytes)", robots_url, body.len());
            ParsedRobots::from_content(&body)
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

/// Per-crawl robots.txt check bound to one user agent
#[derive(Debug, Clone)]
pub struct RobotsGate {
    robots: ParsedRobots,
    agent: String,
}

impl RobotsGate {
    /// Creates a gate checking URLs as the product token of `user_agent`
    pub fn new(robots: ParsedRobots, user_agent: &str) -> Self {
        Self {
            robots,
            agent: product_token(user_agent).to_string(),
        }
    }

    /// Checks if a URL is allowed by robots.txt
    pub fn is_allowed(&self, url: &Url) -> bool {
        self.robots.is_allowed(url, &self.agent)
    }
}
