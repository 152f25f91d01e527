//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building an HTTP client that presents browser-like request headers
//! - Pacing requests with a fixed delay per page kind
//! - GET requests to fetch page content
//! - Error classification

use crate::config::HttpConfig;
use crate::HarvestError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The server refused the request (403 or 429)
    Blocked {
        /// The HTTP status code
        status_code: u16,
    },

    /// Any other non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// What kind of page is being requested, which selects the pacing delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Listing,
    Detail,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(HarvestError)` - A header value is invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use reel_harvester::config::HttpConfig;
/// use reel_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, ACCEPT, &config.accept)?;
    insert_header(&mut headers, ACCEPT_LANGUAGE, &config.accept_language)?;
    insert_header(&mut headers, REFERER, &config.referer)?;

    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Adds a default header, skipping empty values
fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), HarvestError> {
    if value.is_empty() {
        return Ok(());
    }

    let header_value = HeaderValue::from_str(value).map_err(|e| HarvestError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    headers.insert(name, header_value);
    Ok(())
}

/// Fetches pages with a fixed pause before every request
///
/// Listing pages and review pages have separate delays. A zero delay
/// disables pacing entirely.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    listing_delay: Duration,
    detail_delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, listing_delay: Duration, detail_delay: Duration) -> Self {
        Self {
            client,
            listing_delay,
            detail_delay,
        }
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sleeps for the delay of `kind`, then fetches `url`
    pub async fn fetch(&self, url: &Url, kind: FetchKind) -> FetchResult {
        let delay = match kind {
            FetchKind::Listing => self.listing_delay,
            FetchKind::Detail => self.detail_delay,
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        fetch_url(&self.client, url.as_str()).await
    }
}

/// Fetches a URL and classifies the outcome
///
/// # Outcome Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 403, 429 | Blocked |
/// | Other HTTP status | HttpError |
/// | Timeout, connection failure, unreadable body | NetworkError |
///
/// Redirects are followed by the client. Failures are logged here and never
/// returned as errors, so one bad page cannot stop a crawl.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            tracing::warn!("Request failed for {}: {}", url, error);
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            "HTTP {} for {} (possible blocking)",
            status.as_u16(),
            url
        );
        return FetchResult::Blocked {
            status_code: status.as_u16(),
        };
    }

    if !status.is_success() {
        tracing::warn!("HTTP {} for {}", status.as_u16(), url);
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => {
            tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());
            FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                body,
            }
        }
        Err(e) => {
            tracing::warn!("Failed to read body of {}: {}", url, e);
            FetchResult::NetworkError {
                error: e.to_string(),
            }
        }
    }
}
