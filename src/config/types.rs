use crate::{ConfigError, ConfigResult};
use crate::crawler::DEFAULT_CANDIDATE_CAP;
use crate::document::DEFAULT_RATING_SCALE;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for Reel Harvester
///
/// Every section falls back to the RogerEbert.com profile, so an empty TOML file
/// (or no file at all) yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Description of the review site being harvested
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Site name, stored on every document and mixed into document ids
    pub name: String,

    /// Origin of the site; only listing pages on this origin are followed
    pub base_url: String,

    /// Entry listing pages, absolute or relative to `base_url`
    pub seeds: Vec<String>,

    /// Path of the N-th listing page, `{page}` is replaced by the page number
    pub listing_page_template: String,

    /// Path prefix shared by all review pages
    pub review_path_prefix: String,

    /// Minimum number of hyphen-separated tokens in a review slug
    pub min_slug_tokens: usize,

    /// Native scale of the site's star ratings
    pub rating_scale: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "rogerebert".to_string(),
            base_url: "https://www.rogerebert.com".to_string(),
            seeds: vec!["/".to_string(), "/reviews".to_string()],
            listing_page_template: "/reviews/page/{page}".to_string(),
            review_path_prefix: "/reviews/".to_string(),
            min_slug_tokens: 3,
            rating_scale: DEFAULT_RATING_SCALE,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of new documents to collect in one session
    pub limit: usize,

    /// Listing page to start from (1 means "just the seeds")
    pub start_page: u32,

    /// Seconds to wait before every listing page request
    pub listing_delay_secs: f64,

    /// Seconds to wait before every review page request
    pub detail_delay_secs: f64,

    /// Upper bound on candidates taken from a single listing page
    pub max_candidates_per_page: usize,

    /// Number of newly accepted documents between checkpoints
    pub checkpoint_every: usize,

    /// Consult robots.txt before fetching
    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            start_page: 1,
            listing_delay_secs: 2.0,
            detail_delay_secs: 1.0,
            max_candidates_per_page: DEFAULT_CANDIDATE_CAP,
            checkpoint_every: 10,
            respect_robots: false,
        }
    }
}

/// Request identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,

    /// Sent as the Referer header; empty disables it
    pub referer: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/123.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: "https://www.rogerebert.com/reviews".to_string(),
            timeout_secs: 20,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the JSON checkpoint holding every collected document
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/raw/rogerebert_reviews.json"),
        }
    }
}

/// Values given on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub limit: Option<usize>,
    pub start_page: Option<u32>,
    pub listing_delay_secs: Option<f64>,
    pub detail_delay_secs: Option<f64>,
    pub output: Option<PathBuf>,
}

impl Config {
    /// Applies command-line overrides on top of this configuration
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(limit) = overrides.limit {
            self.crawler.limit = limit;
        }
        if let Some(start_page) = overrides.start_page {
            self.crawler.start_page = start_page;
        }
        if let Some(delay) = overrides.listing_delay_secs {
            self.crawler.listing_delay_secs = delay;
        }
        if let Some(delay) = overrides.detail_delay_secs {
            self.crawler.detail_delay_secs = delay;
        }
        if let Some(path) = &overrides.output {
            self.output.path = path.clone();
        }
        self
    }

    /// Parses the site's base URL
    pub fn base_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.site.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", self.site.base_url, e))
        })
    }

    /// Resolves the configured seeds against the base URL, in order
    pub fn seed_urls(&self) -> ConfigResult<Vec<Url>> {
        let base = self.base_url()?;
        self.site
            .seeds
            .iter()
            .map(|seed| {
                base.join(seed).map_err(|e| {
                    ConfigError::InvalidUrl(format!("Invalid seed '{}': {}", seed, e))
                })
            })
            .collect()
    }

    /// URL of the requested starting listing page, if one was requested
    pub fn start_page_url(&self) -> ConfigResult<Option<Url>> {
        if self.crawler.start_page <= 1 {
            return Ok(None);
        }

        let path = self
            .site
            .listing_page_template
            .replace("{page}", &self.crawler.start_page.to_string());
        let base = self.base_url()?;
        base.join(&path).map(Some).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid start page path '{}': {}", path, e))
        })
    }

    /// Politeness delay before listing page requests
    pub fn listing_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.crawler.listing_delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Politeness delay before review page requests
    pub fn detail_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.crawler.detail_delay_secs).unwrap_or(Duration::ZERO)
    }
}
