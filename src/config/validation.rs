use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site profile
fn validate_site_config(site: &SiteConfig) -> Result<(), ConfigError> {
    if site.name.trim().is_empty() {
        return Err(ConfigError::Validation("site name cannot be empty".to_string()));
    }

    let base = Url::parse(&site.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use HTTP or HTTPS",
            site.base_url
        )));
    }

    if base.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            site.base_url
        )));
    }

    for seed in &site.seeds {
        let resolved = base.join(seed).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed '{}': {}", seed, e))
        })?;

        if resolved.origin() != base.origin() {
            return Err(ConfigError::Validation(format!(
                "Seed '{}' is not on the site origin {}",
                seed,
                base.origin().ascii_serialization()
            )));
        }
    }

    if !site.listing_page_template.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "listing-page-template must contain '{{page}}', got '{}'",
            site.listing_page_template
        )));
    }

    if !site.review_path_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "review-path-prefix must start with '/', got '{}'",
            site.review_path_prefix
        )));
    }

    if site.min_slug_tokens < 1 {
        return Err(ConfigError::Validation(
            "min-slug-tokens must be >= 1".to_string(),
        ));
    }

    if !site.rating_scale.is_finite() || site.rating_scale <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "rating-scale must be a positive number, got {}",
            site.rating_scale
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_delay("listing-delay-secs", config.listing_delay_secs)?;
    validate_delay("detail-delay-secs", config.detail_delay_secs)?;

    if config.max_candidates_per_page < 1 {
        return Err(ConfigError::Validation(
            "max-candidates-per-page must be >= 1".to_string(),
        ));
    }

    if config.checkpoint_every < 1 {
        return Err(ConfigError::Validation(
            "checkpoint-every must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_delay(name: &str, seconds: f64) -> Result<(), ConfigError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, seconds
        )));
    }
    Ok(())
}

/// Validates request headers and timeout
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("user-agent", &config.user_agent),
        ("accept", &config.accept),
        ("accept-language", &config.accept_language),
        ("referer", &config.referer),
    ] {
        if HeaderValue::from_str(value).is_err() {
            return Err(ConfigError::Validation(format!(
                "{} is not a valid header value: '{}'",
                name, value
            )));
        }
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
