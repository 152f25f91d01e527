use url::Url;

/// Recognizes the URLs of individual review pages on one site
///
/// A URL is a review URL when it is on the site's origin, its path starts with
/// the review prefix and its final path segment is a slug of at least
/// `min_slug_tokens` hyphen-separated tokens. The slug requirement keeps
/// section pages such as `/reviews/page/2` or `/reviews/great-movies` out.
#[derive(Debug, Clone)]
pub struct ReviewPathMatcher {
    site: Url,
    prefix: String,
    min_slug_tokens: usize,
}

impl ReviewPathMatcher {
    /// Creates a matcher for reviews under `prefix` on the origin of `site`
    pub fn new(site: Url, prefix: impl Into<String>, min_slug_tokens: usize) -> Self {
        Self {
            site,
            prefix: prefix.into(),
            min_slug_tokens,
        }
    }

    /// Returns true if the URL looks like a review page of this site
    ///
    /// # Examples
    ///
    /// ```
    /// use reel_harvester::url::ReviewPathMatcher;
    /// use url::Url;
    ///
    /// let site = Url::parse("https://www.rogerebert.com").unwrap();
    /// let matcher = ReviewPathMatcher::new(site, "/reviews/", 3);
    ///
    /// let review = Url::parse("https://www.rogerebert.com/reviews/the-iron-claw-2023").unwrap();
    /// let listing = Url::parse("https://www.rogerebert.com/reviews/page/2").unwrap();
    /// assert!(matcher.matches(&review));
    /// assert!(!matcher.matches(&listing));
    /// ```
    pub fn matches(&self, url: &Url) -> bool {
        if !is_same_origin(url, &self.site) {
            return false;
        }

        let path = url.path();
        if !path.starts_with(&self.prefix) {
            return false;
        }

        let slug = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();

        slug_token_count(slug) >= self.min_slug_tokens
    }

    /// The site this matcher belongs to
    pub fn site(&self) -> &Url {
        &self.site
    }
}

/// Counts the non-empty hyphen-separated tokens of a slug
fn slug_token_count(slug: &str) -> usize {
    slug.split('-').filter(|token| !token.is_empty()).count()
}

/// Returns true if both URLs share scheme, host and port
pub fn is_same_origin(url: &Url, other: &Url) -> bool {
    url.origin() == other.origin()
}
