//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Loading the prior document set and seeding the listing queue
//! - Walking listing pages breadth-first
//! - Fetching, extracting and merging each new review
//! - Periodic and final checkpoints

use crate::config::Config;
use crate::crawler::detail::DetailRules;
use crate::crawler::fetcher::{build_http_client, FetchKind, FetchResult, Fetcher};
use crate::crawler::listing::ListingParser;
use crate::document::{build_document, ListingEntry};
use crate::robots::{fetch_robots, RobotsGate};
use crate::state::{CrawlReport, CrawlSession, Frontier};
use crate::storage::{load_prior_documents, save_snapshot, DocumentStore, JsonCheckpointStore};
use crate::url::ReviewPathMatcher;
use crate::HarvestError;
use url::Url;

/// Main crawler coordinator structure
///
/// The coordinator owns the immutable parts of a crawl (settings, HTTP
/// client, parsers, store). All mutable progress lives in the
/// [`CrawlSession`] that is passed through each step.
pub struct Coordinator<S: DocumentStore> {
    config: Config,
    fetcher: Fetcher,
    listing_parser: ListingParser,
    detail_rules: DetailRules,
    store: S,
    robots: Option<RobotsGate>,
}

impl Coordinator<JsonCheckpointStore> {
    /// Creates a coordinator persisting to the configured output file
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Invalid settings or the HTTP client failed to build
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let store = JsonCheckpointStore::new(config.output.path.clone());
        Self::with_store(config, store)
    }
}

impl<S: DocumentStore> Coordinator<S> {
    /// Creates a coordinator persisting to `store`
    pub fn with_store(config: Config, store: S) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.http)?;
        let fetcher = Fetcher::new(client, config.listing_delay(), config.detail_delay());

        let matcher = ReviewPathMatcher::new(
            config.base_url()?,
            config.site.review_path_prefix.clone(),
            config.site.min_slug_tokens,
        );
        let listing_parser = ListingParser::new(matcher, config.crawler.max_candidates_per_page);
        let detail_rules = DetailRules::with_rating_scale(config.site.rating_scale);

        Ok(Self {
            config,
            fetcher,
            listing_parser,
            detail_rules,
            store,
            robots: None,
        })
    }

    /// Prepares a session: prior documents, robots.txt and the seed queue
    ///
    /// # Arguments
    ///
    /// * `fresh` - Ignore any prior checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSession)` - A session ready to run
    /// * `Err(HarvestError)` - The checkpoint could not be read or a seed is invalid
    pub async fn start_session(&mut self, fresh: bool) -> Result<CrawlSession, HarvestError> {
        let prior = if fresh {
            tracing::info!(
                "Fresh crawl requested, ignoring checkpoint at {}",
                self.store.location()
            );
            Vec::new()
        } else {
            load_prior_documents(&self.store)?
        };

        if self.config.crawler.respect_robots {
            let site = self.config.base_url()?;
            let robots = fetch_robots(self.fetcher.client(), &site).await;
            self.robots = Some(RobotsGate::new(robots, &self.config.http.user_agent));
        }

        let frontier = seed_frontier(&self.config)?;
        Ok(CrawlSession::new(prior, frontier, self.config.crawler.limit))
    }

    /// Runs the main crawl loop
    ///
    /// Listing pages are visited in FIFO order until the document limit is
    /// reached or the queue is exhausted. The document set is then written
    /// one final time.
    ///
    /// # Returns
    ///
    /// * `Ok((CrawlSession, CrawlReport))` - The final session and its summary
    /// * `Err(HarvestError)` - The final checkpoint could not be written
    pub async fn run(
        &self,
        mut session: CrawlSession,
    ) -> Result<(CrawlSession, CrawlReport), HarvestError> {
        tracing::info!(
            "Starting crawl of {}: limit {}, {} prior documents, {} listing pages queued",
            self.config.site.name,
            session.limit,
            session.documents.len(),
            session.frontier.len()
        );

        while !session.is_finished() {
            let Some(url) = session.frontier.pop() else {
                break;
            };
            session = self.process_listing(session, url).await;
        }

        if session.limit_reached() {
            tracing::info!("Reached limit of {} new documents", session.limit);
        } else {
            tracing::info!("Listing queue exhausted");
        }

        save_snapshot(&self.store, &session.documents)?;

        let report = session.report();
        tracing::info!("Crawl finished: {}", report);
        Ok((session, report))
    }

    /// Visits one listing page
    ///
    /// Newly discovered listing pages are queued, then each candidate on the
    /// page is processed until the limit is reached. Failures are logged and
    /// leave the session otherwise unchanged.
    pub async fn process_listing(&self, mut session: CrawlSession, url: Url) -> CrawlSession {
        if !self.robots_allow(&url) {
            tracing::info!("Skipping listing page disallowed by robots.txt: {}", url);
            return session;
        }

        tracing::info!("Fetching listing page {}", url);
        let result = self.fetcher.fetch(&url, FetchKind::Listing).await;
        session.counters.listing_pages_visited += 1;

        let Some(body) = self.take_body(&mut session, result) else {
            return session;
        };

        let page = self.listing_parser.parse(&body, &url);

        let mut queued = 0;
        for next in page.next_urls {
            if session.frontier.push(next) {
                queued += 1;
            }
        }

        if page.entries.is_empty() {
            tracing::warn!("No review links found on {}", url);
            session.counters.empty_listing_pages += 1;
        } else {
            tracing::info!(
                "Found {} review links and {} new listing pages on {}",
                page.entries.len(),
                queued,
                url
            );
        }

        for entry in page.entries {
            if session.limit_reached() {
                break;
            }
            session = self.process_candidate(session, entry).await;
        }

        session
    }

    /// Fetches, extracts and stores one candidate review
    ///
    /// Candidates whose URL is already held are skipped without a request.
    /// A candidate is fetched at most once per session, even if its fetch
    /// failed and another listing page links to it again.
    pub async fn process_candidate(
        &self,
        mut session: CrawlSession,
        entry: ListingEntry,
    ) -> CrawlSession {
        if session.is_seen(&entry.url) {
            tracing::debug!("Already collected {}", entry.url);
            session.counters.skipped_duplicates += 1;
            return session;
        }

        if !session.mark_attempted(&entry.url) {
            tracing::debug!("Already attempted {} this session", entry.url);
            return session;
        }

        let url = match Url::parse(&entry.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping unparseable candidate {}: {}", entry.url, e);
                return session;
            }
        };

        if !self.robots_allow(&url) {
            tracing::info!("Skipping review disallowed by robots.txt: {}", url);
            return session;
        }

        let result = self.fetcher.fetch(&url, FetchKind::Detail).await;
        let Some(body) = self.take_body(&mut session, result) else {
            return session;
        };

        let details = self.detail_rules.extract(&body);
        let document = build_document(&entry, &details, &self.config.site.name);
        let title = document.title.clone();

        if !session.accept(document) {
            session.counters.skipped_duplicates += 1;
            return session;
        }

        tracing::info!(
            "[{}/{}] Collected {}",
            session.collected,
            session.limit,
            title
        );

        if session.collected % self.config.crawler.checkpoint_every.max(1) == 0 {
            self.checkpoint(&session);
        }

        session
    }

    /// Writes a periodic checkpoint; failures are logged and the crawl goes on
    fn checkpoint(&self, session: &CrawlSession) {
        if let Err(e) = save_snapshot(&self.store, &session.documents) {
            tracing::warn!("Checkpoint to {} failed: {}", self.store.location(), e);
        }
    }

    /// Body of a successful fetch; failures are counted on the session
    fn take_body(&self, session: &mut CrawlSession, result: FetchResult) -> Option<String> {
        match result {
            FetchResult::Success { body, .. } => Some(body),
            FetchResult::Blocked { .. } => {
                session.counters.blocked += 1;
                None
            }
            FetchResult::HttpError { .. } | FetchResult::NetworkError { .. } => {
                session.counters.fetch_failures += 1;
                None
            }
        }
    }

    fn robots_allow(&self, url: &Url) -> bool {
        self.robots
            .as_ref()
            .map_or(true, |robots| robots.is_allowed(url))
    }
}

/// Builds the initial listing queue
///
/// The start page (when `start-page` is above 1) comes first, followed by the
/// configured seeds in order.
pub fn seed_frontier(config: &Config) -> Result<Frontier, HarvestError> {
    let mut urls = Vec::new();
    if let Some(start) = config.start_page_url()? {
        urls.push(start);
    }
    urls.extend(config.seed_urls()?);

    Ok(Frontier::with_urls(urls))
}

/// Runs a complete crawl with the configured checkpoint file
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Ignore any prior checkpoint
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed and the document set was saved
/// * `Err(HarvestError)` - Crawl could not start or the final save failed
pub async fn run_crawl(config: Config, fresh: bool) -> Result<CrawlReport, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    let session = coordinator.start_session(fresh).await?;
    let (_, report) = coordinator.run(session).await?;
    Ok(report)
}
