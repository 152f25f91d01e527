use crate::document::Document;
use crate::state::Frontier;
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

/// Counters describing what happened during a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    /// Listing pages fetched (successfully or not)
    pub listing_pages_visited: usize,

    /// Listing pages that yielded no candidate links
    pub empty_listing_pages: usize,

    /// Fetches that failed for any reason other than blocking
    pub fetch_failures: usize,

    /// Fetches refused with 403 or 429
    pub blocked: usize,

    /// Candidates skipped because their URL was already collected
    pub skipped_duplicates: usize,
}

/// All mutable state of one crawl session
///
/// The session is moved into each crawl step and returned from it, so the
/// crawl loop owns exactly one copy of the state at any point.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    /// Listing pages still to visit
    pub frontier: Frontier,

    /// URLs of every document held, including those loaded from a checkpoint
    pub seen_urls: HashSet<String>,

    /// Review URLs whose fetch has been attempted this session
    pub attempted: HashSet<String>,

    /// The accumulated documents, prior ones first
    pub documents: Vec<Document>,

    /// Documents accepted during this session
    pub collected: usize,

    /// Maximum number of documents to accept this session
    pub limit: usize,

    pub counters: SessionCounters,

    started_at: Instant,
}

impl CrawlSession {
    /// Creates a session seeded with previously collected documents
    ///
    /// # Arguments
    ///
    /// * `prior` - Documents loaded from a checkpoint; their URLs are never collected again
    /// * `frontier` - Initial listing pages
    /// * `limit` - Maximum number of new documents
    pub fn new(prior: Vec<Document>, frontier: Frontier, limit: usize) -> Self {
        let seen_urls = prior.iter().map(|document| document.url.clone()).collect();

        Self {
            frontier,
            seen_urls,
            attempted: HashSet::new(),
            documents: prior,
            collected: 0,
            limit,
            counters: SessionCounters::default(),
            started_at: Instant::now(),
        }
    }

    /// Whether a document with this URL is already held
    pub fn is_seen(&self, url: &str) -> bool {
        self.seen_urls.contains(url)
    }

    /// Records a fetch attempt for a review URL
    ///
    /// # Returns
    ///
    /// `false` if the URL was already attempted this session
    pub fn mark_attempted(&mut self, url: &str) -> bool {
        self.attempted.insert(url.to_string())
    }

    /// Appends a new document and marks its URL as seen
    ///
    /// # Returns
    ///
    /// `false` (and nothing is stored) if a document with the same URL exists
    pub fn accept(&mut self, document: Document) -> bool {
        if !self.seen_urls.insert(document.url.clone()) {
            return false;
        }
        self.documents.push(document);
        self.collected += 1;
        true
    }

    pub fn limit_reached(&self) -> bool {
        self.collected >= self.limit
    }

    /// Whether the crawl should stop
    pub fn is_finished(&self) -> bool {
        self.limit_reached() || self.frontier.is_empty()
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Summary of the session so far
    pub fn report(&self) -> CrawlReport {
        CrawlReport {
            collected: self.collected,
            total: self.documents.len(),
            listing_pages_visited: self.counters.listing_pages_visited,
            empty_listing_pages: self.counters.empty_listing_pages,
            fetch_failures: self.counters.fetch_failures,
            blocked: self.counters.blocked,
            skipped_duplicates: self.counters.skipped_duplicates,
            frontier_remaining: self.frontier.len(),
            elapsed: self.elapsed(),
        }
    }
}

/// Outcome of a finished crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    /// Documents accepted during the session
    pub collected: usize,

    /// Documents held in total, prior ones included
    pub total: usize,

    pub listing_pages_visited: usize,
    pub empty_listing_pages: usize,
    pub fetch_failures: usize,
    pub blocked: usize,
    pub skipped_duplicates: usize,

    /// Listing pages left in the queue when the crawl stopped
    pub frontier_remaining: usize,

    pub elapsed: Duration,
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collected {} new reviews ({} total) from {} listing pages in {:.1}s; \
             {} fetch failures, {} blocked, {} duplicates skipped, {} listing pages left",
            self.collected,
            self.total,
            self.listing_pages_visited,
            self.elapsed.as_secs_f64(),
            self.fetch_failures,
            self.blocked,
            self.skipped_duplicates,
            self.frontier_remaining
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn document(url: &str) -> Document {
        serde_json::from_value(serde_json::json!({
            "id": "rogerebert_000000000000",
            "title": "A Film",
            "year": 2023,
            "site": "rogerebert",
            "url": url,
        }))
        .unwrap()
    }

    fn frontier() -> Frontier {
        Frontier::with_urls(vec![Url::parse("https://www.rogerebert.com/reviews").unwrap()])
    }

    #[test]
    fn test_prior_documents_are_seen() {
        let session = CrawlSession::new(
            vec![document("https://www.rogerebert.com/reviews/old-film-review")],
            frontier(),
            10,
        );

        assert!(session.is_seen("https://www.rogerebert.com/reviews/old-film-review"));
        assert_eq!(session.collected, 0);
        assert_eq!(session.documents.len(), 1);
    }

    #[test]
    fn test_accept_rejects_duplicate_url() {
        let mut session = CrawlSession::new(Vec::new(), frontier(), 10);

        assert!(session.accept(document("https://www.rogerebert.com/reviews/a-new-film")));
        assert!(!session.accept(document("https://www.rogerebert.com/reviews/a-new-film")));
        assert_eq!(session.collected, 1);
        assert_eq!(session.documents.len(), 1);
    }

    #[test]
    fn test_mark_attempted_once() {
        let mut session = CrawlSession::new(Vec::new(), frontier(), 10);
        assert!(session.mark_attempted("https://www.rogerebert.com/reviews/a-new-film"));
        assert!(!session.mark_attempted("https://www.rogerebert.com/reviews/a-new-film"));
    }

    #[test]
    fn test_finished_on_limit_or_empty_frontier() {
        let mut session = CrawlSession::new(Vec::new(), frontier(), 1);
        assert!(!session.is_finished());

        session.accept(document("https://www.rogerebert.com/reviews/a-new-film"));
        assert!(session.limit_reached());
        assert!(session.is_finished());

        let mut session = CrawlSession::new(Vec::new(), frontier(), 1);
        session.frontier.pop();
        assert!(session.is_finished());
    }

    #[test]
    fn test_zero_limit_is_finished_immediately() {
        let session = CrawlSession::new(Vec::new(), frontier(), 0);
        assert!(session.is_finished());
    }

    #[test]
    fn test_report_reflects_session() {
        let mut session = CrawlSession::new(
            vec![document("https://www.rogerebert.com/reviews/old-film-review")],
            frontier(),
            10,
        );
        session.accept(document("https://www.rogerebert.com/reviews/a-new-film"));
        session.counters.blocked = 2;

        let report = session.report();
        assert_eq!(report.collected, 1);
        assert_eq!(report.total, 2);
        assert_eq!(report.blocked, 2);
        assert_eq!(report.frontier_remaining, 1);
        assert!(report.to_string().contains("collected 1 new reviews (2 total)"));
    }
}
