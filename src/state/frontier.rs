use std::collections::{HashSet, VecDeque};
use url::Url;

/// FIFO queue of listing pages still to visit
///
/// A URL is accepted at most once per session: once pushed it is remembered
/// even after it has been popped, so a listing page linked from several other
/// pages is only ever visited once.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    /// Listing URLs waiting to be fetched, in discovery order
    queue: VecDeque<Url>,

    /// Every URL ever accepted (queued or already visited)
    known: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding `urls` in order, duplicates dropped
    pub fn with_urls(urls: impl IntoIterator<Item = Url>) -> Self {
        let mut frontier = Self::new();
        for url in urls {
            frontier.push(url);
        }
        frontier
    }

    /// Appends a listing URL
    ///
    /// # Returns
    ///
    /// `true` if the URL was queued, `false` if it was already queued or visited
    pub fn push(&mut self, url: Url) -> bool {
        if !self.known.insert(url.to_string()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Removes and returns the oldest queued URL
    pub fn pop(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    /// Number of URLs still queued
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued URLs in the order they will be visited
    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.queue.iter()
    }
}
