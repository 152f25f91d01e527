//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Frontier`: FIFO queue of listing pages, each visited at most once
//! - `CrawlSession`: everything a crawl mutates, moved through each crawl step
//! - `CrawlReport`: summary returned when a crawl ends

mod frontier;
mod session;

pub use frontier::Frontier;
pub use session::{CrawlReport, CrawlSession, SessionCounters};
