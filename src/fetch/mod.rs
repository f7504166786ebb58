// src/fetch/mod.rs
// =============================================================================
// This module turns one URL into one PageResult.
//
// Submodules:
// - scope: decides which discovered links belong to the crawled site
// - html: pulls the word histogram and the outbound links out of a page
// - http: the real network fetcher built on reqwest
//
// The crawl controller never talks to reqwest directly. It only sees the
// Fetcher trait, so tests can swap in an in-memory website.
// =============================================================================

mod html;
mod http;
mod scope;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use html::extract_page;
pub use http::HttpFetcher;
pub use scope::HostScope;

/// Word → occurrence count, either for one page or for the whole run.
pub type Histogram = HashMap<String, u64>;

/// Why a single page could not be processed.
///
/// These never stop the crawl. They are stored in the error log and shown
/// in the final report.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PageError {
    /// The server answered with a non-2xx status
    #[error("HTTP {0}")]
    Status(u16),
    /// The request hit the configured timeout
    #[error("request timed out")]
    Timeout,
    /// Redirect loop or redirect chain over the limit
    #[error("too many redirects")]
    TooManyRedirects,
    /// DNS failure, refused connection, unreachable host
    #[error("connection failed: {0}")]
    Connect(String),
    /// TLS handshake or certificate problem
    #[error("SSL certificate error: {0}")]
    Tls(String),
    /// Any other request failure (including unparseable URLs)
    #[error("{0}")]
    Request(String),
    /// The response body could not be read
    #[error("failed to read body: {0}")]
    Body(String),
    /// The run was interrupted while this page was in flight
    #[error("fetch cancelled by interrupt")]
    Cancelled,
}

/// Outcome of processing one crawl task.
///
/// `histogram` and `links` are always present. On error both are empty and
/// `error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub url: String,
    pub error: Option<PageError>,
    pub histogram: Histogram,
    pub links: Vec<String>,
}

impl PageResult {
    pub fn new(url: impl Into<String>, histogram: Histogram, links: Vec<String>) -> Self {
        Self {
            url: url.into(),
            error: None,
            histogram,
            links,
        }
    }

    pub fn failed(url: impl Into<String>, error: PageError) -> Self {
        Self {
            url: url.into(),
            error: Some(error),
            histogram: Histogram::new(),
            links: Vec::new(),
        }
    }
}

/// Fetches and processes a single page.
///
/// Implementations must apply the word-length filter to the histogram and
/// restrict links to the crawl's scope. A fetch never fails as a Rust
/// error: problems come back as `PageResult::error`.
///
/// `cancel` fires when the run is interrupted; honoring it is optional and
/// only makes shutdown faster.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> PageResult;
}
