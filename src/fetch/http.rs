// src/fetch/http.rs
// =============================================================================
// The network Fetcher: downloads a page with reqwest and hands the HTML to
// the extractor in html.rs.
//
// Key functionality:
// - One shared Client (connection pooling) with the configured timeout
// - A download in progress races the cancellation token, so an interrupt
//   does not have to wait for slow servers. Pages picked up after the
//   interrupt are still fetched, so the queue drains
// - Transport failures are sorted into PageError variants
// - Non-HTML responses (images, PDFs...) produce an empty page, not an error
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::{extract_page, Fetcher, Histogram, HostScope, PageError, PageResult};
use crate::config::{CrawlConfig, LengthFilter};

const MAX_REDIRECTS: usize = 5;

pub struct HttpFetcher {
    client: Client,
    lengths: LengthFilter,
    scope: HostScope,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout.min(Duration::from_secs(10)))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let scope = HostScope::new(&config.start_url);
        debug!(host = scope.target(), "links restricted to host");

        Ok(Self {
            client,
            lengths: config.lengths,
            scope,
        })
    }

    // Some(html) for HTML pages, None for anything else we got successfully
    async fn download(&self, url: &Url) -> Result<Option<String>, PageError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Status(status.as_u16()));
        }
        if !is_html(response.headers()) {
            debug!(%url, "skipping non-HTML response");
            return Ok(None);
        }

        let html = response
            .text()
            .await
            .map_err(|e| PageError::Body(e.to_string()))?;
        Ok(Some(html))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> PageResult {
        let page_url = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return PageResult::failed(url, PageError::Request(e.to_string())),
        };

        // Pages dequeued after an interrupt are still fetched in full; only
        // a download already running when the token fires is aborted
        let downloaded = if cancel.is_cancelled() {
            self.download(&page_url).await
        } else {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(PageError::Cancelled),
                body = self.download(&page_url) => body,
            }
        };

        match downloaded {
            Ok(Some(html)) => {
                let (histogram, links) = extract_page(&html, &page_url, &self.lengths, &self.scope);
                PageResult::new(url, histogram, links)
            }
            Ok(None) => PageResult::new(url, Histogram::new(), Vec::new()),
            Err(error) => PageResult::failed(url, error),
        }
    }
}

// A missing Content-Type is treated as HTML; servers that omit it usually
// serve pages
fn is_html(headers: &HeaderMap) -> bool {
    match headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        Some(content_type) => content_type.to_ascii_lowercase().contains("html"),
        None => true,
    }
}

// Sorts reqwest errors into the page error taxonomy
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn categorize_error(error: reqwest::Error) -> PageError {
    let message = error.to_string();
    let lowered = message.to_ascii_lowercase();

    if error.is_timeout() {
        PageError::Timeout
    } else if error.is_redirect() {
        PageError::TooManyRedirects
    } else if lowered.contains("certificate") || lowered.contains("ssl") || lowered.contains("tls") {
        PageError::Tls(message)
    } else if error.is_connect() {
        PageError::Connect(message)
    } else if error.is_body() || error.is_decode() {
        PageError::Body(message)
    } else {
        PageError::Request(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html(&headers(Some("text/html; charset=utf-8"))));
        assert!(is_html(&headers(Some("application/xhtml+xml"))));
        assert!(is_html(&headers(Some("TEXT/HTML"))));
        assert!(is_html(&headers(None)));
    }

    #[test]
    fn test_non_html_content_types() {
        assert!(!is_html(&headers(Some("image/png"))));
        assert!(!is_html(&headers(Some("application/pdf"))));
    }

    #[test]
    fn test_fetcher_builds_from_config() {
        let lengths = LengthFilter::new(5, 8).unwrap();
        let config = CrawlConfig::new("https://www.example.com/", lengths).unwrap();
        let fetcher = HttpFetcher::new(&config).unwrap();
        assert_eq!(fetcher.scope.target(), "example.com");
    }

    // Serves `body` as text/html to every connection; returns the base URL
    // and a counter of requests served
    async fn serve_html(body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let served = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                served.fetch_add(1, Ordering::SeqCst);
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}/", addr), hits)
    }

    #[tokio::test]
    async fn test_fetch_after_interrupt_still_downloads() {
        let (url, hits) = serve_html("<p>hello hello</p>").await;
        let lengths = LengthFilter::new(5, 0).unwrap();
        let config = CrawlConfig::new(&url, lengths).unwrap();
        let fetcher = HttpFetcher::new(&config).unwrap();

        // The page was queued before the interrupt and is dequeued after it
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fetcher.fetch(&url, &cancel).await;
        assert_eq!(result.error, None);
        assert_eq!(result.histogram.get("hello"), Some(&2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interrupt_aborts_download_in_progress() {
        // Accepts connections but never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let lengths = LengthFilter::new(5, 8).unwrap();
        let config = CrawlConfig::new(&url, lengths).unwrap();
        let fetcher = HttpFetcher::new(&config).unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), fetcher.fetch(&url, &cancel))
            .await
            .expect("interrupt should abort the download");
        assert_eq!(result.error, Some(PageError::Cancelled));
        assert!(result.links.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_url_is_a_page_error() {
        let lengths = LengthFilter::new(5, 8).unwrap();
        let config = CrawlConfig::new("https://example.com/", lengths).unwrap();
        let fetcher = HttpFetcher::new(&config).unwrap();

        let result = fetcher.fetch("::not a url::", &CancellationToken::new()).await;
        assert!(matches!(result.error, Some(PageError::Request(_))));
    }
}
