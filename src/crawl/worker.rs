// src/crawl/worker.rs
// =============================================================================
// One worker of the fixed-size pool.
//
// A worker loops: take a task from the queue, fetch it, hand the result to
// the aggregator. A failed page is just data in the PageResult, so a worker
// never exits because of one. It exits only when the controller has closed
// the task queue and the queue is empty.
// =============================================================================

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::aggregator::Aggregator;
use crate::fetch::Fetcher;

/// A URL waiting to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
}

/// Receives a notification for every page a worker starts on.
pub trait Progress: Send + Sync {
    fn page_started(&self, url: &str, interrupted: bool);
}

// For runs nobody watches (tests, JSON output)
pub struct NoProgress;

impl Progress for NoProgress {
    fn page_started(&self, _url: &str, _interrupted: bool) {}
}

pub(super) async fn run_worker(
    id: usize,
    tasks: flume::Receiver<CrawlTask>,
    fetcher: Arc<dyn Fetcher>,
    aggregator: Arc<Aggregator>,
    progress: Arc<dyn Progress>,
    cancel: CancellationToken,
) {
    while let Ok(task) = tasks.recv_async().await {
        progress.page_started(&task.url, cancel.is_cancelled());

        let result = fetcher.fetch(&task.url, &cancel).await;
        match &result.error {
            Some(error) => debug!(worker = id, url = %task.url, %error, "page failed"),
            None => debug!(
                worker = id,
                url = %task.url,
                words = result.histogram.len(),
                links = result.links.len(),
                "page fetched"
            ),
        }

        aggregator.submit(result);
    }

    debug!(worker = id, "task queue closed, worker exiting");
}
