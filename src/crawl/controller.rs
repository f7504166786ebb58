// src/crawl/controller.rs
// =============================================================================
// The crawl controller: schedules pages, detects when the crawl is done and
// handles interrupts.
//
// How it works:
// 1. Spawn `concurrency` workers that all pull from one bounded task queue
// 2. Send the start URL into the queue; the pending counter starts at 1
// 3. Receive one link batch per finished page from the relief channel.
//    Every unvisited link is marked visited, counted (+1) and enqueued.
//    The batch itself is then settled (-1)
// 4. When the counter hits 0 no page is queued, in flight, or waiting in
//    the relief channel, so both channels can be closed safely
//
// Interrupts: the enqueue in step 3 races the cancellation token. Once it
// fires, no new task is sent. Tasks already queued still run and the
// controller keeps settling batches until the counter reaches 0, so the
// partial result only contains pages that were fully processed.
//
// The visited set and the counter belong to this task alone. Workers only
// talk to it through the two channels.
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::aggregator::{Aggregate, Aggregator, BackpressureStats, ErrorRecord};
use super::ranking::{top_words, WordCount};
use super::worker::{run_worker, CrawlTask, NoProgress, Progress};
use crate::config::CrawlConfig;
use crate::fetch::Fetcher;

/// Final, immutable result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub start_url: String,
    /// The run was cut short by an interrupt; results are partial
    pub interrupted: bool,
    /// The page cap stopped the crawl before the site was exhausted
    pub capped: bool,
    pub pages_fetched: usize,
    pub distinct_words: usize,
    pub errors: Vec<ErrorRecord>,
    pub top_words: Vec<WordCount>,
    pub stats: BackpressureStats,
}

// Everything a finished crawl collected, before ranking
#[derive(Debug)]
pub struct CrawlSummary {
    pub aggregate: Aggregate,
    pub interrupted: bool,
    pub capped: bool,
}

// Scheduling state owned by the controller loop
struct Frontier {
    visited: HashSet<String>,
    // Link batches still expected from the pipeline
    pending: usize,
    scheduled: usize,
    // 0 = unlimited
    cap: usize,
    interrupted: bool,
    capped: bool,
}

impl Frontier {
    fn new(seed: &str, cap: usize) -> Self {
        Self {
            visited: HashSet::from([seed.to_string()]),
            pending: 1,
            scheduled: 1,
            cap,
            interrupted: false,
            capped: false,
        }
    }

    // Marks the link visited and counts it, unless it was already seen or
    // the page cap is reached. Capped links are not marked visited.
    fn admit(&mut self, link: &str) -> bool {
        if self.visited.contains(link) {
            return false;
        }
        if self.cap > 0 && self.scheduled >= self.cap {
            self.capped = true;
            return false;
        }
        self.visited.insert(link.to_string());
        self.pending += 1;
        self.scheduled += 1;
        true
    }

    // The admitted link never made it into the task queue
    fn withdraw(&mut self) {
        self.pending -= 1;
        self.scheduled -= 1;
    }

    fn settle_batch(&mut self) {
        self.pending -= 1;
    }

    fn interrupt(&mut self) {
        if !self.interrupted {
            warn!(pending = self.pending, "interrupted, draining queue without scheduling new pages");
        }
        self.interrupted = true;
    }
}

pub struct CrawlController {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    progress: Arc<dyn Progress>,
}

impl CrawlController {
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            fetcher,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    // Crawls the site and ranks the words
    pub async fn run(&self, cancel: &CancellationToken) -> RunOutcome {
        let summary = self.crawl(cancel).await;
        let aggregate = summary.aggregate;

        RunOutcome {
            start_url: self.config.start_url.to_string(),
            interrupted: summary.interrupted,
            capped: summary.capped,
            pages_fetched: aggregate.pages,
            distinct_words: aggregate.histogram.len(),
            top_words: top_words(&aggregate.histogram, self.config.top_words),
            errors: aggregate.errors,
            stats: aggregate.stats,
        }
    }

    // Runs the crawl to exhaustion (or until an interrupt has drained) and
    // returns once every worker has exited
    pub async fn crawl(&self, cancel: &CancellationToken) -> CrawlSummary {
        let capacity = self.config.channel_capacity();
        let (task_tx, task_rx) = flume::bounded::<CrawlTask>(capacity);
        let (relief_tx, mut relief_rx) = mpsc::channel::<Vec<String>>(capacity);
        let aggregator = Arc::new(Aggregator::new(relief_tx, self.config.dict_capacity()));

        info!(
            url = %self.config.start_url,
            concurrency = self.config.concurrency,
            capacity,
            "beginning run, type Ctrl-C to interrupt"
        );

        let workers: Vec<_> = (0..self.config.concurrency)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    task_rx.clone(),
                    Arc::clone(&self.fetcher),
                    Arc::clone(&aggregator),
                    Arc::clone(&self.progress),
                    cancel.clone(),
                ))
            })
            .collect();
        drop(task_rx);

        let seed = self.config.start_url.to_string();
        let mut frontier = Frontier::new(&seed, self.config.iterations);

        // The queue is empty, so this only fails if every worker is gone
        if task_tx.send_async(CrawlTask { url: seed }).await.is_err() {
            error!("no worker accepted the start URL");
            frontier.withdraw();
        }

        while frontier.pending > 0 {
            let Some(links) = relief_rx.recv().await else {
                error!(pending = frontier.pending, "all workers exited with work outstanding");
                break;
            };

            if cancel.is_cancelled() {
                frontier.interrupt();
            }

            if !frontier.interrupted {
                for link in links {
                    if !frontier.admit(&link) {
                        continue;
                    }

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            frontier.withdraw();
                            frontier.interrupt();
                            break;
                        }
                        sent = task_tx.send_async(CrawlTask { url: link }) => {
                            if sent.is_err() {
                                error!("task queue has no workers left");
                                frontier.withdraw();
                            }
                        }
                    }
                }
            }

            frontier.settle_batch();
        }

        let interrupted = frontier.interrupted || cancel.is_cancelled();

        // The counter reached zero: nobody will send into either channel again
        drop(task_tx);
        relief_rx.close();
        for joined in join_all(workers).await {
            if let Err(e) = joined {
                error!(error = %e, "worker task failed");
            }
        }

        let aggregate = aggregator.take();
        info!(
            pages = aggregate.pages,
            scheduled = frontier.scheduled,
            errors = aggregate.errors.len(),
            words = aggregate.histogram.len(),
            relief_accepted = aggregate.stats.relief_accepted,
            relief_blocked = aggregate.stats.relief_blocked,
            "run finished"
        );
        if frontier.capped {
            info!(cap = self.config.iterations, "page cap reached, remaining links were skipped");
        }

        CrawlSummary {
            aggregate,
            interrupted,
            capped: frontier.capped,
        }
    }
}
