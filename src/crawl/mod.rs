// src/crawl/mod.rs
// =============================================================================
// This module runs the concurrent crawl.
//
// Pieces:
// - worker: the fixed-size pool pulling pages from the task queue
// - aggregator: merges page results and relieves a full result channel
// - controller: schedules links, detects completion, handles interrupts
// - ranking: picks the top-N words once the crawl is over
//
// Data flow:
//   controller --task queue--> workers --PageResult--> aggregator
//   aggregator --relief channel (link batches)--> controller
// =============================================================================

mod aggregator;
mod controller;
mod ranking;
mod worker;

pub use aggregator::{merge_histogram, Aggregate, BackpressureStats, ErrorRecord};
pub use controller::{CrawlController, CrawlSummary, RunOutcome};
pub use ranking::{top_words, WordCount};
pub use worker::{CrawlTask, NoProgress, Progress};
