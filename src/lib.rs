// src/lib.rs
// =============================================================================
// word-crawler: crawl one website and rank its most frequent words.
//
// Modules:
// - config: validated run configuration
// - fetch: turns a URL into a word histogram plus in-scope links
// - crawl: the worker pool, aggregator and crawl controller
// - report: progress line and final report
// - logging: tracing subscriber setup
// - cli: command-line flags
//
// The binary in main.rs only wires these together.
// =============================================================================

pub mod cli;
pub mod config;
pub mod crawl;
pub mod fetch;
pub mod logging;
pub mod report;
