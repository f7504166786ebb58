// src/report.rs
// =============================================================================
// Everything the user sees on stdout.
//
// - TerminalProgress: the "currently fetching" line shown during the crawl.
//   On a terminal it rewrites one bold line in place (red once the run is
//   interrupted). When stdout is redirected it prints one line per page.
// - print_report: the final report, as text or as JSON
// =============================================================================

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use anyhow::Result;

use crate::config::LengthFilter;
use crate::crawl::{Progress, RunOutcome};

// ANSI graphics sequences
const BOLD: &str = "\x1b[1m";
const RED_BOLD: &str = "\x1b[31;1m";
const GRAPHICS_OFF: &str = "\x1b[0m";

// Width of the line that overwrites itself
const OUTPUT_LENGTH: usize = 75;

const PARTIAL_NOTICE: &str = "Note: process was interrupted, results are partial.";

pub struct TerminalProgress {
    is_tty: bool,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            is_tty: io::stdout().is_terminal(),
        }
    }

    // Blanks the status line so the report starts on a clean line
    pub fn clear_line(&self) {
        if self.is_tty {
            let mut out = io::stdout().lock();
            let _ = write!(out, "\r{:width$}\r", "", width = OUTPUT_LENGTH);
            let _ = out.flush();
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for TerminalProgress {
    fn page_started(&self, url: &str, interrupted: bool) {
        let line = status_line(url, interrupted, self.is_tty);
        // One locked write per line so workers don't interleave
        let mut out = io::stdout().lock();
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

fn status_line(url: &str, interrupted: bool, is_tty: bool) -> String {
    if !is_tty {
        return format!("Processing link: '{}'\n", url);
    }

    let leading = if interrupted { RED_BOLD } else { BOLD };
    let text = truncate(url, OUTPUT_LENGTH);
    format!("{}{:<width$}{}\r", leading, text, GRAPHICS_OFF, width = OUTPUT_LENGTH)
}

// Shortens to `width` characters, ending in "..." when something was cut
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

// `top_n` is the requested ranking size; the site may have fewer words
pub fn print_report(
    outcome: &RunOutcome,
    lengths: &LengthFilter,
    top_n: usize,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        print!("{}", render_text(outcome, lengths, top_n));
    }
    Ok(())
}

fn render_text(outcome: &RunOutcome, lengths: &LengthFilter, top_n: usize) -> String {
    let mut out = String::new();

    if outcome.interrupted {
        let _ = writeln!(out, "{}", PARTIAL_NOTICE);
    }
    if outcome.capped {
        let _ = writeln!(out, "Note: page limit reached, not every page was visited.");
    }

    if outcome.errors.is_empty() {
        let _ = writeln!(out, "No errors occurred in run.");
    } else {
        for record in &outcome.errors {
            let _ = writeln!(out, "'{}': error occurred: {}", record.url, record.error);
        }
    }
    out.push('\n');

    let _ = writeln!(out, "{}", heading(top_n, lengths));
    for (i, wc) in outcome.top_words.iter().enumerate() {
        let _ = writeln!(out, "[{}] {}: {}", i + 1, wc.word, wc.count);
    }
    out.push('\n');

    let stats = &outcome.stats;
    let _ = writeln!(
        out,
        "Pages: {}, distinct words: {}, relief channel: {} accepted, {} blocked (peak {} in flight)",
        outcome.pages_fetched,
        outcome.distinct_words,
        stats.relief_accepted,
        stats.relief_blocked,
        stats.relief_peak_in_flight
    );

    out
}

fn heading(n: usize, lengths: &LengthFilter) -> String {
    if lengths.max() > 0 {
        format!(
            "Top {} totals for words of length {} to {}:",
            n,
            lengths.min(),
            lengths.max()
        )
    } else {
        format!("Top {} totals for words of length >= {}:", n, lengths.min())
    }
}
