// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is a Rust struct and clap
// generates the parsing code from its fields and attributes.
//
// Parsing only checks that values have the right type. The real validation
// (URL, length window, non-zero and bounded sizes) happens in into_config(), which
// turns the raw flags into a CrawlConfig.
// =============================================================================

use std::time::Duration;

use clap::Parser;

use crate::config::{
    ConfigError, CrawlConfig, LengthFilter, DEFAULT_CONCURRENCY, DEFAULT_DICT_SIZE,
    DEFAULT_MAX_LEN, DEFAULT_MIN_LEN, DEFAULT_MULTIPLIER, DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_WORDS,
};

#[derive(Parser, Debug)]
#[command(
    name = "word-crawler",
    version,
    about = "Crawl a website and report its most frequent words",
    long_about = "word-crawler follows links from a start URL, staying on the same host \
                  (a leading \"www.\" is ignored), and counts every word whose length falls \
                  in the configured window. Press Ctrl-C to stop early and get partial results."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com)
    pub start_url: String,

    /// Number of pages fetched concurrently
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Channel buffer size, as a multiple of the concurrency
    #[arg(long, default_value_t = DEFAULT_MULTIPLIER)]
    pub multiplier: usize,

    /// Minimum word length to track (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_MIN_LEN)]
    pub min_len: usize,

    /// Maximum word length to track (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_MAX_LEN)]
    pub max_len: usize,

    /// Show the top 'this many' words
    #[arg(long = "tot-words", default_value_t = DEFAULT_TOP_WORDS)]
    pub top_words: usize,

    /// If > 0, stop scheduling new pages after this many
    #[arg(long = "iter", default_value_t = 0)]
    pub iterations: usize,

    /// Initial capacity of the word dictionary
    #[arg(long, default_value_t = DEFAULT_DICT_SIZE)]
    pub dict_size: usize,

    /// HTTP request timeout in seconds
    #[arg(long = "conn-timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Output results in JSON format instead of text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<CrawlConfig, ConfigError> {
        let lengths = LengthFilter::new(self.min_len, self.max_len)?;
        let mut config = CrawlConfig::new(&self.start_url, lengths)?;

        config.concurrency = self.concurrency;
        config.multiplier = self.multiplier;
        config.top_words = self.top_words;
        config.iterations = self.iterations;
        config.dict_size = self.dict_size;
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["word-crawler"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["https://example.com"]).into_config().unwrap();
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.channel_capacity(), 100);
        assert_eq!(config.lengths, LengthFilter::new(5, 8).unwrap());
        assert_eq!(config.top_words, 10);
        assert_eq!(config.iterations, 0);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--concurrency",
            "3",
            "--min-len",
            "0",
            "--max-len",
            "4",
            "--tot-words",
            "25",
            "--iter",
            "7",
            "--conn-timeout",
            "2",
            "--json",
            "https://example.com",
        ]);
        assert!(cli.json);

        let config = cli.into_config().unwrap();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.lengths, LengthFilter::new(0, 4).unwrap());
        assert_eq!(config.top_words, 25);
        assert_eq!(config.iterations, 7);
        assert_eq!(config.request_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_lengths_rejected() {
        let err = parse(&["--min-len", "0", "--max-len", "0", "https://example.com"])
            .into_config()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnboundedLength { min: 0, max: 0 });
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = parse(&["--concurrency", "0", "https://example.com"])
            .into_config()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroConcurrency);
    }

    #[test]
    fn test_oversized_channel_rejected() {
        let huge = usize::MAX.to_string();
        let err = parse(&["--concurrency", "2", "--multiplier", &huge, "https://example.com"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ChannelTooLarge { concurrency: 2, .. }));

        // No overflow, but still above what a channel can hold
        let err = parse(&["--concurrency", "4096", "--multiplier", "4096", "https://example.com"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ChannelTooLarge { .. }));
    }

    #[test]
    fn test_oversized_dictionary_rejected() {
        let huge = usize::MAX.to_string();
        let err = parse(&["--dict-size", &huge, "https://example.com"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DictionaryTooLarge { .. }));
    }

    #[test]
    fn test_missing_url_is_a_parse_error() {
        assert!(Cli::try_parse_from(["word-crawler"]).is_err());
    }
}
