// src/config.rs
// =============================================================================
// Run-level configuration for a crawl.
//
// Everything here is checked once, before any network work starts. A bad
// start URL or an impossible word-length window is a fatal error: the run
// aborts immediately with a ConfigError.
//
// The channel capacities used by the crawl controller are derived from
// concurrency × multiplier, the same sizing rule for both the task queue
// and the relief channel. That product and the dictionary pre-allocation
// are bounded so a large flag value fails validation instead of overflowing
// or exhausting memory.
// =============================================================================

use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_MULTIPLIER: usize = 10;
pub const DEFAULT_MIN_LEN: usize = 5;
pub const DEFAULT_MAX_LEN: usize = 8;
pub const DEFAULT_TOP_WORDS: usize = 10;
pub const DEFAULT_DICT_SIZE: usize = 25_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// Largest concurrency × multiplier accepted. Far below tokio's semaphore
// limit, which bounded mpsc channels panic above.
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 20;

// Largest pre-allocated dictionary, in entries
pub const MAX_DICT_SIZE: usize = 1 << 24;

// Everything that can make a configuration unusable
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the url '{url}' is not syntactically valid: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("the url '{0}' must use http or https")]
    UnsupportedScheme(String),

    #[error("the url '{0}' has no host to crawl")]
    MissingHost(String),

    #[error("invalid min/max length combination: {min}, {max} (at least one bound must be non-zero)")]
    UnboundedLength { min: usize, max: usize },

    #[error("invalid min/max length combination: {min}, {max} (min is greater than max)")]
    InvertedLength { min: usize, max: usize },

    #[error("concurrency must be greater than 0")]
    ZeroConcurrency,

    #[error("channel multiplier must be greater than 0")]
    ZeroMultiplier,

    #[error("request timeout must be greater than 0 seconds")]
    ZeroTimeout,

    #[error("concurrency {concurrency} × multiplier {multiplier} exceeds the channel capacity limit of {max}")]
    ChannelTooLarge {
        concurrency: usize,
        multiplier: usize,
        max: usize,
    },

    #[error("dictionary size {size} exceeds the limit of {max}")]
    DictionaryTooLarge { size: usize, max: usize },
}

/// Word-length window applied by the fetcher when building a page histogram.
///
/// A bound of 0 means "no limit on that side". Lengths are counted in
/// characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthFilter {
    min: usize,
    max: usize,
}

impl LengthFilter {
    pub fn new(min: usize, max: usize) -> Result<Self, ConfigError> {
        if min == 0 && max == 0 {
            return Err(ConfigError::UnboundedLength { min, max });
        }
        if max > 0 && min > max {
            return Err(ConfigError::InvertedLength { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    // 0 means unbounded
    pub fn max(&self) -> usize {
        self.max
    }

    pub fn accepts(&self, len: usize) -> bool {
        len >= self.min && (self.max == 0 || len <= self.max)
    }
}

// A fully validated crawl configuration
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: Url,
    pub concurrency: usize,
    pub multiplier: usize,
    pub lengths: LengthFilter,
    pub top_words: usize,
    // 0 means no cap on the number of scheduled pages
    pub iterations: usize,
    pub dict_size: usize,
    pub request_timeout: Duration,
}

impl CrawlConfig {
    // Parses the start URL and validates it together with the numeric options.
    // Everything else gets the defaults; callers override fields afterwards
    // and call validate() again if they touch anything that can be invalid.
    pub fn new(start_url: &str, lengths: LengthFilter) -> Result<Self, ConfigError> {
        let config = Self {
            start_url: parse_start_url(start_url)?,
            concurrency: DEFAULT_CONCURRENCY,
            multiplier: DEFAULT_MULTIPLIER,
            lengths,
            top_words: DEFAULT_TOP_WORDS,
            iterations: 0,
            dict_size: DEFAULT_DICT_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.multiplier == 0 {
            return Err(ConfigError::ZeroMultiplier);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        match self.concurrency.checked_mul(self.multiplier) {
            Some(capacity) if capacity <= MAX_CHANNEL_CAPACITY => {}
            _ => {
                return Err(ConfigError::ChannelTooLarge {
                    concurrency: self.concurrency,
                    multiplier: self.multiplier,
                    max: MAX_CHANNEL_CAPACITY,
                })
            }
        }
        if self.dict_size > MAX_DICT_SIZE {
            return Err(ConfigError::DictionaryTooLarge {
                size: self.dict_size,
                max: MAX_DICT_SIZE,
            });
        }
        Ok(())
    }

    // Capacity shared by the task queue and the relief channel. Clamped so
    // that fields changed after validate() still cannot panic the channels.
    pub fn channel_capacity(&self) -> usize {
        self.concurrency
            .saturating_mul(self.multiplier)
            .clamp(1, MAX_CHANNEL_CAPACITY)
    }

    // Initial dictionary capacity, clamped like channel_capacity()
    pub fn dict_capacity(&self) -> usize {
        self.dict_size.min(MAX_DICT_SIZE)
    }
}

fn parse_start_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme(raw.to_string()));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(ConfigError::MissingHost(raw.to_string())),
    }
}
