// src/crawl/ranking.rs
// Top-N word selection over the final histogram.

use serde::Serialize;

use crate::fetch::Histogram;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

// Returns up to `n` words, highest count first. Words with equal counts
// come out in no particular order.
pub fn top_words(histogram: &Histogram, n: usize) -> Vec<WordCount> {
    let mut ranked: Vec<WordCount> = histogram
        .iter()
        .map(|(word, &count)| WordCount {
            word: word.clone(),
            count,
        })
        .collect();

    ranked.sort_unstable_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}
