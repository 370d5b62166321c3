//! Overlapping word windows for texts longer than a model's context.
//!
//! Length is measured in whitespace-separated words. Texts at or under the
//! threshold pass through untouched. Longer texts are cut into windows of
//! `max_tokens` words that advance by `stride`, so consecutive windows share
//! `max_tokens - stride` words and an entity straddling a cut still appears
//! whole in one of them.

use std::ops::Range;

use redditagger_common::TaggerError;

pub const SHORT_TEXT_THRESHOLD: usize = 256;
pub const WINDOW_TOKENS: usize = 356;
pub const WINDOW_STRIDE: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    threshold: usize,
    max_tokens: usize,
    stride: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            threshold: SHORT_TEXT_THRESHOLD,
            max_tokens: WINDOW_TOKENS,
            stride: WINDOW_STRIDE,
        }
    }
}

impl Segmenter {
    /// `stride` must be in `1..=max_tokens`, otherwise windows would leave gaps.
    pub fn new(threshold: usize, max_tokens: usize, stride: usize) -> Result<Self, TaggerError> {
        if max_tokens == 0 {
            return Err(TaggerError::Validation(
                "window size must be at least one word".into(),
            ));
        }
        if stride == 0 || stride > max_tokens {
            return Err(TaggerError::Validation(format!(
                "stride {stride} must be between 1 and the window size {max_tokens}"
            )));
        }
        Ok(Self {
            threshold,
            max_tokens,
            stride,
        })
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn segment(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= self.threshold {
            return vec![text.to_string()];
        }

        self.window_ranges(words.len())
            .into_iter()
            .map(|range| words[range].join(" "))
            .collect()
    }

    /// Word-index ranges of each window over a text of `word_count` words.
    /// Stops at the first window that reaches the end.
    pub fn window_ranges(&self, word_count: usize) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.max_tokens).min(word_count);
            ranges.push(start..end);
            if end >= word_count {
                break;
            }
            start += self.stride;
        }
        ranges
    }
}
