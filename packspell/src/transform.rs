//! Canonical form of a token before any lookup.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::constants::MIN_WORD_LENGTH;
use crate::tokenizer::case_handling::lower_case;

/// Trims, rejects short tokens and lower-cases the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    min_length: usize,
}

impl Transformation {
    /// Normalizer with the default minimum length.
    pub const fn new() -> Transformation {
        Transformation::with_min_length(MIN_WORD_LENGTH)
    }

    /// Normalizer rejecting words shorter than `min_length` characters.
    pub const fn with_min_length(min_length: usize) -> Transformation {
        Transformation { min_length }
    }

    /// Shortest accepted word, in characters.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// The normalized word, or `None` when it is too short to judge.
    pub fn transform(&self, word: &str) -> Option<SmolStr> {
        let word = word.trim();

        if word.chars().count() < self.min_length.max(1) {
            return None;
        }

        Some(lower_case(word))
    }

    /// Normalizes every word, dropping the rejected ones.
    pub fn transform_all<I, S>(&self, words: I) -> HashSet<SmolStr>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        words
            .into_iter()
            .filter_map(|w| self.transform(w.as_ref()))
            .collect()
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Transformation::new()
    }
}
