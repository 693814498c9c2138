use std::sync::Arc;

use itertools::Itertools;
use smol_str::SmolStr;

use super::suggestion::Suggestion;
use crate::dictionary::Dictionary;
use crate::metrics::{LevenshteinDistance, Metrics};

/// Picks and orders corrections for a normalized word.
pub struct SuggestionRanker {
    metrics: Box<dyn Metrics>,
}

impl SuggestionRanker {
    /// Ranks by Levenshtein distance.
    pub fn new() -> SuggestionRanker {
        SuggestionRanker::with_metrics(Box::new(LevenshteinDistance))
    }

    /// Ranks by a custom metric.
    pub fn with_metrics(metrics: Box<dyn Metrics>) -> SuggestionRanker {
        SuggestionRanker { metrics }
    }

    /// Every dictionary word sharing `word`'s first letter, scored.
    pub fn candidates(&self, word: &str, dictionaries: &[Arc<dyn Dictionary>]) -> Vec<Suggestion> {
        let first = match word.chars().next() {
            Some(v) => v,
            None => return vec![],
        };

        dictionaries
            .iter()
            .flat_map(|d| d.words_starting_with(first, 0, usize::MAX))
            .map(|candidate| {
                let distance = self.metrics.distance(word, &candidate);
                Suggestion::new(candidate, distance)
            })
            .collect()
    }

    /// The best `threshold` candidates no further than `quality` from the
    /// best distance found.
    pub fn rank(
        &self,
        word: &str,
        dictionaries: &[Arc<dyn Dictionary>],
        threshold: usize,
        quality: usize,
    ) -> Vec<Suggestion> {
        let mut candidates = self.candidates(word, dictionaries);
        log::trace!("{}: {} candidates", word, candidates.len());
        candidates.sort();
        best_of(candidates, threshold, quality)
    }
}

impl Default for SuggestionRanker {
    fn default() -> Self {
        SuggestionRanker::new()
    }
}

/// Deduplicates sorted suggestions by word and cuts them off by count and
/// by distance from the best one.
pub(crate) fn best_of(sorted: Vec<Suggestion>, threshold: usize, quality: usize) -> Vec<Suggestion> {
    let best = match sorted.first() {
        Some(v) => v.distance,
        None => return vec![],
    };

    sorted
        .into_iter()
        .unique_by(|s| s.value.clone())
        .take_while(|s| s.distance <= best + quality)
        .take(threshold)
        .collect()
}

/// Plain words of a suggestion list.
pub fn values(suggestions: &[Suggestion]) -> Vec<SmolStr> {
    suggestions.iter().map(|s| s.value.clone()).collect()
}
