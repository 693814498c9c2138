//! Suggestion for a spelling correction.
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::cmp::Ordering;

use crate::tokenizer::case_handling::lower_case;

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Suggestion for a spelling correction
pub struct Suggestion {
    /// the suggested word-form
    pub value: SmolStr,
    /// edit distance from the checked word
    pub distance: usize,
}

impl Suggestion {
    /// creates a spelling correction suggestion
    pub fn new(value: SmolStr, distance: usize) -> Suggestion {
        Suggestion { value, distance }
    }

    /// gets the suggested word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the edit distance of the suggestion
    pub fn distance(&self) -> usize {
        self.distance
    }
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ascending distance, then case-insensitive word order. Words equal
/// ignoring case fall back to exact order so the ordering stays total.
impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| lower_case(&self.value).cmp(&lower_case(&other.value)))
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.distance == other.distance
    }
}

impl Eq for Suggestion {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_distance_then_word() {
        let mut list = vec![
            Suggestion::new("dog".into(), 3),
            Suggestion::new("cats".into(), 2),
            Suggestion::new("Cat".into(), 2),
            Suggestion::new("bat".into(), 2),
            Suggestion::new("cat".into(), 2),
        ];
        list.sort();
        let words = list.iter().map(|s| s.value()).collect::<Vec<_>>();
        assert_eq!(words, vec!["bat", "Cat", "cat", "cats", "dog"]);
    }
}
