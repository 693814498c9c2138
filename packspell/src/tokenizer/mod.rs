//! Splitting text into checkable tokens.
//!
//! Which parts of a document are words is decided outside the engine; this
//! module only provides the seam ([`SpellcheckingStrategy`]) and a plain
//! text implementation of it.

use unic_segment::{WordBoundIndices, Words};
use unic_ucd_category::GeneralCategory;

/// Case predicates and case restoration.
pub mod case_handling;

/// Unicode word segmentation of strings.
pub trait Tokenize {
    /// Every segment, whitespace and punctuation included, with byte offsets.
    fn word_bound_indices(&self) -> WordBoundIndices;
    /// Segments containing at least one letter.
    fn words(&self) -> Words;
    /// Letter-bearing segments with byte offsets.
    fn word_indices(&self) -> WordIndices;
}

impl Tokenize for str {
    fn word_bound_indices(&self) -> WordBoundIndices {
        WordBoundIndices::new(self)
    }

    fn words(&self) -> Words {
        Words::new(self, |s| s.chars().any(is_letter))
    }

    fn word_indices(&self) -> WordIndices {
        WordIndices {
            inner: WordBoundIndices::new(self),
        }
    }
}

/// Word-bound segments that contain at least one letter, with their byte
/// offsets.
pub struct WordIndices<'a> {
    inner: WordBoundIndices<'a>,
}

impl<'a> Iterator for WordIndices<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find(|(_, s)| s.chars().any(is_letter))
    }
}

#[inline(always)]
fn is_letter(ch: char) -> bool {
    GeneralCategory::of(ch).is_letter()
}

/// Capability a host implements to hand tokens to the engine.
pub trait SpellcheckingStrategy {
    /// Tokens of `text` worth checking, with their byte offsets.
    fn tokens<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)>;
}

/// Treats the whole input as prose.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextStrategy;

impl SpellcheckingStrategy for PlainTextStrategy {
    fn tokens<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        text.word_indices().collect()
    }
}
