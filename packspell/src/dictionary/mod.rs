use std::fmt::Debug;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

mod editable;

pub use self::editable::EditableDictionary;

/// Answer of a single dictionary to "do you know this word?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Membership {
    /// The word is in the dictionary
    Yes,
    /// The word is representable but absent
    No,
    /// The dictionary cannot judge the word
    Unknown,
}

impl Membership {
    /// Folds the answers of several dictionaries into a verdict.
    ///
    /// Any `Yes` wins. With no `Yes`, the word is only misspelled if some
    /// dictionary said `No`; all-`Unknown` (or no answers) assumes correct.
    pub fn is_correct<I: IntoIterator<Item = Membership>>(answers: I) -> bool {
        let mut seen_no = false;

        for answer in answers {
            match answer {
                Membership::Yes => return true,
                Membership::No => seen_no = true,
                Membership::Unknown => {}
            }
        }

        !seen_no
    }
}

/// A word list that can be queried with normalized words.
pub trait Dictionary: Debug + Send + Sync {
    /// Name the dictionary is registered under.
    fn name(&self) -> &str;

    /// Tri-state membership of `word`.
    fn contains(&self, word: &str) -> Membership;

    /// Stored words beginning with `first` whose length in characters is
    /// within `min_len..=max_len`.
    fn words_starting_with(&self, first: char, min_len: usize, max_len: usize) -> Vec<SmolStr>;

    /// Every stored word.
    fn words(&self) -> HashSet<SmolStr>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
