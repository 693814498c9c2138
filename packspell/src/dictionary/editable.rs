use std::fmt;

use hashbrown::HashSet;
use parking_lot::RwLock;
use smol_str::SmolStr;

use super::{Dictionary, Membership};

/// A small mutable word set, such as the user or project dictionary.
///
/// Words are stored exactly as given; callers normalize them first. The
/// dictionary only ever confirms words, so a miss is `Unknown`, not `No`.
pub struct EditableDictionary {
    name: SmolStr,
    words: RwLock<HashSet<SmolStr>>,
}

impl EditableDictionary {
    /// An empty dictionary.
    pub fn new(name: &str) -> EditableDictionary {
        EditableDictionary {
            name: name.into(),
            words: RwLock::new(HashSet::new()),
        }
    }

    /// A dictionary holding `words`.
    pub fn with_words<I, S>(name: &str, words: I) -> EditableDictionary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dictionary = EditableDictionary::new(name);
        dictionary.add_all(words);
        dictionary
    }

    /// Adds `word`; empty words are ignored.
    pub fn add(&self, word: &str) {
        if word.is_empty() {
            return;
        }
        self.words.write().insert(word.into());
    }

    /// Adds every non-empty word.
    pub fn add_all<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = self.words.write();
        guard.extend(
            words
                .into_iter()
                .filter(|w| !w.as_ref().is_empty())
                .map(|w| SmolStr::new(w.as_ref())),
        );
    }

    /// Whether `word` was present.
    pub fn remove(&self, word: &str) -> bool {
        self.words.write().remove(word)
    }

    /// Swaps the whole word set in one step.
    pub fn replace_all<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = words
            .into_iter()
            .filter(|w| !w.as_ref().is_empty())
            .map(|w| SmolStr::new(w.as_ref()))
            .collect::<HashSet<_>>();
        *self.words.write() = next;
    }

    /// Removes every word.
    pub fn clear(&self) {
        self.words.write().clear();
    }
}

impl Dictionary for EditableDictionary {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, word: &str) -> Membership {
        if self.words.read().contains(word) {
            Membership::Yes
        } else {
            Membership::Unknown
        }
    }

    fn words_starting_with(&self, first: char, min_len: usize, max_len: usize) -> Vec<SmolStr> {
        self.words
            .read()
            .iter()
            .filter(|w| w.starts_with(first))
            .filter(|w| {
                let len = w.chars().count();
                len >= min_len && len <= max_len
            })
            .cloned()
            .collect()
    }

    fn words(&self) -> HashSet<SmolStr> {
        self.words.read().clone()
    }

    fn len(&self) -> usize {
        self.words.read().len()
    }
}

impl fmt::Debug for EditableDictionary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "EditableDictionary {{ name: {:?}, words.count: {} }}",
            self.name,
            self.len()
        )
    }
}
