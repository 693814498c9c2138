use std::fmt;

use crate::constants::MAX_UNIT_VALUE;

/// Per-dictionary symbol table mapping characters to dense indices.
///
/// Index 0 never holds a letter: it terminates a packed word. Letters are
/// assigned `1..=last_used` in order of first sight.
#[derive(Clone)]
pub struct Alphabet {
    letters: Vec<char>,
    capacity: u8,
}

impl Alphabet {
    /// An empty alphabet that can hold up to 255 letters.
    pub fn new() -> Alphabet {
        Alphabet::with_capacity(MAX_UNIT_VALUE)
    }

    /// An empty alphabet that refuses letters beyond `capacity`.
    pub fn with_capacity(capacity: u8) -> Alphabet {
        let mut letters = Vec::with_capacity(capacity as usize + 1);
        letters.push('\0');
        Alphabet { letters, capacity }
    }

    /// Builds an alphabet holding exactly the distinct letters of `chars`.
    pub fn from_letters(chars: &str) -> Alphabet {
        let mut alphabet = Alphabet::new();
        for ch in chars.chars() {
            alphabet.index_of(ch, true);
        }
        alphabet
    }

    /// Looks up the index of `letter`, appending it when `force_add` is set.
    ///
    /// Returns `None` when the letter is absent and either `force_add` is
    /// false or the alphabet is full.
    pub fn index_of(&mut self, letter: char, force_add: bool) -> Option<u8> {
        match self.get(letter) {
            Some(index) => Some(index),
            None if force_add => self.add(letter),
            None => None,
        }
    }

    /// Read-only lookup.
    #[inline(always)]
    pub fn get(&self, letter: char) -> Option<u8> {
        if letter == '\0' {
            return None;
        }

        self.letters
            .iter()
            .skip(1)
            .position(|&c| c == letter)
            .map(|i| (i + 1) as u8)
    }

    fn add(&mut self, letter: char) -> Option<u8> {
        if letter == '\0' || self.last_used() >= self.capacity {
            return None;
        }

        self.letters.push(letter);
        Some(self.last_used())
    }

    /// The letter stored at `index`, `None` for the terminator or an
    /// unassigned index.
    #[inline(always)]
    pub fn letter(&self, index: u8) -> Option<char> {
        match index {
            0 => None,
            i => self.letters.get(i as usize).copied(),
        }
    }

    /// Highest assigned index, 0 when empty.
    #[inline(always)]
    pub fn last_used(&self) -> u8 {
        (self.letters.len() - 1) as u8
    }

    /// Number of assigned letters.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.letters.len() - 1
    }

    /// Whether no letter has been assigned.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether no further letter can be assigned.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.last_used() >= self.capacity
    }

    /// Assigned letters in index order.
    pub fn letters(&self) -> &[char] {
        &self.letters[1..]
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::new()
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Alphabet")
            .field("letters", &self.letters().iter().collect::<String>())
            .field("capacity", &self.capacity)
            .finish()
    }
}
