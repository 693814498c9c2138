use smol_str::SmolStr;

use super::alphabet::Alphabet;
use super::packed::{self, bits_per_symbol, EncodedWord};
use crate::constants::MAX_WORD_LENGTH;

/// Why a word could not be expressed in an alphabet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// The word has no characters
    #[error("cannot encode an empty word")]
    Empty,

    /// The word is longer than the encodable maximum
    #[error("word of {0} characters exceeds the maximum length")]
    TooLong(usize),

    /// None of the word's characters are in the alphabet
    #[error("no character of the word is in the alphabet")]
    EntirelyUnknown,

    /// Some, but not all, of the word's characters are in the alphabet
    #[error("{unknown} of {total} characters are not in the alphabet")]
    PartiallyUnknown {
        /// count of unmapped characters
        unknown: usize,
        /// count of characters in the word
        total: usize,
    },

    /// The alphabet is full and cannot take this character
    #[error("alphabet is full, cannot add {0:?}")]
    AlphabetFull(char),
}

impl EncodeError {
    /// True for the failures that mean "outside this alphabet's domain"
    /// rather than "malformed word".
    pub fn is_unknown_letters(&self) -> bool {
        matches!(
            self,
            EncodeError::EntirelyUnknown | EncodeError::PartiallyUnknown { .. }
        )
    }
}

/// Converts words to alphabet indices and packed bytes, and back.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    alphabet: Alphabet,
}

impl Encoder {
    /// An encoder over an empty alphabet.
    pub fn new() -> Encoder {
        Encoder::default()
    }

    /// An encoder over a prepared alphabet.
    pub fn with_alphabet(alphabet: Alphabet) -> Encoder {
        Encoder { alphabet }
    }

    /// The alphabet, as grown so far.
    #[inline(always)]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Bits per packed symbol for the alphabet as it stands now.
    #[inline(always)]
    pub fn bits(&self) -> u32 {
        bits_per_symbol(self.alphabet.last_used())
    }

    /// Encodes `word` against the alphabet without growing it.
    pub fn encode(&self, word: &str) -> Result<EncodedWord, EncodeError> {
        let total = check_length(word)?;
        let mut unknown = 0;
        let mut indices = Vec::with_capacity(total);

        for ch in word.chars() {
            match self.alphabet.get(ch) {
                Some(index) => indices.push(index),
                None => unknown += 1,
            }
        }

        match unknown {
            0 => Ok(EncodedWord::new(indices)),
            n if n == total => Err(EncodeError::EntirelyUnknown),
            n => Err(EncodeError::PartiallyUnknown { unknown: n, total }),
        }
    }

    /// Encodes `word`, adding unseen characters to the alphabet.
    ///
    /// On `AlphabetFull` the characters preceding the offending one may
    /// already have been added.
    pub fn encode_growing(&mut self, word: &str) -> Result<EncodedWord, EncodeError> {
        let total = check_length(word)?;
        let mut indices = Vec::with_capacity(total);

        for ch in word.chars() {
            match self.alphabet.index_of(ch, true) {
                Some(index) => indices.push(index),
                None => return Err(EncodeError::AlphabetFull(ch)),
            }
        }

        Ok(EncodedWord::new(indices))
    }

    /// Packs an encoded word with the current symbol width.
    #[inline(always)]
    pub fn pack(&self, word: &EncodedWord) -> Box<[u8]> {
        word.pack(self.bits())
    }

    /// Decodes a packed word back to its characters.
    pub fn decode(&self, packed: &[u8]) -> SmolStr {
        packed::unpack(packed, self.bits())
            .map_while(|index| self.alphabet.letter(index))
            .collect()
    }

    /// Alphabet index of the first symbol of a record.
    #[inline(always)]
    pub fn first_symbol(&self, packed: &[u8]) -> Option<u8> {
        packed
            .first()
            .map(|&b| packed::first_symbol(b, self.bits()))
            .filter(|&index| index != 0)
    }
}

fn check_length(word: &str) -> Result<usize, EncodeError> {
    let total = word.chars().count();

    if total == 0 {
        return Err(EncodeError::Empty);
    }

    if total > MAX_WORD_LENGTH {
        return Err(EncodeError::TooLong(total));
    }

    Ok(total)
}
