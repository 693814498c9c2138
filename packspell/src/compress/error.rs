use smol_str::SmolStr;

use crate::loader::LoadError;

/// Errors that stop a compressed dictionary from being built.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// The word list uses more distinct characters than an alphabet holds
    #[error("dictionary '{dictionary}' overflows its alphabet at {character:?} in '{word}'")]
    AlphabetOverflow {
        /// name of the word source
        dictionary: SmolStr,
        /// normalized word that could not be encoded
        word: SmolStr,
        /// first character that did not fit
        character: char,
    },

    /// The word source could not be read
    #[error(transparent)]
    Load(#[from] LoadError),
}
