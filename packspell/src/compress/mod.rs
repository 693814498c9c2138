//! Bit-packed word lists.
//!
//! Every dictionary owns an [`Alphabet`] mapping characters to small
//! indices. Words become index sequences, which are packed using only as
//! many bits per symbol as the alphabet needs and stored in fixed-width,
//! sorted records grouped by packed length.

/// Per-dictionary character tables.
pub mod alphabet;
/// Length-bucketed sorted records.
pub mod dictionary;
/// Words to packed records and back.
pub mod encoder;
mod error;
/// Bit packing of symbol indices.
pub mod packed;

pub use self::alphabet::Alphabet;
pub use self::dictionary::{BucketStats, CompressedDictionary, DictionaryStats};
pub use self::encoder::{EncodeError, Encoder};
pub use self::error::BuildError;
pub use self::packed::EncodedWord;
