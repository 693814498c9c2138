/// Longest word, in characters, that can be encoded.
pub const MAX_WORD_LENGTH: usize = 64;

/// Largest alphabet index. Index 0 is the terminator, so an alphabet holds
/// at most this many letters and a symbol never needs more than 8 bits.
pub const MAX_UNIT_VALUE: u8 = 255;

/// Tokens shorter than this (after trimming) are not checked.
pub const MIN_WORD_LENGTH: usize = 3;

/// Default number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 5;

/// Default allowed distance gap between the best suggestion and the rest.
pub const MAX_METRICS: usize = 1;

/// Name of the user dictionary owned by every engine.
pub const USER_DICTIONARY: &str = "user";

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn test_MAX_UNIT_VALUE() {
        let bits = 8 - MAX_UNIT_VALUE.leading_zeros();
        assert_eq!(bits, 8);
    }

    #[test]
    fn test_MAX_WORD_LENGTH() {
        // a full-width word still fits a u8 symbol count
        assert!(MAX_WORD_LENGTH <= u8::MAX as usize);
    }
}
