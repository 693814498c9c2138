use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use hashbrown::{HashMap, HashSet};
use serde::Serialize;
use smol_str::SmolStr;

use super::encoder::{EncodeError, Encoder};
use super::error::BuildError;
use super::packed::EncodedWord;
use crate::dictionary::{Dictionary, Membership};
use crate::loader::WordSource;
use crate::transform::Transformation;

/// All words of one packed byte length, sorted and concatenated.
struct Bucket {
    record_len: usize,
    data: Box<[u8]>,
}

impl Bucket {
    #[inline(always)]
    fn count(&self) -> usize {
        self.data.len() / self.record_len
    }

    #[inline(always)]
    fn records(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(self.record_len)
    }
}

/// Sizes of a built dictionary, per packed record length.
#[derive(Debug, Clone, Serialize)]
pub struct DictionaryStats {
    /// dictionary name
    pub name: SmolStr,
    /// distinct words stored
    pub words: usize,
    /// letters in the alphabet
    pub alphabet_size: usize,
    /// bits per packed symbol
    pub bits_per_symbol: u32,
    /// total size of all records
    pub packed_bytes: usize,
    /// per record length, shortest first
    pub buckets: Vec<BucketStats>,
}

/// Size of one length bucket.
#[derive(Debug, Clone, Serialize)]
pub struct BucketStats {
    /// bytes per record
    pub record_len: usize,
    /// records in the bucket
    pub words: usize,
}

/// An immutable word list stored as bit-packed, length-bucketed records.
///
/// Built in one pass from a [`WordSource`]; rebuilt from scratch when the
/// source changes.
pub struct CompressedDictionary {
    name: SmolStr,
    encoder: Encoder,
    buckets: Vec<Bucket>,
    words_count: usize,
    transform: Transformation,
}

impl CompressedDictionary {
    /// Builds a dictionary from every word `source` yields.
    ///
    /// Words the normalizer rejects, and words too long to encode, are
    /// skipped. A word list needing more than 255 distinct characters fails
    /// with [`BuildError::AlphabetOverflow`] naming the first word that did
    /// not fit.
    pub fn create(
        source: &dyn WordSource,
        transform: &Transformation,
    ) -> Result<CompressedDictionary, BuildError> {
        let name = SmolStr::new(source.name());
        let mut encoder = Encoder::new();
        let mut encoded: Vec<EncodedWord> = Vec::new();
        let mut overflow: Option<(SmolStr, char)> = None;
        let mut skipped = 0usize;

        source.load(&mut |raw| {
            if overflow.is_some() {
                return;
            }

            let word = match transform.transform(raw) {
                Some(v) => v,
                None => return,
            };

            match encoder.encode_growing(&word) {
                Ok(v) => encoded.push(v),
                Err(EncodeError::AlphabetFull(ch)) => overflow = Some((word, ch)),
                Err(e) => {
                    log::trace!("{}: skipping '{}': {}", name, word, e);
                    skipped += 1;
                }
            }
        })?;

        if let Some((word, character)) = overflow {
            return Err(BuildError::AlphabetOverflow {
                dictionary: name,
                word,
                character,
            });
        }

        if skipped > 0 {
            log::debug!("{}: skipped {} unencodable words", name, skipped);
        }

        Ok(CompressedDictionary::pack(name, encoder, encoded, *transform))
    }

    /// Freezes the alphabet, then packs, deduplicates and sorts every word.
    fn pack(
        name: SmolStr,
        encoder: Encoder,
        encoded: Vec<EncodedWord>,
        transform: Transformation,
    ) -> CompressedDictionary {
        let bits = encoder.bits();
        let mut raw: HashMap<usize, BTreeSet<Box<[u8]>>> = HashMap::new();

        for word in encoded.iter() {
            let packed = word.pack(bits);
            raw.entry(packed.len()).or_default().insert(packed);
        }

        let mut words_count = 0;
        let mut buckets = raw
            .into_iter()
            .map(|(record_len, set)| {
                words_count += set.len();
                let mut data = Vec::with_capacity(record_len * set.len());
                for packed in set.iter() {
                    data.extend_from_slice(packed);
                }
                Bucket {
                    record_len,
                    data: data.into_boxed_slice(),
                }
            })
            .collect::<Vec<_>>();
        buckets.sort_by_key(|b| b.record_len);

        log::debug!(
            "{}: packed {} words into {} buckets ({} bits/symbol)",
            name,
            words_count,
            buckets.len(),
            bits
        );

        CompressedDictionary {
            name,
            encoder,
            buckets,
            words_count,
            transform,
        }
    }

    /// The encoder records were packed with.
    #[inline(always)]
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// The normalizer the dictionary was built with.
    pub fn transformation(&self) -> &Transformation {
        &self.transform
    }

    fn bucket(&self, record_len: usize) -> Option<&Bucket> {
        self.buckets
            .binary_search_by_key(&record_len, |b| b.record_len)
            .ok()
            .map(|i| &self.buckets[i])
    }

    /// Sizes, for reporting.
    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            name: self.name.clone(),
            words: self.words_count,
            alphabet_size: self.encoder.alphabet().len(),
            bits_per_symbol: self.encoder.bits(),
            packed_bytes: self.buckets.iter().map(|b| b.data.len()).sum(),
            buckets: self
                .buckets
                .iter()
                .map(|b| BucketStats {
                    record_len: b.record_len,
                    words: b.count(),
                })
                .collect(),
        }
    }
}

impl Dictionary for CompressedDictionary {
    fn name(&self) -> &str {
        &self.name
    }

    /// Partially unknown words are `Unknown` just like entirely unknown
    /// ones, so mixed-script tokens are never flagged by this dictionary.
    fn contains(&self, word: &str) -> Membership {
        let word = match self.transform.transform(word) {
            Some(v) => v,
            None => return Membership::Unknown,
        };

        let encoded = match self.encoder.encode(&word) {
            Ok(v) => v,
            Err(e) => {
                log::trace!("{}: cannot judge '{}': {}", self.name, word, e);
                return Membership::Unknown;
            }
        };

        let packed = self.encoder.pack(&encoded);

        match self.bucket(packed.len()) {
            Some(bucket) if binary_search(&packed, &bucket.data).is_ok() => Membership::Yes,
            _ => Membership::No,
        }
    }

    fn words_starting_with(&self, first: char, min_len: usize, max_len: usize) -> Vec<SmolStr> {
        let index = match self.encoder.alphabet().get(first) {
            Some(v) => v,
            None => return vec![],
        };

        let bits = self.encoder.bits() as usize;
        let mut result = vec![];

        for bucket in self.buckets.iter() {
            // a record of n bytes holds more than (n - 1) * 8 / bits symbols
            let most = bucket.record_len * 8 / bits;
            let fewest = (bucket.record_len - 1) * 8 / bits + 1;
            if most < min_len || fewest > max_len {
                continue;
            }

            for record in bucket.records() {
                if self.encoder.first_symbol(record) != Some(index) {
                    continue;
                }

                let word = self.encoder.decode(record);
                let len = word.chars().count();
                if len >= min_len && len <= max_len {
                    result.push(word);
                }
            }
        }

        result
    }

    fn words(&self) -> HashSet<SmolStr> {
        self.buckets
            .iter()
            .flat_map(|b| b.records())
            .map(|record| self.encoder.decode(record))
            .collect()
    }

    fn len(&self) -> usize {
        self.words_count
    }
}

impl fmt::Debug for CompressedDictionary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CompressedDictionary {{ words_count: {}, name: {:?} }}",
            self.words_count, self.name
        )
    }
}

/// Binary search for `goal` among the `goal.len()`-sized records of
/// `data`, compared as unsigned bytes.
///
/// Mirrors `slice::binary_search`: `Ok(record)` on a hit, otherwise
/// `Err(insertion point)`.
pub fn binary_search(goal: &[u8], data: &[u8]) -> Result<usize, usize> {
    let unit = goal.len();
    if unit == 0 {
        return Err(0);
    }

    let mut low = 0usize;
    let mut high = data.len() / unit;

    while low < high {
        let mid = low + (high - low) / 2;
        let record = &data[mid * unit..(mid + 1) * unit];

        match record.cmp(goal) {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
            Ordering::Equal => return Ok(mid),
        }
    }

    Err(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::WordList;

    fn build(words: &[&str]) -> CompressedDictionary {
        let source = WordList::new("test", words);
        CompressedDictionary::create(&source, &Transformation::new()).unwrap()
    }

    #[test]
    fn contains_every_inserted_word() {
        let words = [
            "apple", "banana", "cherry", "damson", "elderberry", "fig", "grape", "honeydew",
            "kiwi", "lemon", "mango", "nectarine", "orange", "papaya", "quince",
        ];
        let dict = build(&words);
        for word in words.iter().filter(|w| w.len() >= 3) {
            assert_eq!(dict.contains(word), Membership::Yes, "{}", word);
        }
    }

    #[test]
    fn scenario_membership() {
        let dict = build(&["cat", "cats", "dog", "bird"]);
        assert_eq!(dict.contains("cat"), Membership::Yes);
        assert_eq!(dict.contains("cats"), Membership::Yes);
        assert_eq!(dict.contains("bird"), Membership::Yes);
        assert_eq!(dict.contains("tac"), Membership::No);
        assert_eq!(dict.contains("dogs"), Membership::No);
        assert_eq!(dict.contains("catscats"), Membership::No);
    }

    #[test]
    fn unknown_alphabet_cannot_judge() {
        let dict = build(&["cat", "cats", "dog"]);
        assert_eq!(dict.contains("xyz"), Membership::Unknown);
        // partially known words are not asserted misspelled either
        assert_eq!(dict.contains("cab"), Membership::Unknown);
        assert_eq!(dict.contains("кот"), Membership::Unknown);
    }

    #[test]
    fn build_normalizes_and_deduplicates() {
        let dict = build(&["Cat", "cat", "  CAT ", "at", "", "dog"]);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.contains("cat"), Membership::Yes);
        assert_eq!(dict.contains("at"), Membership::Unknown);
    }

    #[test]
    fn words_round_trip() {
        let source = ["straße", "čáhci", "naïve", "über", "zebra", "zebras", "déjà"];
        let dict = build(&source);
        let t = Transformation::new();
        let expected = t.transform_all(source.iter());
        assert_eq!(dict.words(), expected);
    }

    #[test]
    fn candidates_by_first_letter() {
        let dict = build(&["cat", "cats", "catalogue", "dog", "cow", "act"]);

        let mut words = dict.words_starting_with('c', 0, usize::MAX);
        words.sort();
        assert_eq!(words, vec!["cat", "catalogue", "cats", "cow"]);

        let mut words = dict.words_starting_with('c', 3, 4);
        words.sort();
        assert_eq!(words, vec!["cat", "cats", "cow"]);

        assert!(dict.words_starting_with('q', 0, usize::MAX).is_empty());
        assert_eq!(dict.words_starting_with('a', 0, usize::MAX), vec!["act"]);
    }

    #[test]
    fn overflow_fails_the_build() {
        let words = ('\u{4e00}'..'\u{5000}')
            .collect::<Vec<char>>()
            .chunks(4)
            .map(|c| c.iter().collect::<String>())
            .collect::<Vec<_>>();
        let source = WordList::new("huge", &words);

        match CompressedDictionary::create(&source, &Transformation::new()) {
            Err(BuildError::AlphabetOverflow {
                dictionary,
                word,
                character,
            }) => {
                assert_eq!(dictionary, "huge");
                assert!(word.contains(character));
            }
            other => panic!("expected overflow, got {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn empty_source_builds_empty_dictionary() {
        let dict = build(&[]);
        assert!(dict.is_empty());
        assert_eq!(dict.contains("anything"), Membership::Unknown);
        assert!(dict.words_starting_with('a', 0, usize::MAX).is_empty());
    }

    #[test]
    fn binary_search_over_records() {
        let data = [1u8, 1, 1, 5, 3, 0, 9, 9];
        assert_eq!(binary_search(&[1, 5], &data), Ok(1));
        assert_eq!(binary_search(&[9, 9], &data), Ok(3));
        assert_eq!(binary_search(&[0, 0], &data), Err(0));
        assert_eq!(binary_search(&[2, 0], &data), Err(2));
        assert_eq!(binary_search(&[255, 0], &data), Err(4));
        assert_eq!(binary_search(&[1], &[]), Err(0));
    }

    #[test]
    fn bucket_stats() {
        let dict = build(&["cat", "cats", "dog"]);
        let stats = dict.stats();
        assert_eq!(stats.words, 3);
        assert_eq!(stats.alphabet_size, 7);
        assert_eq!(stats.bits_per_symbol, 3);
        assert_eq!(stats.buckets.iter().map(|b| b.words).sum::<usize>(), 3);
    }
}
