/*! Spell-checking and correction against compressed word lists.

Dictionaries are plain word lists. Each is normalized, encoded against its
own alphabet and bit-packed into sorted fixed-width records, so lookups are
binary searches over a few bytes per word. Corrections are ranked by edit
distance against every word sharing the first letter of the misspelling.

# Usage examples

```
use std::sync::Arc;
use packspell::loader::WordList;
use packspell::speller::{EngineConfig, SpellCheckEngine, Speller};

let engine = SpellCheckEngine::new(EngineConfig::blocking());
engine.load_dictionary(Arc::new(WordList::new("english", ["cat", "cats", "dog"])));

assert!(engine.is_correct("Cat"));
assert!(!engine.is_correct("cta"));
assert_eq!(engine.get_suggestions("cta")[0], "cat");
```

Further examples of how to use the library can be found in
`packspell-bin` in the same repository.
*/

#![warn(missing_docs)]
/// Alphabets, bit packing and the compressed dictionary.
pub mod compress;
/// Limits and defaults.
pub mod constants;
/// Dictionary trait, tri-state membership and editable dictionaries.
pub mod dictionary;
/// Word sources dictionaries are built from.
pub mod loader;
/// Edit distance.
pub mod metrics;
/// The spell-check engine.
pub mod speller;
/// Word segmentation and case handling.
pub mod tokenizer;
/// Word normalization.
pub mod transform;

pub use crate::dictionary::{Dictionary, EditableDictionary, Membership};
pub use crate::loader::{FileLoader, WordSource};
pub use crate::speller::{EngineConfig, SpellCheckEngine, Speller};
