//! Bit packing of alphabet indices.
//!
//! Symbols are written low-bit-first: symbol `i` starts at bit `i * bits`
//! of the output, and a symbol that does not fit in the rest of a byte
//! continues in the low bits of the next one.

/// Bits needed to store any index up to `last_used`.
#[inline(always)]
pub fn bits_per_symbol(last_used: u8) -> u32 {
    8 - last_used.leading_zeros()
}

/// Number of bytes a word of `symbols` symbols packs into.
#[inline(always)]
pub fn packed_len(symbols: usize, bits: u32) -> usize {
    (symbols * bits as usize + 7) / 8
}

/// A word expressed as alphabet indices, one per character.
///
/// Every index is non-zero; zero is reserved as the terminator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodedWord(Box<[u8]>);

impl EncodedWord {
    pub(crate) fn new(indices: Vec<u8>) -> EncodedWord {
        debug_assert!(indices.iter().all(|&i| i != 0));
        EncodedWord(indices.into_boxed_slice())
    }

    /// The alphabet indices, one per character.
    #[inline(always)]
    pub fn indices(&self) -> &[u8] {
        &self.0
    }

    /// Number of symbols.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no symbols.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Packs the indices using `bits` bits per symbol.
    ///
    /// `bits` must cover the largest index of the alphabet the word was
    /// encoded with, which is only stable once that alphabet is frozen.
    pub fn pack(&self, bits: u32) -> Box<[u8]> {
        pack(&self.0, bits)
    }
}

/// Packs `indices` at `bits` bits each, low bits first.
pub fn pack(indices: &[u8], bits: u32) -> Box<[u8]> {
    debug_assert!(bits <= 8);
    let mut out = vec![0u8; packed_len(indices.len(), bits)];

    if bits == 0 {
        return out.into_boxed_slice();
    }

    let mask = ((1u16 << bits) - 1) as u8;

    for (i, &index) in indices.iter().enumerate() {
        let index = index & mask;
        let bit = i * bits as usize;
        let byte = bit / 8;
        let offset = (bit % 8) as u32;

        out[byte] |= index << offset;

        if offset + bits > 8 {
            out[byte + 1] |= index >> (8 - offset);
        }
    }

    out.into_boxed_slice()
}

/// Reads back the indices stored in `packed`, stopping at the first zero
/// index or when fewer than `bits` bits remain.
pub fn unpack(packed: &[u8], bits: u32) -> Unpack<'_> {
    Unpack {
        packed,
        bits,
        position: 0,
    }
}

/// The index of the first symbol of a packed word.
#[inline(always)]
pub fn first_symbol(first_byte: u8, bits: u32) -> u8 {
    if bits == 0 {
        return 0;
    }
    first_byte & (((1u16 << bits) - 1) as u8)
}

/// Iterator over the indices of a packed record.
pub struct Unpack<'a> {
    packed: &'a [u8],
    bits: u32,
    position: usize,
}

impl<'a> Iterator for Unpack<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.bits == 0 {
            return None;
        }

        let bits = self.bits as usize;
        let bit = self.position * bits;

        if bit + bits > self.packed.len() * 8 {
            return None;
        }

        let byte = bit / 8;
        let offset = bit % 8;
        let mut value = (self.packed[byte] as u16) >> offset;

        if offset + bits > 8 {
            value |= (self.packed[byte + 1] as u16) << (8 - offset);
        }

        let index = (value & ((1u16 << bits) - 1)) as u8;
        if index == 0 {
            self.packed = &[];
            return None;
        }

        self.position += 1;
        Some(index)
    }
}
