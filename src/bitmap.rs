//! ## Bitmap representation
//! Stores one bit per possible IPv4 address, i.e. 2^32 bits in 2^26 `u64` words (512 MiB).
//!
//! Memory is constant regardless of cardinality and insertion is a single word update,
//! so this representation takes over once the exact set would grow too large.
//!
//! Bits are packed little-endian within words:
//! - words[0]      - keys 0..63, key `k` stored at bit `k % 64`
//! - words[1]      - keys 64..127
//! - ...
//!
//! The number of set bits is updated as bits flip from 0 to 1, so `count` is constant time.
//! `popcount` recomputes it from the words.

use std::mem::{size_of, size_of_val};

use crate::representation::RepresentationTrait;

/// Number of bits in the bitmap, one per IPv4 address
pub const BITMAP_BITS: usize = 1 << 32;
/// Number of `u64` words backing the bitmap
const WORDS: usize = BITMAP_BITS / 64;

/// Fixed-size bitmap over the whole IPv4 address space
#[derive(Clone)]
pub struct Bitmap {
    words: Box<[u64]>,
    /// Number of bits currently set
    len: usize,
}

impl Bitmap {
    /// Creates new empty `Bitmap`.
    ///
    /// The backing words are requested zeroed, so pages are only committed once touched.
    pub fn new() -> Self {
        Self {
            words: vec![0u64; WORDS].into_boxed_slice(),
            len: 0,
        }
    }

    /// Creates new `Bitmap` populated with given keys
    pub fn from_keys(keys: impl IntoIterator<Item = u32>) -> Self {
        let mut bitmap = Self::new();
        for key in keys {
            bitmap.insert(key);
        }
        bitmap
    }

    /// Set the bit of `key`, returning whether it was not set before
    #[inline]
    pub fn insert(&mut self, key: u32) -> bool {
        let (idx, mask) = Self::locate(key);
        // SAFETY: `idx` is at most `u32::MAX >> 6`, and `words` holds exactly `WORDS` elements.
        let word = unsafe { self.words.get_unchecked_mut(idx) };
        let fresh = *word & mask == 0;
        *word |= mask;
        self.len += usize::from(fresh);
        fresh
    }

    #[inline]
    pub fn contains(&self, key: u32) -> bool {
        let (idx, mask) = Self::locate(key);
        self.words[idx] & mask != 0
    }

    /// Return number of set bits
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return memory size of `Bitmap`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(&*self.words)
    }

    /// Recompute number of set bits from the backing words
    pub fn popcount(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over keys with their bit set in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words
            .iter()
            .enumerate()
            .filter(|(_, &word)| word != 0)
            .flat_map(|(idx, &word)| SetBits {
                base: (idx as u32) << 6,
                word,
            })
    }

    /// Return word index and bit mask of `key`
    #[inline]
    fn locate(key: u32) -> (usize, u64) {
        let bit = key as usize;
        (bit >> 6, 1u64 << (bit & 63))
    }
}

impl Default for Bitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl RepresentationTrait for Bitmap {
    #[inline]
    fn insert(&mut self, key: u32) -> bool {
        Bitmap::insert(self, key)
    }

    #[inline]
    fn contains(&self, key: u32) -> bool {
        Bitmap::contains(self, key)
    }

    #[inline]
    fn count(&self) -> usize {
        self.len
    }

    #[inline]
    fn size_of(&self) -> usize {
        Bitmap::size_of(self)
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, rhs: &Self) -> bool {
        self.len == rhs.len && self.words == rhs.words
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bitmap {{ count: {} }}", self.len)
    }
}

/// Iterator over set bits of a single word
struct SetBits {
    base: u32,
    word: u64,
}

impl Iterator for SetBits {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.word == 0 {
            return None;
        }
        let bit = self.word.trailing_zeros();
        // clear lowest set bit
        self.word &= self.word - 1;
        Some(self.base + bit)
    }
}
