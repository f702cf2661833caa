//! Fixed-universe set of byte values.

use std::fmt;

/// Set over all 256 byte values, stored as four 64-bit words.
///
/// Word `i` holds the quadrant `64*i .. 64*i + 63`. Membership, insertion and
/// removal are a single shift-and-mask; set operations are word-wise.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteSet {
    words: [u64; 4],
}

impl ByteSet {
    /// The empty set.
    pub const fn new() -> Self {
        Self { words: [0; 4] }
    }

    /// The set containing every byte.
    pub const fn full() -> Self {
        Self {
            words: [u64::MAX; 4],
        }
    }

    #[inline]
    const fn slot(byte: u8) -> (usize, u64) {
        ((byte >> 6) as usize, 1u64 << (byte & 63))
    }

    /// Remove every member.
    #[inline]
    pub fn clear(&mut self) {
        self.words = [0; 4];
    }

    /// Add `byte`.
    #[inline]
    pub fn add(&mut self, byte: u8) {
        let (word, mask) = Self::slot(byte);
        self.words[word] |= mask;
    }

    /// Remove `byte`.
    #[inline]
    pub fn remove(&mut self, byte: u8) {
        let (word, mask) = Self::slot(byte);
        self.words[word] &= !mask;
    }

    /// Whether `byte` is a member.
    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        let (word, mask) = Self::slot(byte);
        self.words[word] & mask != 0
    }

    /// Union: add every member of `other`.
    #[inline]
    pub fn add_all(&mut self, other: &ByteSet) {
        for (a, b) in self.words.iter_mut().zip(other.words) {
            *a |= b;
        }
    }

    /// Difference: remove every member of `other`.
    #[inline]
    pub fn remove_all(&mut self, other: &ByteSet) {
        for (a, b) in self.words.iter_mut().zip(other.words) {
            *a &= !b;
        }
    }

    /// Intersection: keep only members also in `other`.
    #[inline]
    pub fn restrict(&mut self, other: &ByteSet) {
        for (a, b) in self.words.iter_mut().zip(other.words) {
            *a &= b;
        }
    }

    /// Number of members.
    pub fn size(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether the set has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words == [0; 4]
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(move |&b| self.contains(b))
    }
}

impl FromIterator<u8> for ByteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<u8> for ByteSet {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        for byte in iter {
            self.add(byte);
        }
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
