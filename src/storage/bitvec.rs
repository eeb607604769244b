//! Growable bitset over dense store ids.
//!
//! Bits beyond the current length read as unset. View algebra reads whole
//! words to find the ids one vector holds and the other lacks, 64 at a time.

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<u64>,
    ones: usize,
}

impl BitVector {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, bit: usize) -> bool {
        self.words
            .get(bit / WORD_BITS)
            .is_some_and(|w| w & (1u64 << (bit % WORD_BITS)) != 0)
    }

    /// Sets `bit`, growing as needed. Returns whether the bit changed.
    pub fn set(&mut self, bit: usize) -> bool {
        let w = bit / WORD_BITS;
        if w >= self.words.len() {
            self.words.resize(w + 1, 0);
        }
        let mask = 1u64 << (bit % WORD_BITS);
        let changed = self.words[w] & mask == 0;
        if changed {
            self.words[w] |= mask;
            self.ones += 1;
        }
        changed
    }

    /// Clears `bit`. Returns whether the bit changed.
    pub fn clear(&mut self, bit: usize) -> bool {
        let w = bit / WORD_BITS;
        let Some(word) = self.words.get_mut(w) else {
            return false;
        };
        let mask = 1u64 << (bit % WORD_BITS);
        let changed = *word & mask != 0;
        if changed {
            *word &= !mask;
            self.ones -= 1;
        }
        changed
    }

    pub fn clear_all(&mut self) {
        self.words.clear();
        self.ones = 0;
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    pub fn is_empty(&self) -> bool {
        self.ones == 0
    }

    /// Number of addressable words.
    #[inline]
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn word(&self, idx: usize) -> u64 {
        self.words.get(idx).copied().unwrap_or(0)
    }

    /// Drops every bit at or above `len`.
    pub fn truncate(&mut self, len: usize) {
        let keep = words_for(len);
        if keep < self.words.len() {
            let dropped: usize = self.words[keep..].iter().map(|w| w.count_ones() as usize).sum();
            self.words.truncate(keep);
            self.ones -= dropped;
        }
        let tail = len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.get_mut(len / WORD_BITS) {
                let mask = (1u64 << tail) - 1;
                let dropped = (*last & !mask).count_ones() as usize;
                *last &= mask;
                self.ones -= dropped;
            }
        }
    }

    /// Iterates set bits in ascending order.
    pub fn iter_ones(&self) -> Ones<'_> {
        Ones { words: &self.words, idx: 0, current: self.words.first().copied().unwrap_or(0) }
    }
}

#[inline]
pub(crate) fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

/// Calls `f` for every set bit of `word`, passing the absolute bit index.
#[inline]
pub(crate) fn for_each_bit(word_idx: usize, mut word: u64, mut f: impl FnMut(usize)) {
    while word != 0 {
        let tz = word.trailing_zeros() as usize;
        f(word_idx * WORD_BITS + tz);
        word &= word - 1;
    }
}

pub struct Ones<'a> {
    words: &'a [u64],
    idx: usize,
    current: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let tz = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.idx * WORD_BITS + tz);
            }
            self.idx += 1;
            self.current = *self.words.get(self.idx)?;
        }
    }
}
