//! Growable bitset over `u32` members.
//!
//! Used for row presence masks, query column sets, index postings, and the
//! exploration frontier. Equality ignores trailing zero words, so two sets
//! with the same members compare equal regardless of how far either grew.

use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const WORD_BITS: u32 = u64::BITS;

/// A set of small unsigned integers backed by `u64` words.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bitset {
    words: Vec<u64>,
}

#[inline]
fn split(member: u32) -> (usize, u64) {
    ((member / WORD_BITS) as usize, 1u64 << (member % WORD_BITS))
}

impl Bitset {
    /// Creates an empty bitset.
    #[must_use]
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Creates an empty bitset with room for members below `capacity`.
    #[must_use]
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(WORD_BITS) as usize],
        }
    }

    /// Adds `member`, returning true if it was not already present.
    pub fn set(&mut self, member: u32) -> bool {
        let (word, mask) = split(member);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let was_set = self.words[word] & mask != 0;
        self.words[word] |= mask;
        !was_set
    }

    /// Removes `member`, returning true if it was present.
    pub fn unset(&mut self, member: u32) -> bool {
        let (word, mask) = split(member);
        match self.words.get_mut(word) {
            Some(bits) if *bits & mask != 0 => {
                *bits &= !mask;
                true
            }
            _ => false,
        }
    }

    /// Returns true if `member` is present.
    #[must_use]
    pub fn is_set(&self, member: u32) -> bool {
        let (word, mask) = split(member);
        self.words.get(word).is_some_and(|bits| bits & mask != 0)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Removes and returns the smallest member.
    pub fn pop(&mut self) -> Option<u32> {
        for (idx, word) in self.words.iter_mut().enumerate() {
            if *word != 0 {
                let bit = word.trailing_zeros();
                *word &= *word - 1;
                return Some(idx as u32 * WORD_BITS + bit);
            }
        }
        None
    }

    /// Returns the smallest member without removing it.
    #[must_use]
    pub fn first(&self) -> Option<u32> {
        self.iter().next()
    }

    /// Returns members in ascending order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Returns members as a vector, ascending.
    #[must_use]
    pub fn elems(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Returns `self ∪ other`.
    #[must_use]
    pub fn union(&self, other: &Bitset) -> Bitset {
        let mut out = self.clone();
        out.union_with(other);
        out
    }

    /// Returns `self ∩ other`.
    #[must_use]
    pub fn intersect(&self, other: &Bitset) -> Bitset {
        let mut out = self.clone();
        out.intersect_with(other);
        out
    }

    /// Returns `self \ other`.
    #[must_use]
    pub fn difference(&self, other: &Bitset) -> Bitset {
        let mut out = self.clone();
        out.difference_with(other);
        out
    }

    /// Returns the members below `universe` that are not in `self`.
    #[must_use]
    pub fn complement(&self, universe: u32) -> Bitset {
        let mut out = Bitset::with_capacity(universe);
        for member in 0..universe {
            if !self.is_set(member) {
                out.set(member);
            }
        }
        out
    }

    /// Adds every member of `other`.
    pub fn union_with(&mut self, other: &Bitset) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine |= theirs;
        }
    }

    /// Keeps only members also in `other`.
    pub fn intersect_with(&mut self, other: &Bitset) {
        for (idx, mine) in self.words.iter_mut().enumerate() {
            *mine &= other.words.get(idx).copied().unwrap_or(0);
        }
    }

    /// Removes every member of `other`.
    pub fn difference_with(&mut self, other: &Bitset) {
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine &= !theirs;
        }
    }

    /// Returns true if every member of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Bitset) -> bool {
        self.words
            .iter()
            .enumerate()
            .all(|(idx, w)| w & !other.words.get(idx).copied().unwrap_or(0) == 0)
    }

    /// Returns true if `self` and `other` share no members.
    #[must_use]
    pub fn is_disjoint(&self, other: &Bitset) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .all(|(mine, theirs)| mine & theirs == 0)
    }

    fn significant(&self) -> &[u64] {
        let end = self
            .words
            .iter()
            .rposition(|w| *w != 0)
            .map_or(0, |idx| idx + 1);
        &self.words[..end]
    }
}

impl PartialEq for Bitset {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for Bitset {}

impl Hash for Bitset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<u32> for Bitset {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Bitset::new();
        set.extend(iter);
        set
    }
}

impl Extend<u32> for Bitset {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for member in iter {
            self.set(member);
        }
    }
}

impl<'a> IntoIterator for &'a Bitset {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over a [`Bitset`].
pub struct Iter<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros();
                self.current &= self.current - 1;
                return Some(self.index as u32 * WORD_BITS + bit);
            }
            self.index += 1;
            self.current = *self.words.get(self.index)?;
        }
    }
}
