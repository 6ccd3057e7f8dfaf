//! An immutable integer sequence supporting rank/select and range queries.
//!
//! The wavelet matrix was first described in:
//!
//! > Claude, Navarro, Ordóñez: The wavelet matrix: An efficient wavelet tree for large alphabets.
//! > Information Systems, 2015.
//! > DOI: [10.1016/j.is.2014.06.002](https://doi.org/10.1016/j.is.2014.06.002)
//!
//! All `width` levels of the implicit tree are stored back to back in a
//! single bit vector of `len * width` bits. Level `k` holds bit
//! `width - 1 - k` of every symbol, in the order produced by stably
//! partitioning the sequence by the bits of levels `0..k`. A per-level zero
//! count and a per-level cumulative rank replace child pointers: the two
//! children of any node can be located with a constant number of rank
//! queries. Access and rank queries walk down from level `0`; select queries
//! walk back up from the last level.

use crate::error::{Error, Result};

use std::io::{Read, Write};
use std::iter::FusedIterator;
use std::mem::size_of;

use anyhow::anyhow;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use sucds::bit_vectors::{Access, BitVector, NumBits, Rank, Rank9Sel, Select};
use sucds::Serializable;

pub mod active;
pub mod node;

mod range;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// An immutable integer sequence supporting rank/select and range queries.
///
/// Each item is a [`u64`] value of at most `width` bits. The sequence is
/// stored as a single concatenated bit vector with rank and select support,
/// plus two arrays of `width` counts. Duplicate values are fine; values are
/// taken as raw integers without any alphabet remapping, so the structure is
/// most economical when the used values are dense in `0..(1 << width)`.
///
/// A `WaveletMatrix` can be built from a [`Vec`] of unsigned integers with
/// the [`From`] trait, or from a prefix of a slice with an explicit width
/// using [`WaveletMatrix::from_prefix`]. Construction is linear in
/// `len * width` and uses the input as working space.
///
/// # Examples
///
/// ```
/// use wavemat::wavelet_matrix::WaveletMatrix;
///
/// let source: Vec<u64> = vec![5, 1, 7, 3, 2, 6, 4, 0];
/// let wm = WaveletMatrix::from(source.clone());
///
/// assert_eq!(wm.len(), 8);
/// assert_eq!(wm.width(), 3);
/// assert_eq!(wm.sigma(), 8);
///
/// // Point queries.
/// for (i, &value) in source.iter().enumerate() {
///     assert_eq!(wm.access(i), value);
/// }
/// assert_eq!(wm.rank(8, 5), 1);
/// assert_eq!(wm.rank(4, 7), 1);
/// assert_eq!(wm.select(1, 3), Some(3));
/// assert_eq!(wm.inverse_select(2), (0, 7));
///
/// // Range queries.
/// assert_eq!(wm.range_minimum_query(2, 5), 2);
/// assert_eq!(wm.range_next_value(4, 0, 7), 4);
/// assert_eq!(wm.range_next_value(8, 0, 7), 0);
///
/// // Iteration.
/// assert!(wm.iter().eq(source.iter().cloned()));
/// ```
///
/// # Serialization
///
/// `WaveletMatrix` implements [`sucds::Serializable`]. The bit vector and
/// its rank/select supports serialize as one value, so a loaded structure is
/// never observed with stale support bindings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveletMatrix {
    len: usize,
    sigma: usize,
    width: usize,
    // All levels, concatenated. Level k occupies positions k*len..(k+1)*len.
    tree: Rank9Sel,
    // Number of unset bits in each level.
    level_zeros: Vec<usize>,
    // Rank of the tree at the start of each level.
    level_ranks: Vec<usize>,
}

//-----------------------------------------------------------------------------

// Number of bits needed to represent `value`; 1 for zero.
fn bit_len(value: u64) -> usize {
    if value == 0 {
        1
    } else {
        (u64::BITS - value.leading_zeros()) as usize
    }
}

impl WaveletMatrix {
    /// Builds a wavelet matrix from the first `len` items of `source`.
    ///
    /// When `width` is [`None`], the width is the number of bits needed for
    /// the largest item (at least 1). An explicit width must be in `1..=64`
    /// and large enough for every item in the prefix.
    ///
    /// With `len == 0` the result is an empty structure of width 0; every
    /// query on it returns an empty result.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidInput`] if `len > source.len()`.
    /// * [`Error::InvalidWidth`] if an explicit width is 0 or above 64.
    /// * [`Error::Overflow`] if an item needs more bits than an explicit
    ///   width provides.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let source: Vec<u64> = vec![5, 1, 7, 3, 2, 6, 4, 0];
    /// let wm = WaveletMatrix::from_prefix(&source, 4, Some(4)).unwrap();
    /// assert_eq!(wm.len(), 4);
    /// assert_eq!(wm.width(), 4);
    /// assert_eq!(wm.access(2), 7);
    ///
    /// assert!(WaveletMatrix::from_prefix(&source, 9, None).is_err());
    /// assert!(WaveletMatrix::from_prefix(&source, 8, Some(2)).is_err());
    /// ```
    pub fn from_prefix(source: &[u64], len: usize, width: Option<u32>) -> Result<Self> {
        if len > source.len() {
            return Err(Error::InvalidInput {
                requested: len,
                available: source.len(),
            });
        }
        if len == 0 {
            return Ok(Self::empty());
        }

        let items: Vec<u64> = source[..len].to_vec();
        let max_value = items.iter().copied().max().unwrap_or(0);
        let needed = bit_len(max_value);
        let width = match width {
            None => needed,
            Some(w) if w == 0 || w > 64 => return Err(Error::InvalidWidth(w)),
            Some(w) if (w as usize) < needed => {
                return Err(Error::Overflow {
                    value: max_value,
                    width: w,
                })
            }
            Some(w) => w as usize,
        };
        Ok(Self::build(items, width))
    }

    // An empty but fully queryable structure.
    fn empty() -> Self {
        WaveletMatrix {
            len: 0,
            sigma: 0,
            width: 0,
            tree: Rank9Sel::new(BitVector::new()).select1_hints().select0_hints(),
            level_zeros: Vec::new(),
            level_ranks: Vec::new(),
        }
    }

    // Stable MSB-first radix partition, one level at a time. `items` must be
    // non-empty and every item must fit in `width` bits.
    fn build(mut items: Vec<u64>, width: usize) -> Self {
        let len = items.len();
        let mut bits = BitVector::new();
        let mut level_zeros = Vec::with_capacity(width);
        let mut spill: Vec<u64> = Vec::with_capacity(len);

        for level in 0..width {
            let mask = 1u64 << (width - 1 - level);
            let mut zeros = 0;
            spill.clear();
            for i in 0..len {
                let value = items[i];
                if value & mask != 0 {
                    bits.push_bit(true);
                    spill.push(value);
                } else {
                    bits.push_bit(false);
                    items[zeros] = value;
                    zeros += 1;
                }
            }
            items[zeros..].copy_from_slice(&spill);
            level_zeros.push(zeros);
        }

        // The items are now sorted by their bit-reversed values, so equal
        // values are adjacent.
        items.dedup();
        let sigma = items.len();

        let tree = Rank9Sel::new(bits).select1_hints().select0_hints();
        let mut result = WaveletMatrix {
            len,
            sigma,
            width,
            tree,
            level_zeros,
            level_ranks: Vec::new(),
        };
        result.level_ranks = (0..width).map(|level| result.tree_rank(level * len)).collect();
        result
    }

    /// Returns the number of items in the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the width of an item in bits, which is also the number of
    /// levels in the structure.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of distinct values in the sequence.
    #[inline]
    pub fn sigma(&self) -> usize {
        self.sigma
    }

    #[cfg(test)]
    pub(crate) fn level_zeros(&self) -> &[usize] {
        &self.level_zeros
    }

    #[cfg(test)]
    pub(crate) fn level_ranks(&self) -> &[usize] {
        &self.level_ranks
    }
}

//-----------------------------------------------------------------------------

// Rank/select plumbing over the concatenated tree. All positions handed to
// these helpers are in bounds for a well-formed structure.
impl WaveletMatrix {
    // Number of set bits in the tree before `pos`.
    #[inline]
    fn tree_rank(&self, pos: usize) -> usize {
        self.tree.rank1(pos).expect("tree rank position out of bounds")
    }

    // The bit of the tree at `pos`.
    #[inline]
    fn tree_bit(&self, pos: usize) -> bool {
        self.tree.access(pos).expect("tree position out of bounds")
    }

    // Position of the `k`-th set bit in the tree, 1-indexed.
    #[inline]
    fn select_one(&self, k: usize) -> usize {
        self.tree.select1(k - 1).expect("not enough set bits in the tree")
    }

    // Position of the `k`-th unset bit in the tree, 1-indexed.
    #[inline]
    fn select_zero(&self, k: usize) -> usize {
        self.tree.select0(k - 1).expect("not enough unset bits in the tree")
    }

    // Returns `true` if `value` is representable in `width` bits.
    #[inline]
    fn fits_width(&self, value: u64) -> bool {
        self.width >= 64 || (value >> self.width) == 0
    }

    // Bit `width - 1 - level` of `value`: the bit level `level` partitions by.
    #[inline]
    fn bit_of(&self, value: u64, level: usize) -> bool {
        (value >> (self.width - 1 - level)) & 1 != 0
    }
}

//-----------------------------------------------------------------------------

impl WaveletMatrix {
    /// Returns the item at position `index`.
    ///
    /// Behavior is undefined if `index >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![5u64, 1, 7, 3, 2, 6, 4, 0]);
    /// assert_eq!(wm.access(0), 5);
    /// assert_eq!(wm.access(7), 0);
    /// ```
    pub fn access(&self, index: usize) -> u64 {
        debug_assert!(index < self.len);
        let mut pos = index;
        let mut value = 0;
        for level in 0..self.width {
            value <<= 1;
            let ones_before = self.tree_rank(pos) - self.level_ranks[level];
            if self.tree_bit(pos) {
                pos = (level + 1) * self.len + self.level_zeros[level] + ones_before;
                value |= 1;
            } else {
                let zeros_before = (pos - level * self.len) - ones_before;
                pos = (level + 1) * self.len + zeros_before;
            }
        }
        value
    }

    /// Returns the number of occurrences of `value` in positions
    /// `0..index`.
    ///
    /// Returns 0 if `value` does not fit in [`Self::width`] bits. Behavior
    /// is undefined if `index > self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![2u64, 5, 2, 5, 2]);
    /// assert_eq!(wm.rank(5, 2), 3);
    /// assert_eq!(wm.rank(3, 5), 1);
    /// assert_eq!(wm.rank(5, 100), 0);
    /// ```
    pub fn rank(&self, index: usize, value: u64) -> usize {
        debug_assert!(index <= self.len);
        if !self.fits_width(value) {
            return 0;
        }
        let mut b = 0;
        let mut i = index;
        for level in 0..self.width {
            if i == 0 {
                break;
            }
            let rank_b = self.tree_rank(b);
            let ones = self.tree_rank(b + i) - rank_b;
            let ones_before = rank_b - self.level_ranks[level];
            if self.bit_of(value, level) {
                i = ones;
                b = (level + 1) * self.len + self.level_zeros[level] + ones_before;
            } else {
                i -= ones;
                b = (level + 1) * self.len + (b - level * self.len - ones_before);
            }
        }
        i
    }

    /// Returns the pair `(self.rank(index, value), value)` for the item
    /// `value` at position `index`, with a single downward walk.
    ///
    /// Behavior is undefined if `index >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![2u64, 5, 2, 5, 2]);
    /// assert_eq!(wm.inverse_select(0), (0, 2));
    /// assert_eq!(wm.inverse_select(3), (1, 5));
    /// assert_eq!(wm.inverse_select(4), (2, 2));
    /// ```
    pub fn inverse_select(&self, index: usize) -> (usize, u64) {
        debug_assert!(index < self.len);
        let mut b = 0;
        let mut i = index;
        let mut value = 0;
        for level in 0..self.width {
            let rank_b = self.tree_rank(b);
            let ones = self.tree_rank(b + i) - rank_b;
            let ones_before = rank_b - self.level_ranks[level];
            value <<= 1;
            if self.tree_bit(b + i) {
                i = ones;
                b = (level + 1) * self.len + self.level_zeros[level] + ones_before;
                value |= 1;
            } else {
                i -= ones;
                b = (level + 1) * self.len + (b - level * self.len - ones_before);
            }
        }
        (i, value)
    }

    /// Returns the position of the `k`-th occurrence of `value`, with `k`
    /// starting from 1.
    ///
    /// Returns [`None`] if `k == 0`, if `value` does not fit in
    /// [`Self::width`] bits, or if `value` occurs fewer than `k` times.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![2u64, 5, 2, 5, 2]);
    /// assert_eq!(wm.select(1, 5), Some(1));
    /// assert_eq!(wm.select(3, 2), Some(4));
    /// assert_eq!(wm.select(3, 5), None);
    /// ```
    pub fn select(&self, k: usize, value: u64) -> Option<usize> {
        if k == 0 || !self.fits_width(value) || k > self.rank(self.len, value) {
            return None;
        }

        // Walk down along the bits of `value`, recording the start of the
        // node and the rank at that start for every level.
        let mut path_offset = vec![0; self.width + 1];
        let mut path_rank = vec![0; self.width + 1];
        let mut b = 0;
        for level in 0..self.width {
            let rank_b = self.tree_rank(b);
            let ones_before = rank_b - self.level_ranks[level];
            if self.bit_of(value, level) {
                b = (level + 1) * self.len + self.level_zeros[level] + ones_before;
            } else {
                b = (level + 1) * self.len + (b - level * self.len - ones_before);
            }
            path_offset[level + 1] = b;
            path_rank[level] = rank_b;
        }

        // Walk back up, selecting the `i`-th matching bit within each node.
        let mut i = k;
        for level in (0..self.width).rev() {
            let b = path_offset[level];
            let rank_b = path_rank[level];
            if self.bit_of(value, level) {
                i = self.select_one(rank_b + i) - b + 1;
            } else {
                i = self.select_zero(b - rank_b + i) - b + 1;
            }
        }
        Some(i - 1)
    }

    /// Returns the position of the first occurrence of `value` at or after
    /// position `index`, together with the number of occurrences before it.
    ///
    /// `occurrences` is the total number of occurrences of `value`, as
    /// returned by `self.rank(self.len(), value)`; the pair `(0, 0)` is
    /// returned when no further occurrence exists. The downward walk is
    /// skipped when `index == 0`, so callers should start from a position
    /// with at least one preceding occurrence of `value`. Behavior is
    /// undefined if `index > self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![2u64, 5, 2, 5, 2]);
    /// let occurrences = wm.rank(wm.len(), 2);
    /// assert_eq!(wm.select_next(1, 2, occurrences), (2, 1));
    /// assert_eq!(wm.select_next(3, 2, occurrences), (4, 2));
    /// assert_eq!(wm.select_next(5, 2, occurrences), (0, 0));
    /// ```
    pub fn select_next(&self, index: usize, value: u64, occurrences: usize) -> (usize, usize) {
        debug_assert!(index <= self.len);
        let mut path_offset = vec![0; self.width + 1];
        let mut path_rank = vec![0; self.width + 1];
        let mut b = 0;
        let mut r = index;
        if index != 0 {
            for level in 0..self.width {
                let rank_b = self.tree_rank(b);
                let ones = self.tree_rank(b + r) - rank_b;
                let ones_before = rank_b - self.level_ranks[level];
                if self.bit_of(value, level) {
                    r = ones;
                    b = (level + 1) * self.len + self.level_zeros[level] + ones_before;
                } else {
                    r -= ones;
                    b = (level + 1) * self.len + (b - level * self.len - ones_before);
                }
                path_offset[level + 1] = b;
                path_rank[level] = rank_b;
            }
        }

        let mut i = r + 1;
        if i > occurrences {
            return (0, 0);
        }
        for level in (0..self.width).rev() {
            let b = path_offset[level];
            let rank_b = path_rank[level];
            if self.bit_of(value, level) {
                i = self.select_one(rank_b + i) - b + 1;
            } else {
                i = self.select_zero(b - rank_b + i) - b + 1;
            }
        }
        (i - 1, r)
    }

    /// Returns an iterator over the original sequence.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            parent: self,
            index: 0,
        }
    }
}

//-----------------------------------------------------------------------------

impl Serializable for WaveletMatrix {
    fn serialize_into<W: Write>(&self, mut writer: W) -> anyhow::Result<usize> {
        let mut mem = 0;
        writer.write_u64::<LittleEndian>(self.len as u64)?;
        writer.write_u64::<LittleEndian>(self.sigma as u64)?;
        mem += 2 * size_of::<u64>();
        mem += self.tree.serialize_into(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.width as u32)?;
        mem += size_of::<u32>();
        for &zeros in &self.level_zeros {
            writer.write_u64::<LittleEndian>(zeros as u64)?;
        }
        for &rank in &self.level_ranks {
            writer.write_u64::<LittleEndian>(rank as u64)?;
        }
        mem += 2 * self.width * size_of::<u64>();
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> anyhow::Result<Self> {
        let len = reader.read_u64::<LittleEndian>()? as usize;
        let sigma = reader.read_u64::<LittleEndian>()? as usize;
        let tree = Rank9Sel::deserialize_from(&mut reader)?;
        let width = reader.read_u32::<LittleEndian>()? as usize;
        if tree.num_bits() != len * width {
            return Err(anyhow!(
                "tree length {} does not match {} items of width {}",
                tree.num_bits(),
                len,
                width
            ));
        }
        let mut level_zeros = Vec::with_capacity(width);
        for _ in 0..width {
            level_zeros.push(reader.read_u64::<LittleEndian>()? as usize);
        }
        let mut level_ranks = Vec::with_capacity(width);
        for _ in 0..width {
            level_ranks.push(reader.read_u64::<LittleEndian>()? as usize);
        }
        Ok(WaveletMatrix {
            len,
            sigma,
            width,
            tree,
            level_zeros,
            level_ranks,
        })
    }

    fn size_in_bytes(&self) -> usize {
        2 * size_of::<u64>()
            + self.tree.size_in_bytes()
            + size_of::<u32>()
            + 2 * self.width * size_of::<u64>()
    }
}

//-----------------------------------------------------------------------------

macro_rules! wavelet_matrix_from {
    ($t:ident) => {
        impl From<Vec<$t>> for WaveletMatrix {
            fn from(source: Vec<$t>) -> Self {
                let items: Vec<u64> = source.into_iter().map(|value| value as u64).collect();
                if items.is_empty() {
                    return Self::empty();
                }
                let max_value = items.iter().copied().max().unwrap_or(0);
                Self::build(items, bit_len(max_value))
            }
        }
    };
}

wavelet_matrix_from!(u8);
wavelet_matrix_from!(u16);
wavelet_matrix_from!(u32);
wavelet_matrix_from!(u64);
wavelet_matrix_from!(usize);

//-----------------------------------------------------------------------------

/// A read-only iterator over the original sequence of a [`WaveletMatrix`].
///
/// The type of `Item` is [`u64`].
///
/// # Examples
///
/// ```
/// use wavemat::wavelet_matrix::WaveletMatrix;
///
/// let source: Vec<u64> = vec![3, 1, 4, 1, 5];
/// let wm = WaveletMatrix::from(source.clone());
/// let decoded: Vec<u64> = wm.iter().collect();
/// assert_eq!(decoded, source);
/// ```
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    parent: &'a WaveletMatrix,
    index: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.parent.len() {
            None
        } else {
            let result = Some(self.parent.access(self.index));
            self.index += 1;
            result
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.parent.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

impl<'a> FusedIterator for Iter<'a> {}

//-----------------------------------------------------------------------------

/// [`WaveletMatrix`] transformed into an iterator over the original
/// sequence.
#[derive(Clone, Debug)]
pub struct IntoIter {
    parent: WaveletMatrix,
    index: usize,
}

impl Iterator for IntoIter {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.parent.len() {
            None
        } else {
            let result = Some(self.parent.access(self.index));
            self.index += 1;
            result
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.parent.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IntoIter {}

impl FusedIterator for IntoIter {}

impl IntoIterator for WaveletMatrix {
    type Item = u64;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            parent: self,
            index: 0,
        }
    }
}

//-----------------------------------------------------------------------------
