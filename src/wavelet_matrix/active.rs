//! Pruned traversals driven by an external bitmask tree.
//!
//! A caller maintains a perfect binary tree of mask words mirroring the
//! implicit wavelet tree, stored as a flat array with the root at index 1
//! and the children of `p` at `2p` and `2p + 1`. The array therefore needs
//! `1 << (width + 1)` entries. [`WaveletMatrix::mark`] and
//! [`WaveletMatrix::unmark`] maintain masks along root-to-leaf paths;
//! the traversals below are [`WaveletMatrix::all_values_in_range`] variants
//! that skip subtrees whose masks prove them irrelevant.
//!
//! Two mask disciplines exist and cannot share an array:
//!
//! * a *path* tree (`b_wt`), a union of caller-chosen masks along marked
//!   paths, consulted read-only;
//! * an *accumulating* tree (`d_wt`), which records the mask bits already
//!   answered at each leaf and keeps every inner entry the intersection of
//!   its children, so repeated queries return only what is new.

use crate::wavelet_matrix::node::Node;
use crate::wavelet_matrix::WaveletMatrix;

use std::ops::{BitAnd, BitOr, BitOrAssign, Not, Range};

//-----------------------------------------------------------------------------

/// An unsigned machine word used as a bitmask in the mask trees.
pub trait MaskWord:
    Copy + Default + Eq + BitAnd<Output = Self> + BitOr<Output = Self> + BitOrAssign + Not<Output = Self>
{
}

impl<W> MaskWord for W where
    W: Copy
        + Default
        + Eq
        + BitAnd<Output = W>
        + BitOr<Output = W>
        + BitOrAssign
        + Not<Output = W>
{
}

//-----------------------------------------------------------------------------

impl WaveletMatrix {
    /// Sets the bits `b_c` in every entry of `b_wt` on the root-to-leaf
    /// path of the value `c`.
    ///
    /// # Panics
    ///
    /// Panics if `b_wt` has fewer than `1 << (self.width() + 1)` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![1u64, 0, 1, 2, 3]);
    /// let mut masks = vec![0u8; 1 << (wm.width() + 1)];
    /// wm.mark(3, &mut masks, 0b01);
    ///
    /// assert_eq!(wm.all_active_p_values_in_range(0, 4, &masks, 0b01), vec![3]);
    /// assert!(wm.all_active_p_values_in_range(0, 4, &masks, 0b10).is_empty());
    /// ```
    pub fn mark<W: MaskWord>(&self, c: u64, b_wt: &mut [W], b_c: W) {
        let mut pos = 1;
        for level in 0..self.width() {
            b_wt[pos] |= b_c;
            pos = if self.bit_of(c, level) { 2 * pos + 1 } else { 2 * pos };
        }
        b_wt[pos] |= b_c;
    }

    /// Clears every entry of `b_wt` on the root-to-leaf path of the value
    /// `c`, the leaf entry included.
    ///
    /// # Panics
    ///
    /// Panics if `b_wt` has fewer than `1 << (self.width() + 1)` entries.
    pub fn unmark<W: MaskWord>(&self, c: u64, b_wt: &mut [W]) {
        let mut pos = 1;
        for level in 0..self.width() {
            b_wt[pos] = W::default();
            pos = if self.bit_of(c, level) { 2 * pos + 1 } else { 2 * pos };
        }
        b_wt[pos] = W::default();
    }

    /// Returns the distinct values in positions `lb..=rb` whose leaves are
    /// active, in increasing order.
    ///
    /// A subtree is skipped when `b_wt[pos] & d` is zero at its entry of
    /// the path mask tree. Behavior is undefined if `rb >= self.len()`.
    ///
    /// # Panics
    ///
    /// Panics if `b_wt` has fewer than `1 << (self.width() + 1)` entries.
    pub fn all_active_p_values_in_range<W: MaskWord>(
        &self,
        lb: usize,
        rb: usize,
        b_wt: &[W],
        d: W,
    ) -> Vec<u64> {
        let mut values = Vec::new();
        if self.is_empty() || lb > rb {
            return values;
        }
        debug_assert!(rb < self.len());
        self.collect_active_p(&self.root(), lb..rb + 1, b_wt, d, 1, &mut values);
        values
    }

    fn collect_active_p<W: MaskWord>(
        &self,
        v: &Node,
        r: Range<usize>,
        b_wt: &[W],
        d: W,
        pos: usize,
        values: &mut Vec<u64>,
    ) {
        if b_wt[pos] & d == W::default() {
            return;
        }
        if r.is_empty() {
            return;
        }
        if self.is_leaf(v) {
            values.push(v.sym);
            return;
        }
        let ex = self.expand_with(v, r);
        self.collect_active_p(&ex.left, ex.left_range, b_wt, d, 2 * pos, values);
        self.collect_active_p(&ex.right, ex.right_range, b_wt, d, 2 * pos + 1, values);
    }

    /// Returns the distinct values in positions `lb..=rb` for which `d`
    /// still adds mask bits, together with those new bits, and records the
    /// bits in `d_wt`.
    ///
    /// A subtree is skipped when `(d_wt[pos] | d) == d_wt[pos]`, that is,
    /// when `d` adds nothing below it. At a reported leaf the contribution
    /// is `d & !d_wt[pos]` and the leaf entry absorbs it; on unwind every
    /// inner entry becomes the intersection of its children. Repeating a
    /// query with the same mask therefore returns nothing. Behavior is
    /// undefined if `rb >= self.len()`.
    ///
    /// # Panics
    ///
    /// Panics if `d_wt` has fewer than `1 << (self.width() + 1)` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![0u64, 1]);
    /// let mut seen = vec![0u8; 1 << (wm.width() + 1)];
    ///
    /// let fresh = wm.all_active_s_values_in_range(0, 1, &mut seen, 0b01);
    /// assert_eq!(fresh, vec![(0, 0b01), (1, 0b01)]);
    /// assert!(wm.all_active_s_values_in_range(0, 1, &mut seen, 0b01).is_empty());
    /// ```
    pub fn all_active_s_values_in_range<W: MaskWord>(
        &self,
        lb: usize,
        rb: usize,
        d_wt: &mut [W],
        d: W,
    ) -> Vec<(u64, W)> {
        let mut values = Vec::new();
        if self.is_empty() || lb > rb {
            return values;
        }
        debug_assert!(rb < self.len());
        self.collect_active_s(&self.root(), lb..rb + 1, d_wt, d, 1, &mut values);
        values
    }

    fn collect_active_s<W: MaskWord>(
        &self,
        v: &Node,
        r: Range<usize>,
        d_wt: &mut [W],
        d: W,
        pos: usize,
        values: &mut Vec<(u64, W)>,
    ) {
        let seen = d_wt[pos];
        if seen | d == seen {
            return;
        }
        if r.is_empty() {
            return;
        }
        if self.is_leaf(v) {
            let fresh = d & !seen;
            d_wt[pos] = seen | fresh;
            values.push((v.sym, fresh));
            return;
        }
        let ex = self.expand_with(v, r);
        self.collect_active_s(&ex.left, ex.left_range, d_wt, d, 2 * pos, values);
        self.collect_active_s(&ex.right, ex.right_range, d_wt, d, 2 * pos + 1, values);
        d_wt[pos] = d_wt[2 * pos] & d_wt[2 * pos + 1];
    }
}

//-----------------------------------------------------------------------------
