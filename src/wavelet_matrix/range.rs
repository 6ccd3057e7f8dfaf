//! Range queries over the position range / value range duality.
//!
//! Every query here descends the implicit tree. At a node, the current
//! position range splits into its images in the two children, and the value
//! constraints decide which children are worth visiting: the subtree below a
//! node at level `k` with symbol prefix `p` holds exactly the values in
//! `[p << (w - k), (p + 1) << (w - k))`. Positions are recovered on the way
//! back up with select queries against the offsets recorded on the way down.

use crate::wavelet_matrix::node::Node;
use crate::wavelet_matrix::WaveletMatrix;

use std::cmp;
use std::ops::Range;

//-----------------------------------------------------------------------------

impl WaveletMatrix {
    /// Reports the items in positions `lb..=rb` whose values are in
    /// `vlb..=vrb`.
    ///
    /// Returns the number of such items and, when `report` is `true`, a
    /// vector of `(position, value)` pairs ordered by value and then by
    /// position. With `report == false` the vector stays empty and only the
    /// count is computed. Returns an empty result when `vlb > vrb` or the
    /// structure is empty. Behavior is undefined if `rb >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![2u64, 0, 3, 1, 2, 0, 3, 1]);
    /// let (count, points) = wm.range_search_2d(0, 7, 1, 2, true);
    /// assert_eq!(count, 4);
    /// assert_eq!(points, vec![(3, 1), (7, 1), (0, 2), (4, 2)]);
    ///
    /// let (count, points) = wm.range_search_2d(2, 5, 2, 3, false);
    /// assert_eq!(count, 2);
    /// assert!(points.is_empty());
    /// ```
    pub fn range_search_2d(
        &self,
        lb: usize,
        rb: usize,
        vlb: u64,
        vrb: u64,
        report: bool,
    ) -> (usize, Vec<(usize, u64)>) {
        let vrb = self.clip_value(vrb);
        if vlb > vrb || !self.fits_width(vlb) || self.is_empty() || lb > rb {
            return (0, Vec::new());
        }
        debug_assert!(rb < self.len());

        let mut offsets = vec![0; self.width() + 1];
        let mut ranks = vec![0; self.width() + 1];
        let mut count = 0;
        let mut points = Vec::new();
        self.search_2d(
            &self.root(),
            lb..rb + 1,
            vlb,
            vrb,
            0,
            &mut offsets,
            &mut ranks,
            report,
            &mut count,
            &mut points,
        );
        (count, points)
    }

    #[allow(clippy::too_many_arguments)]
    fn search_2d(
        &self,
        v: &Node,
        r: Range<usize>,
        vlb: u64,
        vrb: u64,
        ilb: u64,
        offsets: &mut [usize],
        ranks: &mut [usize],
        report: bool,
        count: &mut usize,
        points: &mut Vec<(usize, u64)>,
    ) {
        if r.is_empty() {
            return;
        }
        offsets[v.level] = v.offset + r.start;

        if self.is_leaf(v) {
            if report {
                for j in 1..=r.len() {
                    let mut i = j;
                    let mut c = v.sym;
                    for level in (0..self.width()).rev() {
                        let offset = offsets[level];
                        let rank_offset = ranks[level];
                        if c & 1 != 0 {
                            i = self.select_one(rank_offset + i) - offset + 1;
                        } else {
                            i = self.select_zero(offset - rank_offset + i) - offset + 1;
                        }
                        c >>= 1;
                    }
                    points.push((offsets[0] + i - 1, v.sym));
                }
            }
            *count += r.len();
            return;
        }
        ranks[v.level] = self.tree_rank(offsets[v.level]);

        let mid = ilb + self.half_span(v);
        let ex = self.expand_with(v, r);
        if !ex.left_range.is_empty() && vlb < mid {
            self.search_2d(
                &ex.left,
                ex.left_range,
                vlb,
                cmp::min(vrb, mid - 1),
                ilb,
                offsets,
                ranks,
                report,
                count,
                points,
            );
        }
        if !ex.right_range.is_empty() && vrb >= mid {
            self.search_2d(
                &ex.right,
                ex.right_range,
                cmp::max(vlb, mid),
                vrb,
                mid,
                offsets,
                ranks,
                report,
                count,
                points,
            );
        }
    }

    /// Counts the items in positions `lb..=rb` whose values are in
    /// `vlb..=vrb`, without reporting them.
    ///
    /// Unlike [`Self::range_search_2d`], a subtree whose whole value
    /// interval lies inside `vlb..=vrb` contributes its size without being
    /// descended. Behavior is undefined if `rb >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![2u64, 0, 3, 1, 2, 0, 3, 1]);
    /// assert_eq!(wm.count_range_search_2d(0, 7, 1, 2), 4);
    /// assert_eq!(wm.count_range_search_2d(2, 5, 2, 3), 2);
    /// assert_eq!(wm.count_range_search_2d(0, 7, 4, 9), 0);
    /// ```
    pub fn count_range_search_2d(&self, lb: usize, rb: usize, vlb: u64, vrb: u64) -> usize {
        let vrb = self.clip_value(vrb);
        if vlb > vrb || !self.fits_width(vlb) || self.is_empty() || lb > rb {
            return 0;
        }
        debug_assert!(rb < self.len());

        let mut count = 0;
        self.count_2d(&self.root(), lb..rb + 1, vlb, vrb, 0, &mut count);
        count
    }

    fn count_2d(
        &self,
        v: &Node,
        r: Range<usize>,
        vlb: u64,
        vrb: u64,
        ilb: u64,
        count: &mut usize,
    ) {
        if r.is_empty() {
            return;
        }
        if self.is_leaf(v) {
            *count += r.len();
            return;
        }

        let half = self.half_span(v);
        let mid = ilb + half;
        if vlb <= ilb && mid + (half - 1) <= vrb {
            // The whole subtree lies in the value interval.
            *count += r.len();
            return;
        }

        let ex = self.expand_with(v, r);
        if !ex.left_range.is_empty() && vlb < mid {
            self.count_2d(&ex.left, ex.left_range, vlb, cmp::min(vrb, mid - 1), ilb, count);
        }
        if !ex.right_range.is_empty() && vrb >= mid {
            self.count_2d(&ex.right, ex.right_range, cmp::max(vlb, mid), vrb, mid, count);
        }
    }

    /// Returns the smallest value `>= x` occurring in positions `i..=j`, or
    /// 0 if there is none.
    ///
    /// Also returns 0 when `x` does not fit in [`Self::width`] bits.
    /// Behavior is undefined if `i > j` or `j >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![3u64, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5]);
    /// assert_eq!(wm.range_next_value(5, 0, 10), 5);
    /// assert_eq!(wm.range_next_value(7, 0, 10), 9);
    /// assert_eq!(wm.range_next_value(10, 0, 10), 0);
    /// ```
    pub fn range_next_value(&self, x: u64, i: usize, j: usize) -> u64 {
        if !self.fits_width(x) || self.is_empty() {
            return 0;
        }
        debug_assert!(i <= j && j < self.len());
        self.next_value(x, &self.root(), i..j + 1)
    }

    // Descends along the bits of `x`: a set bit forces the right child, an
    // unset bit prefers the left child and falls back to the minimum of the
    // right child once the left subtree is exhausted.
    fn next_value(&self, x: u64, v: &Node, r: Range<usize>) -> u64 {
        if r.is_empty() {
            return 0;
        }
        if self.is_leaf(v) {
            return v.sym;
        }
        let ex = self.expand_with(v, r);
        if self.bit_of(x, v.level) {
            self.next_value(x, &ex.right, ex.right_range)
        } else {
            let y = self.next_value(x, &ex.left, ex.left_range);
            if y != 0 {
                y
            } else {
                self.min_value(&ex.right, ex.right_range)
            }
        }
    }

    // The smallest value in the subtree range: always the leftmost child
    // with a non-empty range.
    fn min_value(&self, v: &Node, r: Range<usize>) -> u64 {
        if r.is_empty() {
            return 0;
        }
        if self.is_leaf(v) {
            return v.sym;
        }
        let ex = self.expand_with(v, r);
        if ex.left_range.is_empty() {
            self.min_value(&ex.right, ex.right_range)
        } else {
            self.min_value(&ex.left, ex.left_range)
        }
    }

    /// Returns the smallest value `>= x` occurring in positions `i..=j` and
    /// the leftmost position in `i..=j` holding it.
    ///
    /// Returns `(u64::MAX, usize::MAX)` when `x` does not fit in
    /// [`Self::width`] bits, and `(0, j + 1)` when no value qualifies.
    /// Behavior is undefined if `i > j` or `j >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![3u64, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5]);
    /// assert_eq!(wm.range_next_value_pos(5, 0, 10), (5, 4));
    /// assert_eq!(wm.range_next_value_pos(6, 0, 10), (6, 7));
    /// assert_eq!(wm.range_next_value_pos(10, 0, 10), (0, 11));
    /// ```
    pub fn range_next_value_pos(&self, x: u64, i: usize, j: usize) -> (u64, usize) {
        if !self.fits_width(x) {
            return (u64::MAX, usize::MAX);
        }
        if self.is_empty() {
            return (0, j + 1);
        }
        debug_assert!(i <= j && j < self.len());
        let (value, pos) = self.next_value_pos(x, &self.root(), i..j + 1);
        (value, pos - 1)
    }

    // Like `next_value`, but also tracks the leftmost position, as a
    // 1-indexed node-local offset lifted with select queries on unwind.
    fn next_value_pos(&self, x: u64, v: &Node, r: Range<usize>) -> (u64, usize) {
        if r.is_empty() {
            return (0, r.end + 1);
        }
        if self.is_leaf(v) {
            return (v.sym, r.start + 1);
        }
        let r_end = r.end;
        let ex = self.expand_with(v, r);
        if self.bit_of(x, v.level) {
            let (value, pos) = self.next_value_pos(x, &ex.right, ex.right_range);
            if value != 0 {
                (value, self.select_one(ex.rank_b + pos) - v.offset + 1)
            } else {
                (0, r_end + 1)
            }
        } else {
            let (value, pos) = self.next_value_pos(x, &ex.left, ex.left_range);
            if value != 0 {
                (
                    value,
                    self.select_zero((v.offset - ex.rank_b) + pos) - v.offset + 1,
                )
            } else {
                let (value, pos) = self.min_value_pos(&ex.right, ex.right_range);
                if value != 0 {
                    (value, self.select_one(ex.rank_b + pos) - v.offset + 1)
                } else {
                    (0, r_end + 1)
                }
            }
        }
    }

    fn min_value_pos(&self, v: &Node, r: Range<usize>) -> (u64, usize) {
        if r.is_empty() {
            return (0, r.end + 1);
        }
        if self.is_leaf(v) {
            return (v.sym, r.start + 1);
        }
        let ex = self.expand_with(v, r);
        if ex.left_range.is_empty() {
            let (value, pos) = self.min_value_pos(&ex.right, ex.right_range);
            (value, self.select_one(ex.rank_b + pos) - v.offset + 1)
        } else {
            let (value, pos) = self.min_value_pos(&ex.left, ex.left_range);
            (
                value,
                self.select_zero((v.offset - ex.rank_b) + pos) - v.offset + 1,
            )
        }
    }

    /// Returns the smallest value in positions `i..=j`.
    ///
    /// Behavior is undefined if `i > j` or `j >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![5u64, 1, 7, 3, 2, 6, 4, 0]);
    /// assert_eq!(wm.range_minimum_query(2, 5), 2);
    /// assert_eq!(wm.range_minimum_query(0, 7), 0);
    /// assert_eq!(wm.range_minimum_query(5, 5), 6);
    /// ```
    pub fn range_minimum_query(&self, i: usize, j: usize) -> u64 {
        debug_assert!(i <= j && j < self.len());
        let mut v = self.root();
        let mut r = i..j + 1;
        while !self.is_leaf(&v) {
            let ex = self.expand_with(&v, r);
            if ex.left_range.is_empty() {
                v = ex.right;
                r = ex.right_range;
            } else {
                v = ex.left;
                r = ex.left_range;
            }
        }
        v.sym
    }

    /// Returns the smallest position `p >= lb` such that the value at `p`
    /// is in `vlb..=vrb`, or `self.len() + 1` if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![3u64, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5]);
    /// assert_eq!(wm.rel_min_obj_maj(2, 4, 2), 2);
    /// assert_eq!(wm.rel_min_obj_maj(6, 9, 0), 5);
    /// assert_eq!(wm.rel_min_obj_maj(10, 20, 0), 12);
    /// ```
    pub fn rel_min_obj_maj(&self, vlb: u64, vrb: u64, lb: usize) -> usize {
        let vrb = self.clip_value(vrb);
        if vlb > vrb || !self.fits_width(vlb) || lb >= self.len() {
            return self.len() + 1;
        }
        self.rel_min(&self.root(), vlb, vrb, lb..self.len(), 0)
    }

    // Returns the node-local position of the first item of the range whose
    // value is in `vlb..=vrb`, or `len + 1` if there is none. Child results
    // are lifted into the parent with select queries against the rank at
    // the node start.
    fn rel_min(&self, v: &Node, vlb: u64, vrb: u64, r: Range<usize>, ilb: u64) -> usize {
        let none = self.len() + 1;
        if r.is_empty() {
            return none;
        }
        if self.is_leaf(v) {
            return r.start;
        }

        let half = self.half_span(v);
        let mid = ilb + half;
        if vlb <= ilb && mid + (half - 1) <= vrb {
            // The whole subtree qualifies; its first item wins.
            return r.start;
        }

        let ex = self.expand_with(v, r);
        let mut ans1 = none;
        let mut child1 = none;
        if !ex.left_range.is_empty() && vlb < mid {
            child1 = self.rel_min(&ex.left, vlb, cmp::min(vrb, mid - 1), ex.left_range, ilb);
            if child1 != none {
                ans1 = self.select_zero((v.offset - ex.rank_b) + child1 + 1) - v.offset;
            }
        }

        let mut ans2 = none;
        if !ex.right_range.is_empty() && vrb >= mid {
            if ans1 != none {
                // Only a right candidate mapping before `ans1` can win.
                let cap = match (ans1 - child1).checked_sub(1) {
                    Some(cap) => cap,
                    None => return ans1,
                };
                let end = cmp::min(ex.right_range.end, ex.right_range.start + cap + 1);
                let child2 = self.rel_min(
                    &ex.right,
                    cmp::max(vlb, mid),
                    vrb,
                    ex.right_range.start..end,
                    mid,
                );
                if child2 == none {
                    return ans1;
                }
                ans2 = self.select_one(ex.rank_b + child2 + 1) - v.offset;
            } else {
                let child2 = self.rel_min(&ex.right, cmp::max(vlb, mid), vrb, ex.right_range, mid);
                if child2 != none {
                    ans2 = self.select_one(ex.rank_b + child2 + 1) - v.offset;
                }
            }
        }

        cmp::min(ans1, ans2)
    }

    /// Returns the distinct values occurring in positions `lb..=rb`, in
    /// increasing order.
    ///
    /// Behavior is undefined if `rb >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![2u64, 0, 3, 1, 2, 0, 3, 1]);
    /// assert_eq!(wm.all_values_in_range(0, 7), vec![0, 1, 2, 3]);
    /// assert_eq!(wm.all_values_in_range(0, 1), vec![0, 2]);
    /// ```
    pub fn all_values_in_range(&self, lb: usize, rb: usize) -> Vec<u64> {
        let mut values = Vec::new();
        if self.is_empty() || lb > rb {
            return values;
        }
        debug_assert!(rb < self.len());
        self.collect_values(&self.root(), lb..rb + 1, usize::MAX, &mut values);
        values
    }

    /// Like [`Self::all_values_in_range`], but stops after collecting
    /// `bound` values.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavemat::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::from(vec![2u64, 0, 3, 1, 2, 0, 3, 1]);
    /// assert_eq!(wm.all_values_in_range_bounded(0, 7, 2), vec![0, 1]);
    /// ```
    pub fn all_values_in_range_bounded(&self, lb: usize, rb: usize, bound: usize) -> Vec<u64> {
        let mut values = Vec::new();
        if self.is_empty() || lb > rb {
            return values;
        }
        debug_assert!(rb < self.len());
        self.collect_values(&self.root(), lb..rb + 1, bound, &mut values);
        values
    }

    fn collect_values(&self, v: &Node, r: Range<usize>, bound: usize, values: &mut Vec<u64>) {
        if r.is_empty() || values.len() >= bound {
            return;
        }
        if self.is_leaf(v) {
            values.push(v.sym);
            return;
        }
        let ex = self.expand_with(v, r);
        self.collect_values(&ex.left, ex.left_range, bound, values);
        self.collect_values(&ex.right, ex.right_range, bound, values);
    }

    // Half of the number of values the subtree below `v` spans. Only valid
    // for inner nodes, where the shift is at most 63.
    #[inline]
    pub(crate) fn half_span(&self, v: &Node) -> u64 {
        1u64 << (self.width() - v.level - 1)
    }

    // Value upper bounds are clipped to one past the largest representable
    // value, so inclusive comparisons stay meaningful at the top.
    #[inline]
    pub(crate) fn clip_value(&self, vrb: u64) -> u64 {
        if self.width() < 64 {
            cmp::min(vrb, 1u64 << self.width())
        } else {
            vrb
        }
    }
}

//-----------------------------------------------------------------------------
