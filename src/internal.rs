// Utility functions for tests.

use crate::wavelet_matrix::WaveletMatrix;

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

//-----------------------------------------------------------------------------

// Returns a vector of `len` random `width`-bit integers.
pub fn random_vector(len: usize, width: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
    (0..len).map(|_| rng.gen::<u64>() & mask).collect()
}

// Returns `n` random closed subranges of `0..len`. `len` must be positive.
pub fn random_ranges(n: usize, len: usize, seed: u64) -> Vec<(usize, usize)> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let i = rng.gen_range(0..len);
            let j = rng.gen_range(i..len);
            (i, j)
        })
        .collect()
}

//-----------------------------------------------------------------------------

// Checks access, rank, inverse_select, and select against the source vector.
pub fn check_point_queries(wm: &WaveletMatrix, truth: &[u64]) {
    assert_eq!(wm.len(), truth.len(), "wrong length");
    assert_eq!(wm.is_empty(), truth.is_empty(), "wrong emptiness");

    let mut counts: HashMap<u64, usize> = HashMap::new();
    for (i, &value) in truth.iter().enumerate() {
        assert_eq!(wm.access(i), value, "access({})", i);
        let seen = counts.entry(value).or_insert(0);
        assert_eq!(wm.rank(i, value), *seen, "rank({}, {})", i, value);
        assert_eq!(wm.inverse_select(i), (*seen, value), "inverse_select({})", i);
        assert_eq!(
            wm.select(*seen + 1, value),
            Some(i),
            "select({}, {})",
            *seen + 1,
            value
        );
        *seen += 1;
    }

    for (&value, &count) in counts.iter() {
        assert_eq!(wm.rank(truth.len(), value), count, "total rank({})", value);
        assert_eq!(wm.select(count + 1, value), None, "select past the end for {}", value);
    }
    assert_eq!(wm.sigma(), counts.len(), "wrong alphabet size");
    assert!(wm.iter().eq(truth.iter().cloned()), "wrong iterator output");
}

// Checks the level structure invariants: per-level zero counts and the
// cumulative rank offsets.
pub fn check_levels(wm: &WaveletMatrix, truth: &[u64]) {
    let len = truth.len();
    let width = wm.width();

    let mut items: Vec<u64> = truth.to_vec();
    let mut rank_so_far = 0;
    for level in 0..width {
        let mask = 1u64 << (width - 1 - level);
        let ones = items.iter().filter(|&&value| value & mask != 0).count();
        assert_eq!(wm.level_zeros()[level], len - ones, "zeros at level {}", level);
        assert_eq!(wm.level_ranks()[level], rank_so_far, "rank offset at level {}", level);
        rank_so_far += ones;

        let mut reordered: Vec<u64> = items.iter().copied().filter(|value| value & mask == 0).collect();
        reordered.extend(items.iter().copied().filter(|value| value & mask != 0));
        items = reordered;
    }
}

//-----------------------------------------------------------------------------

// Reference implementation of range_search_2d.
pub fn naive_search_2d(truth: &[u64], lb: usize, rb: usize, vlb: u64, vrb: u64) -> Vec<(usize, u64)> {
    let mut result: Vec<(usize, u64)> = truth
        .iter()
        .enumerate()
        .filter(|(i, &value)| lb <= *i && *i <= rb && vlb <= value && value <= vrb)
        .map(|(i, &value)| (i, value))
        .collect();
    result.sort_by_key(|&(i, value)| (value, i));
    result
}

// Reference implementation of range_next_value.
pub fn naive_next_value(truth: &[u64], x: u64, i: usize, j: usize) -> Option<u64> {
    truth[i..=j].iter().copied().filter(|&value| value >= x).min()
}

// Reference implementation of range_next_value_pos.
pub fn naive_next_value_pos(truth: &[u64], x: u64, i: usize, j: usize) -> Option<(u64, usize)> {
    let value = naive_next_value(truth, x, i, j)?;
    let pos = (i..=j).find(|&p| truth[p] == value)?;
    Some((value, pos))
}

// Reference implementation of rel_min_obj_maj.
pub fn naive_rel_min(truth: &[u64], vlb: u64, vrb: u64, lb: usize) -> usize {
    (lb..truth.len())
        .find(|&p| vlb <= truth[p] && truth[p] <= vrb)
        .unwrap_or(truth.len() + 1)
}

// Reference implementation of all_values_in_range.
pub fn naive_all_values(truth: &[u64], lb: usize, rb: usize) -> Vec<u64> {
    let mut values: Vec<u64> = truth[lb..=rb].to_vec();
    values.sort_unstable();
    values.dedup();
    values
}
