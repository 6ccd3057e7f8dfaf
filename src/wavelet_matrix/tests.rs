use super::*;

use crate::error::Error;
use crate::internal;

use std::collections::HashMap;

use sucds::Serializable;

//-----------------------------------------------------------------------------

fn serialize_round_trip(wm: &WaveletMatrix) {
    let mut buffer: Vec<u8> = Vec::new();
    let written = wm.serialize_into(&mut buffer).unwrap();
    assert_eq!(written, buffer.len(), "wrong reported size");
    assert_eq!(written, wm.size_in_bytes(), "wrong size_in_bytes");
    let loaded = WaveletMatrix::deserialize_from(&buffer[..]).unwrap();
    assert_eq!(&loaded, wm, "loaded structure differs");
}

//-----------------------------------------------------------------------------

#[test]
fn empty_wm() {
    let wm = WaveletMatrix::from(Vec::<u64>::new());
    assert_eq!(wm.len(), 0);
    assert!(wm.is_empty());
    assert_eq!(wm.width(), 0);
    assert_eq!(wm.sigma(), 0);

    assert_eq!(wm.rank(0, 0), 0);
    assert_eq!(wm.rank(0, 5), 0);
    assert_eq!(wm.select(1, 0), None);
    assert_eq!(wm.select_next(0, 0, 0), (0, 0));
    assert!(wm.iter().next().is_none());

    assert_eq!(wm.range_search_2d(0, 0, 0, 10, true), (0, Vec::new()));
    assert_eq!(wm.count_range_search_2d(0, 0, 0, 10), 0);
    assert_eq!(wm.range_next_value(1, 0, 0), 0);
    assert_eq!(wm.rel_min_obj_maj(0, 5, 0), 1);
    assert!(wm.all_values_in_range(0, 0).is_empty());

    serialize_round_trip(&wm);
}

#[test]
fn empty_prefix_ignores_width() {
    let wm = WaveletMatrix::from_prefix(&[1, 2, 3], 0, Some(7)).unwrap();
    assert!(wm.is_empty());
    assert_eq!(wm.width(), 0);
}

macro_rules! test_wm_from {
    ($name:ident, $t:ident) => {
        #[test]
        fn $name() {
            let width = 6;
            let truth = internal::random_vector(289, width, 0xd5a1);

            let source: Vec<$t> = truth.iter().map(|x| *x as $t).collect();
            let wm = WaveletMatrix::from(source);
            assert_eq!(wm.width(), truth.iter().map(|x| 64 - x.leading_zeros()).max().unwrap() as usize);
            internal::check_point_queries(&wm, &truth);
        }
    };
}

test_wm_from!(wm_from_u8, u8);
test_wm_from!(wm_from_u16, u16);
test_wm_from!(wm_from_u32, u32);
test_wm_from!(wm_from_u64, u64);
test_wm_from!(wm_from_usize, usize);

#[test]
fn from_prefix_takes_prefix() {
    let source: Vec<u64> = vec![5, 1, 7, 3, 2, 6, 4, 0];
    let wm = WaveletMatrix::from_prefix(&source, 4, None).unwrap();
    assert_eq!(wm.len(), 4);
    assert_eq!(wm.width(), 3);
    internal::check_point_queries(&wm, &source[..4]);
}

#[test]
fn from_prefix_explicit_width() {
    let source: Vec<u64> = vec![5, 1, 7, 3];
    let wm = WaveletMatrix::from_prefix(&source, 4, Some(5)).unwrap();
    assert_eq!(wm.width(), 5);
    internal::check_point_queries(&wm, &source);
    internal::check_levels(&wm, &source);
}

#[test]
fn construction_errors() {
    let source: Vec<u64> = vec![5, 1, 7, 3];
    assert!(matches!(
        WaveletMatrix::from_prefix(&source, 5, None),
        Err(Error::InvalidInput { requested: 5, available: 4 })
    ));
    assert!(matches!(
        WaveletMatrix::from_prefix(&source, 4, Some(0)),
        Err(Error::InvalidWidth(0))
    ));
    assert!(matches!(
        WaveletMatrix::from_prefix(&source, 4, Some(65)),
        Err(Error::InvalidWidth(65))
    ));
    assert!(matches!(
        WaveletMatrix::from_prefix(&source, 4, Some(2)),
        Err(Error::Overflow { value: 7, width: 2 })
    ));
}

//-----------------------------------------------------------------------------

#[test]
fn level_structure() {
    let source: Vec<u64> = vec![5, 1, 7, 3, 2, 6, 4, 0];
    let wm = WaveletMatrix::from(source.clone());
    assert_eq!(wm.level_zeros(), [4, 4, 4]);
    assert_eq!(wm.level_ranks(), [0, 4, 8]);
    internal::check_levels(&wm, &source);

    let source = internal::random_vector(313, 5, 0xb0b);
    let wm = WaveletMatrix::from(source.clone());
    internal::check_levels(&wm, &source);
}

#[test]
fn point_queries() {
    let source: Vec<u64> = vec![5, 1, 7, 3, 2, 6, 4, 0];
    let wm = WaveletMatrix::from(source.clone());
    assert_eq!(wm.sigma(), 8);
    internal::check_point_queries(&wm, &source);

    assert_eq!(wm.rank(8, 0), 1);
    assert_eq!(wm.rank(8, 5), 1);
    assert_eq!(wm.rank(4, 7), 1);
    assert_eq!(wm.select(1, 3), Some(3));

    // Out of the alphabet.
    assert_eq!(wm.rank(8, 8), 0);
    assert_eq!(wm.select(1, 8), None);
}

#[test]
fn all_equal_values() {
    let source: Vec<u64> = vec![0, 0, 0, 0];
    let wm = WaveletMatrix::from_prefix(&source, 4, Some(1)).unwrap();
    assert_eq!(wm.width(), 1);
    assert_eq!(wm.sigma(), 1);
    assert_eq!(wm.level_zeros(), [4]);
    assert_eq!(wm.level_ranks(), [0]);
    internal::check_point_queries(&wm, &source);

    assert_eq!(wm.rank(4, 0), 4);
    assert_eq!(wm.select(3, 0), Some(2));
    let (count, points) = wm.range_search_2d(0, 3, 0, 0, true);
    assert_eq!(count, 4);
    assert_eq!(points, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
}

#[test]
fn permutation() {
    let source: Vec<u64> = vec![7, 3, 5, 1, 6, 0, 4, 2];
    let wm = WaveletMatrix::from(source.clone());
    assert_eq!(wm.sigma(), 8);
    for (i, &value) in source.iter().enumerate() {
        assert_eq!(wm.select(1, value), Some(i));
        assert_eq!(wm.inverse_select(i), (0, value));
    }
}

#[test]
fn point_queries_random() {
    for (len, width, seed) in [(288, 1, 0x11), (250, 3, 0x22), (300, 6, 0x33)] {
        let truth = internal::random_vector(len, width, seed);
        let wm = WaveletMatrix::from(truth.clone());
        internal::check_point_queries(&wm, &truth);
        internal::check_levels(&wm, &truth);
    }
}

#[test]
fn missing_values() {
    // Width 9 over 244 items leaves most values unused.
    let truth = internal::random_vector(244, 9, 0x44);
    let wm = WaveletMatrix::from_prefix(&truth, truth.len(), Some(9)).unwrap();
    internal::check_point_queries(&wm, &truth);

    let missing = (0..512u64).find(|value| !truth.contains(value)).unwrap();
    assert_eq!(wm.rank(truth.len(), missing), 0);
    assert_eq!(wm.select(1, missing), None);
}

#[test]
fn full_width_values() {
    let source: Vec<u64> = vec![u64::MAX, 0, u64::MAX];
    let wm = WaveletMatrix::from(source.clone());
    assert_eq!(wm.width(), 64);
    assert_eq!(wm.sigma(), 2);
    internal::check_point_queries(&wm, &source);

    assert_eq!(wm.range_minimum_query(0, 2), 0);
    assert_eq!(wm.range_next_value(1, 0, 2), u64::MAX);
    assert_eq!(wm.range_search_2d(0, 2, u64::MAX, u64::MAX, true).0, 2);
    assert_eq!(wm.count_range_search_2d(0, 2, 0, u64::MAX), 3);
    assert_eq!(wm.rel_min_obj_maj(0, 0, 0), 1);
    assert_eq!(wm.all_values_in_range(0, 2), vec![0, u64::MAX]);
}

#[test]
fn select_next_walks_occurrences() {
    let truth = internal::random_vector(200, 3, 0x55);
    let wm = WaveletMatrix::from(truth.clone());

    let mut positions: HashMap<u64, Vec<usize>> = HashMap::new();
    for (i, &value) in truth.iter().enumerate() {
        positions.entry(value).or_default().push(i);
    }

    for (&value, occurrences) in positions.iter() {
        let total = occurrences.len();
        assert_eq!(wm.rank(truth.len(), value), total);
        for index in 1..=truth.len() {
            let before = truth[..index].iter().filter(|&&x| x == value).count();
            let expected = if before + 1 > total {
                (0, 0)
            } else {
                (occurrences[before], before)
            };
            assert_eq!(
                wm.select_next(index, value, total),
                expected,
                "select_next({}, {}, {})",
                index,
                value,
                total
            );
        }
    }
}

//-----------------------------------------------------------------------------

#[test]
fn serialize_wm() {
    serialize_round_trip(&WaveletMatrix::from(Vec::<u64>::new()));
    serialize_round_trip(&WaveletMatrix::from(vec![5u64, 1, 7, 3, 2, 6, 4, 0]));
    serialize_round_trip(&WaveletMatrix::from(internal::random_vector(313, 7, 0x66)));
}

#[test]
fn serialized_queries_match() {
    let truth = internal::random_vector(157, 4, 0x77);
    let wm = WaveletMatrix::from(truth.clone());
    let mut buffer: Vec<u8> = Vec::new();
    wm.serialize_into(&mut buffer).unwrap();
    let loaded = WaveletMatrix::deserialize_from(&buffer[..]).unwrap();
    internal::check_point_queries(&loaded, &truth);
    assert_eq!(
        loaded.range_search_2d(10, 100, 2, 9, true),
        wm.range_search_2d(10, 100, 2, 9, true)
    );
}

#[test]
fn deserialize_rejects_inconsistent_lengths() {
    let wm = WaveletMatrix::from(vec![5u64, 1, 7, 3]);
    let mut buffer: Vec<u8> = Vec::new();
    wm.serialize_into(&mut buffer).unwrap();
    // Corrupt the item count.
    buffer[0] = 0xFF;
    assert!(WaveletMatrix::deserialize_from(&buffer[..]).is_err());
}

//-----------------------------------------------------------------------------

#[test]
fn range_search_2d_exact() {
    let source: Vec<u64> = vec![2, 0, 3, 1, 2, 0, 3, 1];
    let wm = WaveletMatrix::from(source.clone());

    let (count, points) = wm.range_search_2d(0, 7, 1, 2, true);
    assert_eq!(count, 4);
    assert_eq!(points, vec![(3, 1), (7, 1), (0, 2), (4, 2)]);

    // Value bounds above the alphabet are clipped.
    let (count, points) = wm.range_search_2d(0, 7, 0, 100, true);
    assert_eq!(count, 8);
    assert_eq!(points.len(), 8);

    // Inverted value interval.
    assert_eq!(wm.range_search_2d(0, 7, 3, 1, true), (0, Vec::new()));
}

#[test]
fn range_search_2d_random() {
    let truth = internal::random_vector(230, 5, 0x88);
    let wm = WaveletMatrix::from(truth.clone());
    for (lb, rb) in internal::random_ranges(25, truth.len(), 0x99) {
        for (vlb, vrb) in [(0, 7), (3, 12), (8, 8), (20, 40), (5, 2)] {
            let expected = internal::naive_search_2d(&truth, lb, rb, vlb, vrb);
            let (count, points) = wm.range_search_2d(lb, rb, vlb, vrb, true);
            assert_eq!(count, expected.len(), "count for [{}, {}] x [{}, {}]", lb, rb, vlb, vrb);
            assert_eq!(points, expected, "points for [{}, {}] x [{}, {}]", lb, rb, vlb, vrb);

            let (count, points) = wm.range_search_2d(lb, rb, vlb, vrb, false);
            assert_eq!(count, expected.len());
            assert!(points.is_empty());

            assert_eq!(
                wm.count_range_search_2d(lb, rb, vlb, vrb),
                expected.len(),
                "count_range_search_2d for [{}, {}] x [{}, {}]",
                lb,
                rb,
                vlb,
                vrb
            );
        }
    }
}

#[test]
fn count_matches_report_at_clipped_top() {
    let truth = internal::random_vector(120, 4, 0xaa);
    let wm = WaveletMatrix::from(truth.clone());
    // vrb at and above 2^width, vlb inside: the whole-subtree shortcut must
    // still respect vlb.
    for vlb in 0..18u64 {
        let expected = internal::naive_search_2d(&truth, 0, truth.len() - 1, vlb, 100).len();
        assert_eq!(wm.count_range_search_2d(0, truth.len() - 1, vlb, 100), expected);
    }
}

#[test]
fn range_minimum_query_exact() {
    let wm = WaveletMatrix::from(vec![5u64, 1, 7, 3, 2, 6, 4, 0]);
    assert_eq!(wm.range_minimum_query(2, 5), 2);
    assert_eq!(wm.range_minimum_query(0, 7), 0);
    assert_eq!(wm.range_minimum_query(0, 0), 5);
}

#[test]
fn range_minimum_query_random() {
    let truth = internal::random_vector(240, 6, 0xbb);
    let wm = WaveletMatrix::from(truth.clone());
    for (i, j) in internal::random_ranges(50, truth.len(), 0xcc) {
        let expected = truth[i..=j].iter().copied().min().unwrap();
        assert_eq!(wm.range_minimum_query(i, j), expected, "rmq({}, {})", i, j);
    }
}

#[test]
fn range_next_value_exact() {
    let wm = WaveletMatrix::from(vec![5u64, 1, 7, 3, 2, 6, 4, 0]);
    assert_eq!(wm.range_next_value(4, 0, 7), 4);
    assert_eq!(wm.range_next_value(8, 0, 7), 0);
    // A zero-free range keeps the zero sentinel unambiguous for x = 0.
    assert_eq!(wm.range_next_value(0, 0, 6), 1);

    let wm = WaveletMatrix::from(vec![3u64, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5]);
    assert_eq!(wm.range_next_value(5, 0, 10), 5);
    assert_eq!(wm.range_next_value_pos(5, 0, 10), (5, 4));
    assert_eq!(wm.range_next_value_pos(6, 0, 10), (6, 7));
    assert_eq!(wm.range_next_value_pos(16, 0, 10), (u64::MAX, usize::MAX));
}

#[test]
fn range_next_value_random() {
    let truth = internal::random_vector(210, 5, 0xdd);
    let wm = WaveletMatrix::from(truth.clone());
    for (i, j) in internal::random_ranges(30, truth.len(), 0xee) {
        for x in 1..34u64 {
            let expected = internal::naive_next_value(&truth, x, i, j);
            assert_eq!(
                wm.range_next_value(x, i, j),
                expected.unwrap_or(0),
                "range_next_value({}, {}, {})",
                x,
                i,
                j
            );
            let expected_pos = match internal::naive_next_value_pos(&truth, x, i, j) {
                Some(pair) => pair,
                None => (0, j + 1),
            };
            assert_eq!(
                wm.range_next_value_pos(x, i, j),
                expected_pos,
                "range_next_value_pos({}, {}, {})",
                x,
                i,
                j
            );
        }
    }
}

#[test]
fn rel_min_obj_maj_exact() {
    let wm = WaveletMatrix::from(vec![3u64, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5]);
    assert_eq!(wm.rel_min_obj_maj(2, 4, 2), 2);
    assert_eq!(wm.rel_min_obj_maj(6, 9, 0), 5);
    assert_eq!(wm.rel_min_obj_maj(5, 5, 5), 8);
    assert_eq!(wm.rel_min_obj_maj(10, 20, 0), 12);
    assert_eq!(wm.rel_min_obj_maj(4, 2, 0), 12);
    assert_eq!(wm.rel_min_obj_maj(0, 9, 11), 12);
}

#[test]
fn rel_min_obj_maj_random() {
    let truth = internal::random_vector(260, 5, 0xff);
    let wm = WaveletMatrix::from(truth.clone());
    for lb in [0, 1, 17, 130, 255, 259] {
        for (vlb, vrb) in [(0, 31), (4, 11), (9, 9), (0, 2), (28, 40), (33, 50)] {
            let expected = internal::naive_rel_min(&truth, vlb, vrb, lb);
            assert_eq!(
                wm.rel_min_obj_maj(vlb, vrb, lb),
                expected,
                "rel_min_obj_maj({}, {}, {})",
                vlb,
                vrb,
                lb
            );
        }
    }
}

#[test]
fn all_values_in_range_exact() {
    let wm = WaveletMatrix::from(vec![2u64, 0, 3, 1, 2, 0, 3, 1]);
    assert_eq!(wm.all_values_in_range(0, 7), vec![0, 1, 2, 3]);
    assert_eq!(wm.all_values_in_range(0, 1), vec![0, 2]);
    assert_eq!(wm.all_values_in_range(2, 2), vec![3]);
    assert_eq!(wm.all_values_in_range_bounded(0, 7, 2), vec![0, 1]);
    assert_eq!(wm.all_values_in_range_bounded(0, 7, 0), Vec::<u64>::new());
}

#[test]
fn all_values_in_range_random() {
    let truth = internal::random_vector(190, 4, 0x101);
    let wm = WaveletMatrix::from(truth.clone());
    for (lb, rb) in internal::random_ranges(40, truth.len(), 0x102) {
        let expected = internal::naive_all_values(&truth, lb, rb);
        assert_eq!(wm.all_values_in_range(lb, rb), expected);
        let bound = expected.len() / 2;
        assert_eq!(wm.all_values_in_range_bounded(lb, rb, bound), expected[..bound].to_vec());
    }
}

//-----------------------------------------------------------------------------

#[test]
fn node_traversal_lists_leaves() {
    let truth = internal::random_vector(140, 4, 0x103);
    let wm = WaveletMatrix::from(truth.clone());

    // Collect (value, count) pairs by walking the tree by hand.
    fn collect(wm: &WaveletMatrix, v: &node::Node, r: std::ops::Range<usize>, out: &mut Vec<(u64, usize)>) {
        if r.is_empty() {
            return;
        }
        if wm.is_leaf(v) {
            out.push((v.sym(), r.len()));
            return;
        }
        let (left, right) = wm.expand(v);
        let (left_range, right_range) = wm.expand_range(v, r);
        collect(wm, &left, left_range, out);
        collect(wm, &right, right_range, out);
    }

    let root = wm.root();
    assert_eq!(root.size(), truth.len());
    assert_eq!(root.level(), 0);
    assert!(!root.is_empty());

    let mut leaves = Vec::new();
    collect(&wm, &root, 0..wm.len(), &mut leaves);

    let mut expected: Vec<(u64, usize)> = Vec::new();
    let mut sorted = truth.clone();
    sorted.sort_unstable();
    for value in sorted {
        match expected.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => expected.push((value, 1)),
        }
    }
    assert_eq!(leaves, expected);
}

//-----------------------------------------------------------------------------

#[test]
fn mark_and_active_paths() {
    let wm = WaveletMatrix::from(vec![5u64, 1, 7, 3, 2, 6, 4, 0]);
    let mut masks = vec![0u8; 1 << (wm.width() + 1)];
    wm.mark(5, &mut masks, 0b01);
    wm.mark(3, &mut masks, 0b10);
    wm.mark(6, &mut masks, 0b11);

    assert_eq!(wm.all_active_p_values_in_range(0, 7, &masks, 0b01), vec![5, 6]);
    assert_eq!(wm.all_active_p_values_in_range(0, 7, &masks, 0b10), vec![3, 6]);
    assert_eq!(wm.all_active_p_values_in_range(0, 7, &masks, 0b11), vec![3, 5, 6]);
    // Only the marked values present in the position range are reported.
    assert_eq!(wm.all_active_p_values_in_range(0, 3, &masks, 0b11), vec![3, 5]);
}

#[test]
fn unmark_clears_shared_path_entries() {
    let wm = WaveletMatrix::from(vec![5u64, 1, 7, 3, 2, 6, 4, 0]);
    let mut masks = vec![0u8; 1 << (wm.width() + 1)];
    wm.mark(5, &mut masks, 0b01);
    wm.mark(3, &mut masks, 0b10);

    // Unmarking clears whole entries, root included, so sibling paths lose
    // their marks as well.
    wm.unmark(3, &mut masks);
    assert!(wm.all_active_p_values_in_range(0, 7, &masks, 0b11).is_empty());

    wm.mark(5, &mut masks, 0b01);
    assert_eq!(wm.all_active_p_values_in_range(0, 7, &masks, 0b01), vec![5]);
}

#[test]
fn accumulating_masks_are_idempotent() {
    let wm = WaveletMatrix::from(vec![2u64, 0, 3, 1, 2, 0, 3, 1]);
    let mut seen = vec![0u8; 1 << (wm.width() + 1)];

    let fresh = wm.all_active_s_values_in_range(0, 7, &mut seen, 0b01);
    assert_eq!(fresh, vec![(0, 0b01), (1, 0b01), (2, 0b01), (3, 0b01)]);
    assert!(wm.all_active_s_values_in_range(0, 7, &mut seen, 0b01).is_empty());

    // A wider mask only reports the new bits.
    let fresh = wm.all_active_s_values_in_range(0, 7, &mut seen, 0b11);
    assert_eq!(fresh, vec![(0, 0b10), (1, 0b10), (2, 0b10), (3, 0b10)]);

    // A subrange already answered contributes nothing.
    assert!(wm.all_active_s_values_in_range(0, 0, &mut seen, 0b11).is_empty());

    // New bits reach only the values in the subrange.
    let fresh = wm.all_active_s_values_in_range(1, 1, &mut seen, 0b100);
    assert_eq!(fresh, vec![(0, 0b100)]);
    assert!(wm.all_active_s_values_in_range(1, 1, &mut seen, 0b100).is_empty());
    let fresh = wm.all_active_s_values_in_range(2, 2, &mut seen, 0b100);
    assert_eq!(fresh, vec![(3, 0b100)]);
}

//-----------------------------------------------------------------------------

#[test]
#[ignore]
fn large_wm() {
    let width = 11;
    let truth = internal::random_vector(213951, width, 0x104);
    let wm = WaveletMatrix::from(truth.clone());
    internal::check_point_queries(&wm, &truth);
    serialize_round_trip(&wm);

    for (lb, rb) in internal::random_ranges(10, truth.len(), 0x105) {
        let expected = internal::naive_search_2d(&truth, lb, rb, 100, 900);
        assert_eq!(wm.range_search_2d(lb, rb, 100, 900, true).1, expected);
        assert_eq!(wm.count_range_search_2d(lb, rb, 100, 900), expected.len());
    }
}

//-----------------------------------------------------------------------------
