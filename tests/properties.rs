use proptest::prelude::*;
use tiny_rope::*;

/// Elements plus the leaf sizes used to cut them into a rope
fn fragmented_rope() -> impl Strategy<Value = (Vec<u8>, Vec<usize>)> {
    (
        prop::collection::vec(0u8..4, 0..200),
        prop::collection::vec(1usize..12, 1..8),
    )
}

fn build(items: &[u8], sizes: &[usize]) -> Rope<u8> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for &size in sizes.iter().cycle() {
        if start >= items.len() {
            break;
        }
        let end = (start + size).min(items.len());
        pieces.push(Rope::from(&items[start..end]));
        start = end;
    }
    // Fold left so the shape is as lopsided as possible
    pieces.into_iter().fold(Rope::empty(), Rope::node)
}

fn naive_index_of(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| &hay[i..i + needle.len()] == needle)
}

fn naive_last_index_of(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len())
        .rev()
        .find(|&i| &hay[i..i + needle.len()] == needle)
}

fn naive_common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn naive_common_suffix(a: &[u8], b: &[u8]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

fn satisfies_balance(rope: &Rope<u8>) -> bool {
    rope.is_leaf()
        || (rope.depth() < MAX_DEPTH && rope.len() as u64 >= fib(rope.depth() as usize + 2))
}

proptest! {
    #[test]
    fn split_then_concat_restores_content(
        (items, sizes) in fragmented_rope(),
        cut in 0usize..=200,
    ) {
        let rope = build(&items, &sizes);
        let index = cut.min(rope.len());
        let (left, right) = rope.split_at(index).unwrap();
        prop_assert_eq!(left.len(), index);
        prop_assert_eq!(left.concat(&right), rope);
    }

    #[test]
    fn balanced_satisfies_invariant(
        (items, sizes) in fragmented_rope(),
        leaf_bytes in 1usize..16,
    ) {
        let ctx = RopeContext::new(RopeConfig {
            max_leaf_bytes: leaf_bytes,
            ..RopeConfig::default()
        });
        let rope = build(&items, &sizes);
        let balanced = ctx.balanced(&rope);
        prop_assert!(satisfies_balance(&balanced));
        prop_assert_eq!(&balanced, &rope);

        let again = ctx.balanced(&balanced);
        prop_assert!(Rope::ptr_eq(&again, &balanced));
    }

    #[test]
    fn equal_content_hashes_equal(
        items in prop::collection::vec(any::<u8>(), 0..600),
        a in prop::collection::vec(1usize..40, 1..6),
        b in prop::collection::vec(1usize..40, 1..6),
    ) {
        let x = build(&items, &a);
        let y = build(&items, &b);
        prop_assert_eq!(&x, &y);
        prop_assert_eq!(x.structural_hash(), y.structural_hash());
    }

    #[test]
    fn search_matches_naive_scan(
        (items, sizes) in fragmented_rope(),
        needle in prop::collection::vec(0u8..4, 1..5),
        needle_sizes in prop::collection::vec(1usize..3, 1..3),
    ) {
        let rope = build(&items, &sizes);
        let needle_rope = build(&needle, &needle_sizes);
        prop_assert_eq!(rope.index_of(&needle_rope), naive_index_of(&items, &needle));
        prop_assert_eq!(rope.last_index_of(&needle_rope), naive_last_index_of(&items, &needle));
    }

    #[test]
    fn contiguous_round_trip((items, sizes) in fragmented_rope()) {
        let rope = build(&items, &sizes);
        let rebuilt = Rope::from_slice(&rope.to_contiguous());
        prop_assert_eq!(rebuilt.to_vec(), items);
    }

    #[test]
    fn edits_match_vec_model(
        (items, sizes) in fragmented_rope(),
        start in 0usize..200,
        len in 0usize..20,
        value in any::<u8>(),
    ) {
        let rope = build(&items, &sizes);
        let start = start.min(items.len());
        let len = len.min(items.len() - start);

        let mut expected = items.clone();
        expected.drain(start..start + len);
        prop_assert_eq!(rope.remove_range(start, len).unwrap().to_vec(), expected);

        let mut expected = items.clone();
        expected.insert(start, value);
        prop_assert_eq!(rope.insert(start, value).unwrap().to_vec(), expected);
    }

    #[test]
    fn prefix_and_suffix_match_naive_zip(
        head in prop::collection::vec(0u8..3, 0..40),
        (left, left_sizes) in fragmented_rope(),
        (right, right_sizes) in fragmented_rope(),
        tail in prop::collection::vec(0u8..3, 0..40),
        head_sizes in prop::collection::vec(1usize..12, 1..8),
    ) {
        let a: Vec<u8> = head.iter().chain(&left).chain(&tail).copied().collect();
        let b: Vec<u8> = head.iter().chain(&right).chain(&tail).copied().collect();
        let x = build(&a, &left_sizes);
        let y = build(&b, &right_sizes);
        let z = build(&a, &head_sizes);

        prop_assert_eq!(x.common_prefix_length(&y), naive_common_prefix(&a, &b));
        prop_assert_eq!(x.common_suffix_length(&y), naive_common_suffix(&a, &b));
        prop_assert_eq!(y.common_prefix_length(&x), naive_common_prefix(&b, &a));
        prop_assert_eq!(x.common_prefix_length(&z), a.len());
        prop_assert_eq!(x.common_suffix_length(&z), a.len());
    }
}
