#![cfg(feature = "sequence")]
//! Integration tests for Sequence<T>.
//!
//! Tests cover:
//! - Restartable traversal and single-use sources
//! - Laziness of combinators and deferred failures
//! - Bounding, batching and stopping combinators
//! - Mutation through sequences backed by a store

use rstest::rstest;
use sequins::error::SequenceError;
use sequins::sequence::Sequence;
use sequins::source::{Cursor, MutableSource, Source, Store};
use std::cell::Cell;
use std::rc::Rc;

// =============================================================================
// Restartability
// =============================================================================

#[rstest]
fn sequence_two_traversals_are_equal() {
    let sequence = Sequence::range(0, 20)
        .map(|n| n * 3)
        .filter(|n| n % 2 == 0)
        .skip(1)
        .limit(4);

    let first = sequence.to_vec();
    assert_eq!(first, vec![6, 12, 18, 24]);
    assert_eq!(sequence.to_vec(), first);
}

#[rstest]
fn sequence_partial_traversals_are_independent() {
    let sequence = Sequence::of(vec!['a', 'b', 'c']);
    let mut left = sequence.iter();
    let mut right = sequence.iter();

    assert_eq!(left.next(), Some('a'));
    assert_eq!(left.next(), Some('b'));
    assert_eq!(right.next(), Some('a'));
    assert_eq!(left.next(), Some('c'));
    assert_eq!(right.collect::<Vec<_>>(), vec!['b', 'c']);
}

#[rstest]
fn sequence_once_second_traversal_is_empty() {
    let once = Sequence::once(vec![1, 2, 3].into_iter().map(|n| n * 10));
    assert_eq!(once.to_vec(), vec![10, 20, 30]);
    assert_eq!(once.to_vec(), Vec::<i32>::new());
    assert!(once.is_empty());
}

#[rstest]
fn sequence_once_is_empty_does_not_consume() {
    let once = Sequence::once(vec![1, 2, 3]);
    assert!(!once.is_empty());
    assert!(!once.is_empty());
    assert_eq!(once.to_vec(), vec![1, 2, 3]);
    assert!(once.is_empty());
}

#[rstest]
fn sequence_once_is_empty_through_map_does_not_consume() {
    let once = Sequence::once(vec![1, 2, 3]).map(|n| n * 2).limit(2);
    assert!(!once.is_empty());
    assert_eq!(once.to_vec(), vec![2, 4]);
}

#[rstest]
fn sequence_once_shares_progress_between_cursors() {
    let once = Sequence::once(1..=4);
    let mut left = once.iter();
    let mut right = once.iter();

    assert_eq!(left.next(), Some(1));
    assert_eq!(right.next(), Some(2));
    assert_eq!(left.next(), Some(3));
    assert_eq!(right.next(), Some(4));
    assert_eq!(left.next(), None);
}

#[rstest]
fn sequence_cache_replays_and_interleaves() {
    let pulled = Rc::new(Cell::new(0));
    let counter = Rc::clone(&pulled);
    let cached = Sequence::cache((1..=3).inspect(move |_| counter.set(counter.get() + 1)));

    let mut first = cached.iter();
    assert_eq!(first.next(), Some(1));

    let mut second = cached.iter();
    assert_eq!(second.next(), Some(1));
    assert_eq!(second.next(), Some(2));
    assert_eq!(first.next(), Some(2));
    assert_eq!(first.next(), Some(3));
    assert_eq!(second.next(), Some(3));
    assert_eq!(second.next(), None);

    assert_eq!(cached.to_vec(), vec![1, 2, 3]);
    assert_eq!(pulled.get(), 3);
}

// =============================================================================
// Laziness
// =============================================================================

#[rstest]
fn sequence_map_runs_only_on_pull() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mapped = Sequence::range(0, 100).map(move |n| {
        counter.set(counter.get() + 1);
        n + 1
    });
    assert_eq!(calls.get(), 0);

    assert_eq!(mapped.first(), Some(1));
    assert_eq!(calls.get(), 1);

    assert_eq!(mapped.at(4), Some(5));
    assert_eq!(calls.get(), 6);
}

#[rstest]
fn sequence_count_of_sized_source_does_not_traverse() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mapped = Sequence::range(0, 50)
        .map(move |n| {
            counter.set(counter.get() + 1);
            n
        })
        .skip(10)
        .limit(25);

    assert_eq!(mapped.count(), 25);
    assert_eq!(mapped.known_size(), Some(25));
    assert_eq!(calls.get(), 0);
}

#[rstest]
fn sequence_count_after_filter_traverses() {
    let filtered = Sequence::range(0, 10).filter(|n| n % 3 == 0);
    assert_eq!(filtered.known_size(), None);
    assert_eq!(filtered.count(), 4);
}

#[rstest]
#[should_panic(expected = "bad element")]
fn sequence_failure_surfaces_only_at_traversal() {
    let sequence = Sequence::of(vec![1, 2, 3]).map(|n| {
        assert!(n != 3, "bad element");
        n
    });
    assert_eq!(sequence.first(), Some(1));
    let _ = sequence.to_vec();
}

#[rstest]
fn sequence_append_opens_second_lazily() {
    let opened = Rc::new(Cell::new(false));
    let flag = Rc::clone(&opened);
    let second = Sequence::from_fn(move || {
        flag.set(true);
        vec![3, 4]
    });
    let joined = Sequence::of(vec![1, 2]).append(&second);

    let mut cursor = joined.iter();
    assert_eq!(cursor.next(), Some(1));
    assert_eq!(cursor.next(), Some(2));
    assert!(!opened.get());
    assert_eq!(cursor.next(), Some(3));
    assert!(opened.get());
    assert_eq!(joined.count(), 4);
}

#[rstest]
fn sequence_recurse_steps_lazily() {
    let steps = Rc::new(Cell::new(0));
    let counter = Rc::clone(&steps);
    let powers = Sequence::recurse(1_u64, move |n| {
        counter.set(counter.get() + 1);
        n * 2
    });

    assert_eq!(powers.limit(5).to_vec(), vec![1, 2, 4, 8, 16]);
    assert_eq!(steps.get(), 4);
    assert_eq!(powers.first(), Some(1));
    assert_eq!(steps.get(), 4);
}

#[rstest]
fn sequence_generate_is_unbounded() {
    let next = Rc::new(Cell::new(0));
    let state = Rc::clone(&next);
    let naturals = Sequence::generate(move || {
        let value = state.get();
        state.set(value + 1);
        value
    });
    assert_eq!(naturals.limit(3).to_vec(), vec![0, 1, 2]);
    assert_eq!(Sequence::repeat('x').limit(3).join(""), "xxx");
}

// =============================================================================
// Combinators
// =============================================================================

#[rstest]
fn sequence_filter_twice_combines_predicates() {
    let evens = Sequence::range(0, 30).filter(|n| n % 2 == 0);
    let sixes = evens.filter(|n| n % 3 == 0);
    assert_eq!(sixes.to_vec(), vec![0, 6, 12, 18, 24]);
    assert_eq!(evens.count(), 15);
}

#[rstest]
#[case(1, vec![vec![1], vec![2], vec![3], vec![4], vec![5]])]
#[case(2, vec![vec![1, 2], vec![3, 4], vec![5]])]
#[case(5, vec![vec![1, 2, 3, 4, 5]])]
#[case(7, vec![vec![1, 2, 3, 4, 5]])]
fn sequence_batch_groups_consecutive(#[case] size: usize, #[case] expected: Vec<Vec<i32>>) {
    assert_eq!(Sequence::range(1, 6).batch(size).to_vec(), expected);
}

#[rstest]
#[should_panic(expected = "batch size must be positive")]
fn sequence_batch_zero_panics() {
    let _ = Sequence::range(1, 6).batch(0);
}

#[rstest]
fn sequence_batch_by_of_empty_is_empty() {
    let runs = Sequence::<i32>::empty().batch_by(|previous, next| next < previous);
    assert!(runs.is_empty());
}

#[rstest]
#[case(1, vec![0, 1, 2, 3, 4, 5, 6])]
#[case(3, vec![0, 3, 6])]
#[case(10, vec![0])]
fn sequence_step_keeps_every_nth(#[case] step: usize, #[case] expected: Vec<i32>) {
    assert_eq!(Sequence::range(0, 7).step(step).to_vec(), expected);
}

#[rstest]
fn sequence_until_and_ending_at() {
    let sequence = Sequence::of(vec![4, 8, 15, 16, 23, 42]);
    assert_eq!(sequence.until(16).to_vec(), vec![4, 8, 15]);
    assert_eq!(sequence.ending_at(16).to_vec(), vec![4, 8, 15, 16]);
    assert_eq!(sequence.until_matching(|n| n % 2 == 1).to_vec(), vec![4, 8]);
    assert_eq!(
        sequence.ending_at_matching(|n| *n > 100).to_vec(),
        vec![4, 8, 15, 16, 23, 42]
    );
}

#[rstest]
fn sequence_until_bounds_infinite_source() {
    let squares = Sequence::recurse(1, |n| n + 1).map(|n| n * n);
    assert_eq!(squares.until_matching(|n| *n > 50).to_vec(), vec![1, 4, 9, 16, 25, 36, 49]);
}

#[rstest]
fn sequence_distinct_per_traversal() {
    let sequence = Sequence::of(vec![3, 1, 3, 2, 1, 4]).distinct();
    assert_eq!(sequence.to_vec(), vec![3, 1, 2, 4]);
    assert_eq!(sequence.to_vec(), vec![3, 1, 2, 4]);
}

#[rstest]
fn sequence_flat_map_and_flatten() {
    let words = Sequence::of(vec!["ab", "", "cde"]);
    let letters = words.flat_map(|word| word.chars().collect::<Vec<_>>());
    assert_eq!(letters.join(""), "abcde");

    let nested = Sequence::of(vec![vec![1], vec![], vec![2, 3]]);
    assert_eq!(nested.flatten().to_vec(), vec![1, 2, 3]);
}

#[rstest]
fn sequence_terminal_operations() {
    let sequence = Sequence::range(1, 5);
    assert_eq!(sequence.fold(0, |sum, n| sum + n), 10);
    assert_eq!(sequence.reduce(|left, right| left * right), Some(24));
    assert_eq!(sequence.last(), Some(4));
    assert_eq!(sequence.at(9), None);
    assert!(sequence.contains(&3));
    assert!(!sequence.contains(&5));

    let mut seen = Vec::new();
    sequence.for_each(|n| seen.push(n));
    assert_eq!(seen, vec![1, 2, 3, 4]);
}

#[rstest]
fn sequence_display_and_join() {
    let sequence = Sequence::of(vec![1, 2, 3]);
    assert_eq!(sequence.to_string(), "[1, 2, 3]");
    assert_eq!(sequence.join(" -> "), "1 -> 2 -> 3");
    assert_eq!(Sequence::<i32>::empty().to_string(), "[]");
}

#[rstest]
fn sequence_into_iterator_by_reference() {
    let sequence: Sequence<i32> = (1..=3).collect();
    let mut total = 0;
    for n in &sequence {
        total += n;
    }
    assert_eq!(total, 6);
    assert_eq!(sequence.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
}

// =============================================================================
// Mutation
// =============================================================================

#[rstest]
fn sequence_over_store_reflects_mutations() {
    let store = Store::from(vec![1, 2, 3]);
    let doubled = Sequence::from_source(store.clone()).map(|n| n * 2);
    assert_eq!(doubled.to_vec(), vec![2, 4, 6]);

    store.push(4);
    assert_eq!(doubled.to_vec(), vec![2, 4, 6, 8]);
    assert_eq!(doubled.count(), 4);
}

#[rstest]
fn sequence_remove_if_reaches_store_through_one_to_one_steps() {
    let store: Store<i32> = (1..=10).collect();
    let sequence = Sequence::from_source(store.clone())
        .filter(|n| *n > 2)
        .map(|n| n * 10)
        .limit(5);

    let removed = sequence.remove_if(|n| n % 20 == 0).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(store.to_vec(), vec![1, 2, 3, 5, 7, 8, 9, 10]);
}

#[rstest]
fn sequence_clear_empties_backing_store() {
    let store: Store<i32> = (0..5).collect();
    Sequence::from_source(store.clone()).clear().unwrap();
    assert!(store.is_empty());
}

#[rstest]
fn sequence_remove_through_flat_map_is_unsupported() {
    let store = Store::from(vec![vec![1, 2], vec![3]]);
    let flattened = Sequence::from_source(store.clone()).flatten().map(|n: i32| n + 1);

    let error = flattened.remove_if(|_| true).unwrap_err();
    assert!(matches!(error, SequenceError::UnsupportedMutation { .. }));
    assert_eq!(store.len(), 2);
}

#[rstest]
fn sequence_remove_from_immutable_source_is_unsupported() {
    let error = Sequence::range(0, 3).clear().unwrap_err();
    assert!(matches!(error, SequenceError::UnsupportedMutation { .. }));
}

#[rstest]
fn sequence_remove_after_overrun_is_illegal() {
    let store = Store::from(vec![1, 2, 3]);
    let sequence = Sequence::from_source(store.clone()).until(2);
    let mut cursor = sequence.iter();
    assert_eq!(cursor.next(), Some(1));
    assert_eq!(cursor.next(), None);

    let error = cursor.remove().unwrap_err();
    assert!(matches!(error, SequenceError::IllegalState { .. }));
    assert_eq!(store.to_vec(), vec![1, 2, 3]);
}

#[rstest]
fn sequence_filter_remove_after_rejected_pull_is_illegal() {
    let store = Store::from(vec![1, 2]);
    let odd = Sequence::from_source(store.clone()).filter(|n| n % 2 == 1);
    let mut cursor = odd.iter();
    assert_eq!(cursor.next(), Some(1));
    assert_eq!(cursor.next(), None);

    let error = cursor.remove().unwrap_err();
    assert!(matches!(error, SequenceError::IllegalState { .. }));
    assert_eq!(store.to_vec(), vec![1, 2]);
}

#[rstest]
fn sequence_skip_remove_after_exhaustion_is_illegal() {
    let store = Store::from(vec![1, 2]);
    let sequence = Sequence::from_source(store.clone()).skip(5);
    let mut cursor = sequence.iter();
    assert_eq!(cursor.next(), None);

    let error = cursor.remove().unwrap_err();
    assert!(matches!(error, SequenceError::IllegalState { .. }));
    assert_eq!(store.to_vec(), vec![1, 2]);
}

#[rstest]
fn sequence_skip_remove_targets_yielded_element() {
    let store = Store::from(vec![1, 2, 3]);
    let sequence = Sequence::from_source(store.clone()).skip(1);
    let mut cursor = sequence.iter();
    assert_eq!(cursor.next(), Some(2));
    cursor.remove().unwrap();
    assert_eq!(store.to_vec(), vec![1, 3]);
}

#[rstest]
fn sequence_step_remove_after_skipped_pull_is_illegal() {
    let store = Store::from(vec![0, 1, 2]);
    let sequence = Sequence::from_source(store.clone()).step(3);
    let mut cursor = sequence.iter();
    assert_eq!(cursor.next(), Some(0));
    assert_eq!(cursor.next(), None);

    let error = cursor.remove().unwrap_err();
    assert!(matches!(error, SequenceError::IllegalState { .. }));
    assert_eq!(store.to_vec(), vec![0, 1, 2]);
}

#[rstest]
fn sequence_step_remove_if_removes_only_stepped_elements() {
    let store: Store<i32> = (0..7).collect();
    let removed = Sequence::from_source(store.clone())
        .step(3)
        .remove_if(|_| true)
        .unwrap();
    assert_eq!(removed, 3);
    assert_eq!(store.to_vec(), vec![1, 2, 4, 5]);
}

#[rstest]
fn sequence_distinct_remove_keeps_skipped_duplicate() {
    let store = Store::from(vec![7, 7]);
    let sequence = Sequence::from_source(store.clone()).distinct();
    let mut cursor = sequence.iter();
    assert_eq!(cursor.next(), Some(7));
    assert_eq!(cursor.next(), None);

    let error = cursor.remove().unwrap_err();
    assert!(matches!(error, SequenceError::IllegalState { .. }));
    assert_eq!(store.to_vec(), vec![7, 7]);
}

#[rstest]
fn sequence_to_store_is_detached() {
    let store = Store::from(vec![1, 2]);
    let copy = Sequence::from_source(store.clone()).to_store();
    copy.add(3).unwrap();
    assert_eq!(store.to_vec(), vec![1, 2]);
    assert_eq!(copy.to_vec(), vec![1, 2, 3]);
}
