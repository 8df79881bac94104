#![cfg(feature = "chain")]
//! Integration tests for Chain<T>.
//!
//! Tests cover:
//! - Reusable versus single-use segments across traversals
//! - Lazy evaluation of nested segments
//! - Appending while a traversal is in progress
//! - Removal through a chain cursor

use rstest::rstest;
use sequins::chain::Chain;
use sequins::sequence::Sequence;
use sequins::source::{Cursor, Source, Store};
use std::cell::Cell;
use std::rc::Rc;

fn letters(text: &str) -> Vec<char> {
    text.chars().collect()
}

#[rstest]
fn chain_reusable_segments_replay() {
    let chain = Chain::from_vec(letters("abc"));
    chain.append_vec(letters("def"));

    assert_eq!(chain.to_vec(), letters("abcdef"));
    assert_eq!(chain.to_vec(), letters("abcdef"));
}

#[rstest]
fn chain_single_use_segment_is_drained_once() {
    let chain = Chain::from_vec(letters("abc"));
    chain.append_iter(letters("def"));
    chain.append_vec(letters("ghi"));

    assert_eq!(chain.to_vec(), letters("abcdefghi"));
    assert_eq!(chain.to_vec(), letters("abcghi"));
    assert_eq!(chain.to_vec(), letters("abcghi"));
}

#[rstest]
fn chain_is_empty_keeps_single_use_elements() {
    let chain = Chain::new();
    chain.append_vec(Vec::new());
    chain.append_iter(letters("def"));

    assert!(!chain.is_empty());
    assert!(!chain.is_empty());
    assert_eq!(chain.to_vec(), letters("def"));
    assert!(chain.is_empty());
}

#[rstest]
fn chain_appends_are_chainable() {
    let chain = Chain::new();
    chain
        .append_vec(vec![1, 2])
        .append(Sequence::range(3, 5))
        .append_iter(5..6);

    assert_eq!(chain.segment_count(), 3);
    assert_eq!(chain.to_vec(), vec![1, 2, 3, 4, 5]);
    assert_eq!(chain.len(), 4);
}

#[rstest]
fn chain_reflects_live_store_segment() {
    let store = Store::from(vec![10, 20]);
    let chain = Chain::from_vec(vec![1]);
    chain.append(store.clone());

    store.push(30);
    assert_eq!(chain.to_vec(), vec![1, 10, 20, 30]);
}

#[rstest]
fn chain_nested_segment_is_lazy() {
    let opened = Rc::new(Cell::new(0));
    let counter = Rc::clone(&opened);
    let outer = Sequence::from_fn(move || {
        counter.set(counter.get() + 1);
        vec![Sequence::of(vec![3, 4]), Sequence::of(vec![5])]
    });

    let chain = Chain::from_vec(vec![1, 2]);
    chain.flat_append(&outer);
    assert_eq!(opened.get(), 0);

    let mut cursor = chain.iter();
    assert_eq!(cursor.next(), Some(1));
    assert_eq!(cursor.next(), Some(2));
    assert_eq!(opened.get(), 0);
    assert_eq!(cursor.collect::<Vec<_>>(), vec![3, 4, 5]);
    assert_eq!(opened.get(), 1);

    assert_eq!(chain.to_vec(), vec![1, 2, 3, 4, 5]);
    assert_eq!(opened.get(), 2);
}

#[rstest]
#[should_panic(expected = "nested source failed")]
fn chain_nested_failure_surfaces_on_reach() {
    let outer: Sequence<Sequence<i32>> = Sequence::from_fn(|| -> Vec<Sequence<i32>> {
        panic!("nested source failed");
    });
    let chain = Chain::from_vec(vec![1]);
    chain.flat_append(&outer);

    let mut cursor = chain.iter();
    assert_eq!(cursor.next(), Some(1));
    let _ = cursor.next();
}

#[rstest]
fn chain_segment_appended_mid_traversal_is_seen() {
    let chain = Chain::from_vec(vec![1, 2]);
    let mut cursor = chain.iter();
    assert_eq!(cursor.next(), Some(1));

    chain.append_vec(vec![3]);
    assert_eq!(cursor.collect::<Vec<_>>(), vec![2, 3]);
}

#[rstest]
fn chain_clones_share_segments() {
    let chain = Chain::from_vec(vec![1]);
    let handle = chain.clone();
    handle.append_vec(vec![2]);
    assert_eq!(chain.to_vec(), vec![1, 2]);
}

#[rstest]
fn chain_cursor_remove_reaches_segment_store() {
    let store = Store::from(vec![1, 2, 3]);
    let chain = Chain::from_vec(vec![0]);
    chain.append(store.clone());

    let mut cursor = chain.cursor();
    assert_eq!(cursor.next(), Some(0));
    assert!(cursor.remove().is_err());
    assert_eq!(cursor.next(), Some(1));
    cursor.remove().unwrap();

    assert_eq!(store.to_vec(), vec![2, 3]);
    assert_eq!(chain.to_vec(), vec![0, 2, 3]);
}

#[rstest]
fn chain_as_sequence_sees_later_segments() {
    let chain = Chain::from_vec(vec![1, 2]);
    let sequence = chain.to_sequence().map(|n| n * 10);
    chain.append_vec(vec![3]);

    assert_eq!(sequence.to_vec(), vec![10, 20, 30]);
}

#[rstest]
fn chain_display_and_equality() {
    let left = Chain::from_vec(vec![1, 2, 3]);
    let right = Chain::from_vec(vec![1]);
    right.append_vec(vec![2, 3]);

    assert_eq!(left.to_string(), "[1, 2, 3]");
    assert_eq!(left, right);
    assert!(Chain::<i32>::new().is_empty());
}

#[rstest]
fn chain_iterates_by_reference() {
    let chain = Chain::from_vec(vec![1, 2, 3]);
    let mut total = 0;
    for element in &chain {
        total += element;
    }
    assert_eq!(total, 6);
}
