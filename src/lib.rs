//! # sequins
//!
//! Lazy, restartable sequences and live, mutable views over shared
//! collections.
//!
//! ## Overview
//!
//! The standard library's iterators are single-pass and borrow their
//! collection. This crate adds a layer on top where a *sequence* is a
//! reusable description of a traversal, and a *view* is a live window onto a
//! shared collection that can be read and mutated in place. It includes:
//!
//! - **Sources**: capability traits ([`source::Source`],
//!   [`source::MutableSource`], ...) and the shared [`source::Store`]
//! - **Sequences**: lazy combinators (map, filter, batch, until, ...) that
//!   can be traversed any number of times
//! - **Views**: filtered and ranged windows that write through to their
//!   backing store
//! - **Chains**: appendable concatenations of reusable and single-use sources
//! - **Ordering**: stable sorted views, ephemeral and seeded stable shuffles
//!
//! Everything here is single-threaded: handles share state through `Rc` and
//! `RefCell`, and no type is `Send` or `Sync`.
//!
//! ## Feature Flags
//!
//! - `sequence`: Lazy sequences
//! - `view`: Filtered and range views
//! - `chain`: Appendable chains (implies `sequence`)
//! - `ordering`: Sorted and shuffled views (implies `sequence`, pulls in `rand`)
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use sequins::prelude::*;
//!
//! let store: Store<i32> = (1..=10).collect();
//! let evens = FilteredView::new(store.clone(), |n: &i32| n % 2 == 0);
//! assert_eq!(evens.len(), 5);
//!
//! let squares = Sequence::from_source(evens.clone()).map(|n| n * n);
//! assert_eq!(squares.to_vec(), vec![4, 16, 36, 64, 100]);
//!
//! evens.clear().unwrap();
//! assert!(squares.is_empty());
//! assert_eq!(store.to_vec(), vec![1, 3, 5, 7, 9]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use sequins::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::SequenceError;
    pub use crate::source::{BoxCursor, Counted, Cursor, IndexedSource, MutableSource, Source, Store};

    #[cfg(feature = "sequence")]
    pub use crate::sequence::Sequence;

    #[cfg(feature = "view")]
    pub use crate::view::{FilteredView, RangeView};

    #[cfg(feature = "chain")]
    pub use crate::chain::Chain;

    #[cfg(feature = "ordering")]
    pub use crate::ordering::{Shuffled, Sorted, StableShuffled};
}

pub mod control;
pub mod error;
pub mod source;

#[cfg(feature = "sequence")]
pub mod sequence;

#[cfg(feature = "view")]
pub mod view;

#[cfg(feature = "chain")]
pub mod chain;

#[cfg(feature = "ordering")]
pub mod ordering;
