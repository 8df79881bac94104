//! Live, mutable views onto a backing source.
//!
//! A view is a backing handle plus a small descriptor. It never copies the
//! backing elements: reads are computed from the backing source's current
//! state, and mutations are applied to it directly.
//!
//! - [`FilteredView`]: the elements satisfying a predicate.
//! - [`RangeView`]: the positions `[start, end)`.
//!
//! Views implement the same capability traits as the sources they wrap, so
//! they compose: a filtered view over a range view removes from the range,
//! which removes from the store.
//!
//! # Examples
//!
//! ```rust
//! use sequins::source::{MutableSource, Store};
//! use sequins::view::{FilteredView, RangeView};
//!
//! let store: Store<i32> = (0..10).collect();
//! let middle = RangeView::new(store.clone(), 2, 8).unwrap();
//! let even_middle = FilteredView::new(middle.clone(), |n: &i32| n % 2 == 0);
//!
//! even_middle.clear().unwrap();
//! assert_eq!(middle.to_vec(), vec![3, 5, 7]);
//! assert_eq!(store.to_vec(), vec![0, 1, 3, 5, 7, 8, 9]);
//! ```

mod filtered;
mod range;

pub use filtered::FilteredView;
pub use range::RangeView;
