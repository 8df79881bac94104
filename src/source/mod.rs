//! The iteration core: cursors and the capability traits every source,
//! sequence and view is built from.
//!
//! Capabilities are split into small traits so that an adapter implements
//! exactly what it can honour:
//!
//! - [`Source`]: can open a fresh [`Cursor`], and may know its size.
//! - [`Counted`]: always knows its size.
//! - [`MutableSource`]: accepts insertions and removals.
//! - [`IndexedSource`]: supports positional reads and writes.
//!
//! A read-only sequence implements only `Source`; calling a mutation on it
//! does not compile. Removal through a cursor is checked at runtime because a
//! cursor may or may not bottom out in a mutable store.
//!
//! # Examples
//!
//! ```rust
//! use sequins::source::{IndexedSource, MutableSource, Source, Store};
//!
//! let store = Store::from(vec![1, 2, 3, 4]);
//! store.remove_if(|element| element % 2 == 0).unwrap();
//! assert_eq!(store.to_vec(), vec![1, 3]);
//!
//! store.insert(1, 2).unwrap();
//! assert_eq!(store.get(1).unwrap(), 2);
//!
//! let collected: Vec<i32> = store.cursor().collect();
//! assert_eq!(collected, vec![1, 2, 3]);
//! ```

pub mod cursor;
mod store;

pub use cursor::{
    BoxCursor, Cursor, FilterCursor, IterCursor, SharedCursor, SingleUse, SliceCursor,
};
pub use store::Store;

use crate::error::SequenceError;

/// Anything that can produce a cursor over its elements.
///
/// Each call to [`Source::cursor`] starts an independent traversal. Sources
/// that wrap a single-use iterator return cursors sharing the same state, so
/// only the first traversal sees elements.
pub trait Source<T> {
    /// Opens a new cursor positioned before the first element.
    fn cursor(&self) -> BoxCursor<T>;

    /// Returns the number of elements if it is known without traversing.
    fn known_size(&self) -> Option<usize> {
        None
    }
}

/// A source whose size is always known.
pub trait Counted<T>: Source<T> {
    /// Number of elements a traversal would currently produce.
    fn len(&self) -> usize;

    /// Returns `true` if a traversal would currently produce nothing.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A source that accepts insertions and removals, propagating them to the
/// store it is backed by.
pub trait MutableSource<T>: Source<T> {
    /// Inserts `element` at the position the implementor's policy dictates
    /// (append for stores and filtered views, end of window for range views).
    ///
    /// Returns whether the source changed.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::InvalidArgument`] if `element` violates the
    /// source's invariant. Nothing is mutated in that case.
    fn add(&self, element: T) -> Result<bool, SequenceError>;

    /// Removes the first element equal to `element`.
    ///
    /// Returns whether a removal occurred.
    ///
    /// # Errors
    ///
    /// Propagates cursor removal failures.
    fn remove_element(&self, element: &T) -> Result<bool, SequenceError>
    where
        T: PartialEq,
    {
        let mut cursor = self.cursor();
        while let Some(candidate) = cursor.next() {
            if candidate == *element {
                cursor.remove()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Removes every element matching `predicate` and returns how many were
    /// removed.
    ///
    /// # Errors
    ///
    /// Propagates cursor removal failures.
    fn remove_if<P>(&self, mut predicate: P) -> Result<usize, SequenceError>
    where
        P: FnMut(&T) -> bool,
        Self: Sized,
    {
        let mut cursor = self.cursor();
        let mut removed = 0;
        while let Some(candidate) = cursor.next() {
            if predicate(&candidate) {
                cursor.remove()?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Removes every element visible through this source.
    ///
    /// # Errors
    ///
    /// Propagates cursor removal failures.
    fn clear(&self) -> Result<(), SequenceError> {
        let mut cursor = self.cursor();
        while cursor.next().is_some() {
            cursor.remove()?;
        }
        Ok(())
    }
}

/// A counted source with positional access.
pub trait IndexedSource<T>: Counted<T> {
    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::OutOfBounds`] if `index >= len()`.
    fn get(&self, index: usize) -> Result<T, SequenceError>;

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::OutOfBounds`] if `index >= len()`.
    fn set(&self, index: usize, element: T) -> Result<T, SequenceError>;

    /// Inserts `element` so that it ends up at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::OutOfBounds`] if `index > len()`.
    fn insert(&self, index: usize, element: T) -> Result<(), SequenceError>;

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::OutOfBounds`] if `index >= len()`.
    fn remove_at(&self, index: usize) -> Result<T, SequenceError>;
}
