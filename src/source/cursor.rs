//! Cursors: iterators that may also remove what they just produced.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::SequenceError;

/// An iterator that can optionally remove the element it returned last.
///
/// Advancing and exhaustion are both expressed through [`Iterator::next`]: a
/// cursor that returns `None` is exhausted. The only addition is
/// [`Cursor::remove`], which mutates whatever backing store the cursor was
/// opened over.
///
/// Cursors that are not backed by a mutable store keep the default
/// implementation, which reports [`SequenceError::UnsupportedMutation`].
pub trait Cursor: Iterator {
    /// Removes the element most recently returned by `next` from the backing
    /// store.
    ///
    /// # Errors
    ///
    /// - [`SequenceError::UnsupportedMutation`] if the cursor has no mutable
    ///   backing store.
    /// - [`SequenceError::IllegalState`] if `next` has not been called since
    ///   the last removal.
    fn remove(&mut self) -> Result<(), SequenceError> {
        Err(SequenceError::unsupported("remove"))
    }
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    #[inline]
    fn remove(&mut self) -> Result<(), SequenceError> {
        (**self).remove()
    }
}

/// A type-erased cursor producing `T`.
pub type BoxCursor<T> = Box<dyn Cursor<Item = T>>;

/// Boxes any `'static` iterator into a read-only [`BoxCursor`].
#[inline]
pub fn boxed<I>(iterator: I) -> BoxCursor<I::Item>
where
    I: Iterator + 'static,
{
    Box::new(IterCursor::new(iterator))
}

/// Returns a cursor that yields nothing.
#[inline]
pub fn empty<T: 'static>() -> BoxCursor<T> {
    boxed(std::iter::empty())
}

// =============================================================================
// IterCursor
// =============================================================================

/// Adapts a plain [`Iterator`] into a cursor without removal support.
#[derive(Debug, Clone)]
pub struct IterCursor<I> {
    inner: I,
}

impl<I> IterCursor<I> {
    /// Wraps `inner`.
    #[inline]
    pub const fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I: Iterator> Iterator for IterCursor<I> {
    type Item = I::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I: Iterator> Cursor for IterCursor<I> {}

// =============================================================================
// FilterCursor
// =============================================================================

/// Yields only the elements of an inner cursor that satisfy a predicate.
///
/// Removal is delegated to the inner cursor, but only while the inner
/// cursor's last element is the one this cursor handed out. Once `next` has
/// pulled a rejected element, `remove` fails with
/// [`SequenceError::IllegalState`] until the next match is returned.
pub struct FilterCursor<T> {
    inner: BoxCursor<T>,
    predicate: Rc<dyn Fn(&T) -> bool>,
    yielded: bool,
}

impl<T> FilterCursor<T> {
    /// Filters `inner` through `predicate`.
    #[inline]
    pub fn new(inner: BoxCursor<T>, predicate: Rc<dyn Fn(&T) -> bool>) -> Self {
        Self {
            inner,
            predicate,
            yielded: false,
        }
    }
}

impl<T> Iterator for FilterCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.yielded = false;
        loop {
            let element = self.inner.next()?;
            if (self.predicate)(&element) {
                self.yielded = true;
                return Some(element);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl<T> Cursor for FilterCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        if !self.yielded {
            return Err(SequenceError::illegal_state(
                "remove called without a preceding matching next",
            ));
        }
        self.yielded = false;
        self.inner.remove()
    }
}

// =============================================================================
// SingleUse / SharedCursor
// =============================================================================

struct SingleUseState<T> {
    cursor: BoxCursor<T>,
    /// Pulled by [`SingleUse::has_next`] but not yet handed out.
    peeked: Option<T>,
}

/// A single-use cursor shared by several traversals.
///
/// Every handle opened with [`SingleUse::open`] pulls from the same
/// underlying cursor, so once it is drained all handles, including ones
/// opened later, observe an empty traversal. This is how single-use sources
/// are represented.
///
/// [`SingleUse::has_next`] looks one element ahead without losing it: the
/// peeked element is handed to whichever traversal pulls next.
pub struct SingleUse<T> {
    state: Rc<RefCell<SingleUseState<T>>>,
}

impl<T> SingleUse<T> {
    /// Shares `cursor` between traversals.
    #[inline]
    pub fn new(cursor: BoxCursor<T>) -> Self {
        Self {
            state: Rc::new(RefCell::new(SingleUseState {
                cursor,
                peeked: None,
            })),
        }
    }

    /// Returns `true` if a traversal would still see an element.
    pub fn has_next(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.peeked.is_none() {
            state.peeked = state.cursor.next();
        }
        state.peeked.is_some()
    }

    /// Opens a handle onto the shared cursor.
    #[inline]
    pub fn open(&self) -> SharedCursor<T> {
        SharedCursor {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> Clone for SingleUse<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: 'static> super::Source<T> for SingleUse<T> {
    fn cursor(&self) -> BoxCursor<T> {
        Box::new(self.open())
    }
}

/// One traversal's handle onto a [`SingleUse`] cursor.
pub struct SharedCursor<T> {
    state: Rc<RefCell<SingleUseState<T>>>,
}

impl<T> Iterator for SharedCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut state = self.state.borrow_mut();
        if let Some(element) = state.peeked.take() {
            return Some(element);
        }
        state.cursor.next()
    }
}

impl<T> Cursor for SharedCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        let mut state = self.state.borrow_mut();
        if state.peeked.is_some() {
            return Err(SequenceError::illegal_state(
                "shared cursor already looked past the last element handed out",
            ));
        }
        state.cursor.remove()
    }
}

// =============================================================================
// SliceCursor
// =============================================================================

/// A cursor over an immutable shared slice, cloning each element out.
pub struct SliceCursor<T> {
    elements: Rc<[T]>,
    index: usize,
}

impl<T> SliceCursor<T> {
    /// Creates a cursor positioned before the first element of `elements`.
    #[inline]
    pub const fn new(elements: Rc<[T]>) -> Self {
        Self { elements, index: 0 }
    }
}

impl<T: Clone> Iterator for SliceCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let element = self.elements.get(self.index)?.clone();
        self.index += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.elements.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for SliceCursor<T> {}

impl<T: Clone> Cursor for SliceCursor<T> {}
