//! A live index window onto a backing source.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::trace;

use crate::error::SequenceError;
use crate::source::{BoxCursor, Counted, Cursor, IndexedSource, MutableSource, Source};

/// Mutable bounds shared by a range view, its clones and its cursors.
#[derive(Debug)]
struct Window {
    end: Cell<usize>,
    /// Backing length at the last time this window was brought up to date.
    observed: Cell<usize>,
}

/// A view of the backing positions `[start, end)`.
///
/// View index `i` maps to backing index `start + i`. Inserting or removing
/// through the view shifts `end` by the same amount, so the window keeps
/// denoting the same logical slice. When the backing source grows or shrinks
/// by other means, the next access shifts `end` by the observed change in
/// backing length (clamped to the backing length). That adjustment is best
/// effort: two windows over the same store mutated in interleaved fashion
/// follow last-writer-wins.
///
/// Clones of a range view share its window, like clones of a `Store` share
/// its elements.
///
/// # Examples
///
/// ```rust
/// use sequins::source::{IndexedSource, Store};
/// use sequins::view::RangeView;
///
/// let store: Store<i32> = (0..10).collect();
/// let window = RangeView::new(store.clone(), 2, 8).unwrap();
///
/// assert_eq!(window.remove_at(1).unwrap(), 3);
/// assert_eq!(window.to_vec(), vec![2, 4, 5, 6, 7]);
/// assert_eq!(store.to_vec(), vec![0, 1, 2, 4, 5, 6, 7, 8, 9]);
/// ```
pub struct RangeView<T, B> {
    backing: B,
    start: usize,
    window: Rc<Window>,
    _element: PhantomData<fn() -> T>,
}

impl<T: 'static, B: IndexedSource<T>> RangeView<T, B> {
    /// Creates a window over backing positions `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::OutOfBounds`] if `end` exceeds the backing
    /// length or `start` exceeds `end`.
    pub fn new(backing: B, start: usize, end: usize) -> Result<Self, SequenceError> {
        let length = backing.len();
        if end > length {
            return Err(SequenceError::out_of_bounds(end, length));
        }
        if start > end {
            return Err(SequenceError::out_of_bounds(start, end));
        }
        Ok(Self {
            backing,
            start,
            window: Rc::new(Window {
                end: Cell::new(end),
                observed: Cell::new(length),
            }),
            _element: PhantomData,
        })
    }

    /// The backing source.
    #[inline]
    pub const fn backing(&self) -> &B {
        &self.backing
    }

    /// First backing index covered by the window.
    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Backing index one past the window, after accounting for outside
    /// changes to the backing length.
    pub fn end(&self) -> usize {
        self.synchronize();
        self.window.end.get()
    }

    /// Shifts `end` by however much the backing length changed since it was
    /// last observed, and returns the current window length.
    fn synchronize(&self) -> usize {
        let current = self.backing.len();
        let observed = self.window.observed.get();
        if current != observed {
            let end = self.window.end.get();
            let shifted = if current > observed {
                end + (current - observed)
            } else {
                end.saturating_sub(observed - current)
            };
            let end = shifted.min(current);
            trace!(observed, current, end, "range view resynchronized");
            self.window.end.set(end);
            self.window.observed.set(current);
        }
        self.window.end.get().saturating_sub(self.start)
    }

    /// Records one element inserted (`grew`) or removed through this view.
    fn shift(&self, grew: bool) {
        let Window { end, observed } = &*self.window;
        if grew {
            end.set(end.get() + 1);
            observed.set(observed.get() + 1);
        } else {
            end.set(end.get() - 1);
            observed.set(observed.get() - 1);
        }
    }

    /// Opens a nested window over view positions `[from, to)`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RangeView::new`], against this view's length.
    pub fn sub_range(&self, from: usize, to: usize) -> Result<RangeView<T, Self>, SequenceError>
    where
        B: Clone + 'static,
    {
        RangeView::new(self.clone(), from, to)
    }

    /// Collects the elements currently in the window.
    pub fn to_vec(&self) -> Vec<T> {
        let length = self.synchronize();
        (0..length)
            .filter_map(|index| self.backing.get(self.start + index).ok())
            .collect()
    }
}

impl<T, B: Clone> Clone for RangeView<T, B> {
    fn clone(&self) -> Self {
        Self {
            backing: self.backing.clone(),
            start: self.start,
            window: Rc::clone(&self.window),
            _element: PhantomData,
        }
    }
}

impl<T, B: fmt::Debug> fmt::Debug for RangeView<T, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RangeView")
            .field("backing", &self.backing)
            .field("start", &self.start)
            .field("end", &self.window.end.get())
            .finish()
    }
}

// =============================================================================
// Capabilities
// =============================================================================

impl<T: 'static, B: IndexedSource<T> + Clone + 'static> Source<T> for RangeView<T, B> {
    fn cursor(&self) -> BoxCursor<T> {
        Box::new(RangeCursor {
            view: self.clone(),
            next_index: 0,
            last_returned: None,
        })
    }

    fn known_size(&self) -> Option<usize> {
        Some(self.synchronize())
    }
}

impl<T: 'static, B: IndexedSource<T> + Clone + 'static> Counted<T> for RangeView<T, B> {
    fn len(&self) -> usize {
        self.synchronize()
    }
}

impl<T: 'static, B: IndexedSource<T> + Clone + 'static> MutableSource<T> for RangeView<T, B> {
    /// Inserts at the end of the window.
    fn add(&self, element: T) -> Result<bool, SequenceError> {
        let length = self.synchronize();
        self.insert(length, element)?;
        Ok(true)
    }

    /// Removes exactly the elements in the window, one at a time.
    fn clear(&self) -> Result<(), SequenceError> {
        let length = self.synchronize();
        for _ in 0..length {
            self.remove_at(0)?;
        }
        Ok(())
    }
}

impl<T: 'static, B: IndexedSource<T> + Clone + 'static> IndexedSource<T> for RangeView<T, B> {
    fn get(&self, index: usize) -> Result<T, SequenceError> {
        let length = self.synchronize();
        if index >= length {
            return Err(SequenceError::out_of_bounds(index, length));
        }
        self.backing.get(self.start + index)
    }

    fn set(&self, index: usize, element: T) -> Result<T, SequenceError> {
        let length = self.synchronize();
        if index >= length {
            return Err(SequenceError::out_of_bounds(index, length));
        }
        self.backing.set(self.start + index, element)
    }

    fn insert(&self, index: usize, element: T) -> Result<(), SequenceError> {
        let length = self.synchronize();
        if index > length {
            return Err(SequenceError::out_of_bounds(index, length));
        }
        self.backing.insert(self.start + index, element)?;
        self.shift(true);
        Ok(())
    }

    fn remove_at(&self, index: usize) -> Result<T, SequenceError> {
        let length = self.synchronize();
        if index >= length {
            return Err(SequenceError::out_of_bounds(index, length));
        }
        let removed = self.backing.remove_at(self.start + index)?;
        self.shift(false);
        Ok(removed)
    }
}

// =============================================================================
// RangeCursor
// =============================================================================

/// Positional cursor over a [`RangeView`]; removal shrinks the window.
struct RangeCursor<T, B> {
    view: RangeView<T, B>,
    next_index: usize,
    last_returned: Option<usize>,
}

impl<T: 'static, B: IndexedSource<T> + Clone + 'static> Iterator for RangeCursor<T, B> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let element = self.view.get(self.next_index).ok()?;
        self.last_returned = Some(self.next_index);
        self.next_index += 1;
        Some(element)
    }
}

impl<T: 'static, B: IndexedSource<T> + Clone + 'static> Cursor for RangeCursor<T, B> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        let index = self
            .last_returned
            .take()
            .ok_or(SequenceError::illegal_state("remove called without a preceding next"))?;
        self.view.remove_at(index)?;
        self.next_index = index;
        Ok(())
    }
}
