//! A live view of the elements of a backing source that satisfy a predicate.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::SequenceError;
use crate::source::{BoxCursor, Counted, FilterCursor, IndexedSource, MutableSource, Source};

/// A view exposing only the elements of `B` that satisfy a predicate.
///
/// The view never copies: every read opens a fresh cursor on the backing
/// source, and every mutation goes straight to it.
///
/// - [`MutableSource::add`] appends to the backing source only if the
///   predicate holds, and fails with [`SequenceError::InvalidArgument`]
///   otherwise, leaving the backing source untouched.
/// - [`MutableSource::remove_element`] removes the first backing element
///   that both satisfies the predicate and equals the argument.
/// - Removing through the view's cursor removes exactly the element the
///   cursor returned last.
///
/// # Examples
///
/// ```rust
/// use sequins::source::{MutableSource, Store};
/// use sequins::view::FilteredView;
///
/// let store = Store::from(vec![1, 2, 3, 4, 5]);
/// let odd = FilteredView::new(store.clone(), |n: &i32| n % 2 == 1);
///
/// assert!(odd.add(7).is_ok());
/// assert!(odd.add(8).is_err());
/// assert_eq!(store.to_vec(), vec![1, 2, 3, 4, 5, 7]);
/// assert_eq!(odd.to_vec(), vec![1, 3, 5, 7]);
/// ```
pub struct FilteredView<T, B> {
    backing: B,
    predicate: Rc<dyn Fn(&T) -> bool>,
}

impl<T: 'static, B: Source<T>> FilteredView<T, B> {
    /// Creates a view of the elements of `backing` satisfying `predicate`.
    pub fn new<P>(backing: B, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        Self {
            backing,
            predicate: Rc::new(predicate),
        }
    }

    /// The backing source.
    #[inline]
    pub const fn backing(&self) -> &B {
        &self.backing
    }

    /// Returns `true` if `element` may appear in this view.
    #[inline]
    pub fn admits(&self, element: &T) -> bool {
        (self.predicate)(element)
    }

    /// Narrows the view with a second predicate; both must hold.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
        B: Clone,
    {
        let existing = Rc::clone(&self.predicate);
        Self {
            backing: self.backing.clone(),
            predicate: Rc::new(move |element: &T| existing(element) && predicate(element)),
        }
    }

    /// Fails unless `element` may appear in this view.
    fn require(&self, element: &T) -> Result<(), SequenceError> {
        if self.admits(element) {
            return Ok(());
        }
        debug!("filtered view rejected an element failing its predicate");
        Err(SequenceError::invalid_argument(
            "element does not satisfy the view predicate",
        ))
    }

    /// Backing position of the `index`-th visible element.
    fn position(&self, index: usize) -> Option<usize> {
        self.backing
            .cursor()
            .enumerate()
            .filter(|(_, element)| self.admits(element))
            .nth(index)
            .map(|(position, _)| position)
    }

    /// Collects the currently visible elements.
    pub fn to_vec(&self) -> Vec<T> {
        self.cursor().collect()
    }

    /// Returns `true` if a visible element equals `element`.
    pub fn contains(&self, element: &T) -> bool
    where
        T: PartialEq,
    {
        self.admits(element) && self.cursor().any(|candidate| candidate == *element)
    }
}

impl<T, B: Clone> Clone for FilteredView<T, B> {
    fn clone(&self) -> Self {
        Self {
            backing: self.backing.clone(),
            predicate: Rc::clone(&self.predicate),
        }
    }
}

impl<T, B: fmt::Debug> fmt::Debug for FilteredView<T, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FilteredView")
            .field("backing", &self.backing)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Capabilities
// =============================================================================

impl<T: 'static, B: Source<T>> Source<T> for FilteredView<T, B> {
    fn cursor(&self) -> BoxCursor<T> {
        Box::new(FilterCursor::new(
            self.backing.cursor(),
            Rc::clone(&self.predicate),
        ))
    }
}

impl<T: 'static, B: Source<T>> Counted<T> for FilteredView<T, B> {
    fn len(&self) -> usize {
        self.cursor().count()
    }

    fn is_empty(&self) -> bool {
        self.cursor().next().is_none()
    }
}

impl<T: 'static, B: MutableSource<T>> MutableSource<T> for FilteredView<T, B> {
    fn add(&self, element: T) -> Result<bool, SequenceError> {
        self.require(&element)?;
        self.backing.add(element)
    }
}

/// Positions count visible elements only. Inserting at `len()` appends to the
/// backing source, like [`MutableSource::add`].
impl<T: 'static, B: IndexedSource<T>> IndexedSource<T> for FilteredView<T, B> {
    fn get(&self, index: usize) -> Result<T, SequenceError> {
        self.cursor()
            .nth(index)
            .ok_or_else(|| SequenceError::out_of_bounds(index, self.len()))
    }

    fn set(&self, index: usize, element: T) -> Result<T, SequenceError> {
        self.require(&element)?;
        let position = self
            .position(index)
            .ok_or_else(|| SequenceError::out_of_bounds(index, self.len()))?;
        self.backing.set(position, element)
    }

    fn insert(&self, index: usize, element: T) -> Result<(), SequenceError> {
        self.require(&element)?;
        let length = self.len();
        if index > length {
            return Err(SequenceError::out_of_bounds(index, length));
        }
        let position = if index == length {
            self.backing.len()
        } else {
            self.position(index)
                .ok_or(SequenceError::out_of_bounds(index, length))?
        };
        self.backing.insert(position, element)
    }

    fn remove_at(&self, index: usize) -> Result<T, SequenceError> {
        let position = self
            .position(index)
            .ok_or_else(|| SequenceError::out_of_bounds(index, self.len()))?;
        self.backing.remove_at(position)
    }
}
