//! The shared mutable backing store.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use super::cursor::{BoxCursor, Cursor};
use super::{Counted, IndexedSource, MutableSource, Source};
use crate::error::SequenceError;

/// A shared, mutable, ordered backing store.
///
/// `Store<T>` is a reference-counted handle: cloning it yields another
/// handle onto the *same* elements. Views and sequences built over a store
/// hold such a handle, so every mutation made through any of them is visible
/// through all of them, and the store stays alive as long as any of them
/// does.
///
/// The store is single-threaded (`!Send`, `!Sync`). No `RefCell` borrow is
/// held while user code runs, so a closure passed to a view may itself read
/// the store.
///
/// # Examples
///
/// ```rust
/// use sequins::source::{MutableSource, Store};
///
/// let store = Store::from(vec![1, 2, 3]);
/// let alias = store.clone();
/// alias.add(4).unwrap();
/// assert_eq!(store.to_vec(), vec![1, 2, 3, 4]);
/// ```
pub struct Store<T> {
    elements: Rc<RefCell<Vec<T>>>,
}

impl<T> Store<T> {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a store that takes ownership of `elements`.
    #[inline]
    #[must_use]
    pub fn from_vec(elements: Vec<T>) -> Self {
        Self {
            elements: Rc::new(RefCell::new(elements)),
        }
    }

    /// Appends `element`. Infallible counterpart of [`MutableSource::add`].
    #[inline]
    pub fn push(&self, element: T) {
        self.elements.borrow_mut().push(element);
    }

    /// Returns a read guard over the current contents.
    ///
    /// # Panics
    ///
    /// Panics if the store is being mutated at the same time, which can only
    /// happen from inside a callback running under a mutable borrow.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, [T]> {
        Ref::map(self.elements.borrow(), Vec::as_slice)
    }

    /// Returns `true` if both handles point at the same elements.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.elements, &other.elements)
    }

    /// Number of elements currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    /// Returns `true` if the store holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }
}

impl<T: Clone> Store<T> {
    /// Copies the current contents out.
    pub fn to_vec(&self) -> Vec<T> {
        self.elements.borrow().clone()
    }
}

impl<T> Clone for Store<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            elements: Rc::clone(&self.elements),
        }
    }
}

impl<T> Default for Store<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for Store<T> {
    #[inline]
    fn from(elements: Vec<T>) -> Self {
        Self::from_vec(elements)
    }
}

impl<T> FromIterator<T> for Store<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("Store")
            .field(&*self.elements.borrow())
            .finish()
    }
}

impl<T: PartialEq> PartialEq for Store<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.elements.borrow() == *other.elements.borrow()
    }
}

// =============================================================================
// Capabilities
// =============================================================================

impl<T: Clone + 'static> Source<T> for Store<T> {
    fn cursor(&self) -> BoxCursor<T> {
        Box::new(StoreCursor {
            elements: Rc::clone(&self.elements),
            next_index: 0,
            last_returned: None,
        })
    }

    fn known_size(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T: Clone + 'static> Counted<T> for Store<T> {
    fn len(&self) -> usize {
        Self::len(self)
    }
}

impl<T: Clone + 'static> MutableSource<T> for Store<T> {
    fn add(&self, element: T) -> Result<bool, SequenceError> {
        self.push(element);
        Ok(true)
    }

    fn remove_element(&self, element: &T) -> Result<bool, SequenceError>
    where
        T: PartialEq,
    {
        let mut elements = self.elements.borrow_mut();
        match elements.iter().position(|candidate| candidate == element) {
            Some(index) => {
                elements.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear(&self) -> Result<(), SequenceError> {
        self.elements.borrow_mut().clear();
        Ok(())
    }
}

impl<T: Clone + 'static> IndexedSource<T> for Store<T> {
    fn get(&self, index: usize) -> Result<T, SequenceError> {
        let elements = self.elements.borrow();
        elements
            .get(index)
            .cloned()
            .ok_or_else(|| SequenceError::out_of_bounds(index, elements.len()))
    }

    fn set(&self, index: usize, element: T) -> Result<T, SequenceError> {
        let mut elements = self.elements.borrow_mut();
        let length = elements.len();
        let slot = elements
            .get_mut(index)
            .ok_or(SequenceError::out_of_bounds(index, length))?;
        Ok(std::mem::replace(slot, element))
    }

    fn insert(&self, index: usize, element: T) -> Result<(), SequenceError> {
        let mut elements = self.elements.borrow_mut();
        if index > elements.len() {
            return Err(SequenceError::out_of_bounds(index, elements.len()));
        }
        elements.insert(index, element);
        Ok(())
    }

    fn remove_at(&self, index: usize) -> Result<T, SequenceError> {
        let mut elements = self.elements.borrow_mut();
        if index >= elements.len() {
            return Err(SequenceError::out_of_bounds(index, elements.len()));
        }
        Ok(elements.remove(index))
    }
}

// =============================================================================
// StoreCursor
// =============================================================================

/// Cursor over a [`Store`] that supports removal.
///
/// The cursor reads by position, so after `remove` it steps back one slot
/// and the following `next` yields the element that used to follow the
/// removed one.
struct StoreCursor<T> {
    elements: Rc<RefCell<Vec<T>>>,
    next_index: usize,
    last_returned: Option<usize>,
}

impl<T: Clone> Iterator for StoreCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let element = self.elements.borrow().get(self.next_index).cloned()?;
        self.last_returned = Some(self.next_index);
        self.next_index += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.elements.borrow().len().saturating_sub(self.next_index);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> Cursor for StoreCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        let index = self
            .last_returned
            .take()
            .ok_or(SequenceError::illegal_state("remove called without a preceding next"))?;
        let mut elements = self.elements.borrow_mut();
        if index >= elements.len() {
            return Err(SequenceError::out_of_bounds(index, elements.len()));
        }
        elements.remove(index);
        self.next_index = index;
        Ok(())
    }
}

static_assertions::assert_not_impl_any!(Store<i32>: Send, Sync);
