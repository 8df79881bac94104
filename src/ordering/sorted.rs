use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::sequence::Sequence;
use crate::source::cursor::boxed;
use crate::source::{BoxCursor, Source};

/// A stably sorted view of a backing source.
///
/// Every query collects the backing elements afresh and sorts them with a
/// stable sort, so equal elements keep their backing order and the view
/// always reflects the source's current contents. [`Sorted::reversed`]
/// reverses that stable output; it does not re-stabilize ties in descending
/// order.
///
/// # Examples
///
/// ```rust
/// use sequins::ordering::Sorted;
/// use sequins::sequence::Sequence;
///
/// let pairs = Sequence::of(vec![(1, 'a'), (2, 'a'), (1, 'b')]);
/// let sorted = Sorted::by_key(pairs, |pair: &(i32, char)| pair.0);
///
/// assert_eq!(sorted.to_vec(), vec![(1, 'a'), (1, 'b'), (2, 'a')]);
/// assert_eq!(sorted.reversed().to_vec(), vec![(2, 'a'), (1, 'b'), (1, 'a')]);
/// ```
pub struct Sorted<T> {
    source: Rc<dyn Source<T>>,
    comparator: Rc<dyn Fn(&T, &T) -> Ordering>,
    descending: bool,
}

impl<T: 'static> Sorted<T> {
    /// Sorts `source` with `comparator`.
    pub fn new<S, C>(source: S, comparator: C) -> Self
    where
        S: Source<T> + 'static,
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Self {
            source: Rc::new(source),
            comparator: Rc::new(comparator),
            descending: false,
        }
    }

    /// Sorts `source` by its natural order.
    pub fn natural<S>(source: S) -> Self
    where
        S: Source<T> + 'static,
        T: Ord,
    {
        Self::new(source, T::cmp)
    }

    /// Sorts `source` by the key `key` extracts.
    pub fn by_key<S, K, F>(source: S, key: F) -> Self
    where
        S: Source<T> + 'static,
        K: Ord,
        F: Fn(&T) -> K + 'static,
    {
        Self::new(source, move |left, right| key(left).cmp(&key(right)))
    }

    /// The same ordering, traversed back to front.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            comparator: Rc::clone(&self.comparator),
            descending: !self.descending,
        }
    }

    /// Collects and sorts the backing elements as they are now.
    pub fn to_vec(&self) -> Vec<T> {
        let mut elements: Vec<T> = self.source.cursor().collect();
        elements.sort_by(|left, right| (self.comparator)(left, right));
        if self.descending {
            elements.reverse();
        }
        elements
    }

    /// Smallest element (largest once reversed).
    pub fn first(&self) -> Option<T> {
        self.to_vec().into_iter().next()
    }

    /// Largest element (smallest once reversed).
    pub fn last(&self) -> Option<T> {
        self.to_vec().pop()
    }

    /// Element at sorted position `index`.
    pub fn at(&self, index: usize) -> Option<T> {
        self.to_vec().into_iter().nth(index)
    }

    /// Number of backing elements.
    pub fn len(&self) -> usize {
        self.source
            .known_size()
            .unwrap_or_else(|| self.source.cursor().count())
    }

    /// Returns `true` if the backing source is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A sequence that sorts on each traversal.
    pub fn to_sequence(&self) -> Sequence<T> {
        Sequence::from_source(self.clone())
    }
}

impl<T> Clone for Sorted<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            comparator: Rc::clone(&self.comparator),
            descending: self.descending,
        }
    }
}

impl<T> fmt::Debug for Sorted<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Sorted")
            .field("descending", &self.descending)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Source<T> for Sorted<T> {
    fn cursor(&self) -> BoxCursor<T> {
        boxed(self.to_vec().into_iter())
    }

    fn known_size(&self) -> Option<usize> {
        self.source.known_size()
    }
}
