//! Appendable concatenations of heterogeneous sources.
//!
//! A [`Chain<T>`] holds an ordered list of segments and traverses them one
//! after another. Segments may be:
//!
//! - reusable sources (stores, views, sequences, vectors), replayed in full
//!   on every traversal;
//! - single-use iterators, drained by the first traversal that reaches them
//!   and silently empty afterwards;
//! - nested sources of sources, evaluated only when a traversal reaches them.
//!
//! The segment list may grow while a traversal is in progress; the traversal
//! picks up the new segments when it gets to them.
//!
//! # Examples
//!
//! ```rust
//! use sequins::chain::Chain;
//!
//! let chain = Chain::from_vec(vec!['a', 'b', 'c']);
//! chain.append_iter(vec!['d', 'e', 'f']);
//! chain.append_vec(vec!['g', 'h', 'i']);
//!
//! assert_eq!(chain.to_vec(), vec!['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i']);
//! assert_eq!(chain.to_vec(), vec!['a', 'b', 'c', 'g', 'h', 'i']);
//! ```

mod segment;

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::trace;

use segment::Segment;

use crate::error::SequenceError;
use crate::sequence::Sequence;
use crate::source::cursor::boxed;
use crate::source::{BoxCursor, Cursor, SingleUse, Source};

/// Most chains hold a handful of segments.
type Segments<T> = SmallVec<[Segment<T>; 4]>;

/// An ordered, appendable concatenation of sources.
///
/// Cloning a chain yields another handle onto the same segment list.
pub struct Chain<T> {
    segments: Rc<RefCell<Segments<T>>>,
}

impl<T: 'static> Chain<T> {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segments: Rc::new(RefCell::new(SmallVec::new())),
        }
    }

    /// Creates a chain whose first segment is `source`.
    pub fn from_source<S>(source: S) -> Self
    where
        S: Source<T> + 'static,
    {
        let chain = Self::new();
        chain.append(source);
        chain
    }

    fn push(&self, segment: Segment<T>) -> &Self {
        self.segments.borrow_mut().push(segment);
        self
    }

    /// Appends a reusable source.
    pub fn append<S>(&self, source: S) -> &Self
    where
        S: Source<T> + 'static,
    {
        self.push(Segment::Reusable(Rc::new(source)))
    }

    /// Appends a single-use iterator. Only the first traversal that reaches
    /// it sees its elements.
    pub fn append_iter<I>(&self, iterator: I) -> &Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        self.append_cursor(boxed(iterator.into_iter()))
    }

    /// Appends a single-use cursor, keeping its removal support.
    pub fn append_cursor(&self, cursor: BoxCursor<T>) -> &Self {
        self.push(Segment::Single(SingleUse::new(cursor)))
    }

    /// Appends each source produced by `outer` as a further segment.
    ///
    /// `outer` is not evaluated here: its cursor is opened when a traversal
    /// reaches this position, so anything it would raise surfaces only then.
    pub fn flat_append<S>(&self, outer: &Sequence<S>) -> &Self
    where
        S: Source<T> + 'static,
    {
        let nested = outer.map(|source| Rc::new(source) as Rc<dyn Source<T>>);
        self.push(Segment::Nested(nested))
    }

    /// Number of segments, counting a nested segment once.
    pub fn segment_count(&self) -> usize {
        self.segments.borrow().len()
    }

    /// Opens a cursor over the whole chain.
    pub fn iter(&self) -> BoxCursor<T> {
        Box::new(ChainCursor {
            segments: Rc::clone(&self.segments),
            position: 0,
            current: None,
        })
    }

    /// Collects one traversal.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Number of elements one traversal yields. Drains single-use segments.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns `true` if a traversal yields nothing. Single-use segments are
    /// peeked, not drained.
    pub fn is_empty(&self) -> bool {
        let segments: Vec<Segment<T>> = self.segments.borrow().iter().cloned().collect();
        segments.iter().all(Segment::is_empty)
    }

    /// A sequence that traverses this chain, including segments appended
    /// later.
    pub fn to_sequence(&self) -> Sequence<T> {
        Sequence::from_source(self.clone())
    }
}

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Self {
            segments: Rc::clone(&self.segments),
        }
    }
}

impl<T: 'static> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Chain<T> {
    /// Creates a chain whose first segment is `elements`.
    pub fn from_vec(elements: Vec<T>) -> Self {
        Self::from_source(Sequence::of(elements))
    }

    /// Appends a reusable vector segment.
    pub fn append_vec(&self, elements: Vec<T>) -> &Self {
        self.append(Sequence::of(elements))
    }
}

impl<T: 'static> Source<T> for Chain<T> {
    fn cursor(&self) -> BoxCursor<T> {
        self.iter()
    }
}

impl<T: 'static> IntoIterator for &Chain<T> {
    type Item = T;
    type IntoIter = BoxCursor<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Display + 'static> Display for Chain<T> {
    /// Materializes the current segments eagerly.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("[")?;
        for (index, element) in self.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{element}")?;
        }
        formatter.write_str("]")
    }
}

impl<T: fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Chain")
            .field("segments", &self.segments.borrow().len())
            .finish()
    }
}

impl<T: PartialEq + 'static> PartialEq for Chain<T> {
    /// Compares materialized contents.
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

// =============================================================================
// ChainCursor
// =============================================================================

/// Walks the segment list, opening each segment's cursor only when the
/// previous one is exhausted.
struct ChainCursor<T> {
    segments: Rc<RefCell<Segments<T>>>,
    /// Index of the next segment to open.
    position: usize,
    current: Option<BoxCursor<T>>,
}

impl<T: 'static> Iterator for ChainCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(element) = self.current.as_mut().and_then(Iterator::next) {
                return Some(element);
            }
            // Clone the segment out so no borrow is held while it opens;
            // opening may run user code that appends to this chain.
            let segment = self.segments.borrow().get(self.position).cloned()?;
            trace!(position = self.position, "advancing to chain segment");
            self.position += 1;
            self.current = Some(segment.open());
        }
    }
}

impl<T: 'static> Cursor for ChainCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        self.current.as_mut().map_or(
            Err(SequenceError::illegal_state(
                "remove called without a preceding next",
            )),
            Cursor::remove,
        )
    }
}
