use std::rc::Rc;

use crate::error::SequenceError;
use crate::sequence::Sequence;
use crate::source::{BoxCursor, Cursor, SingleUse, Source};

/// One entry of a chain's segment list.
pub(super) enum Segment<T> {
    /// Replayed in full on every traversal.
    Reusable(Rc<dyn Source<T>>),
    /// Shared by every traversal; drained once.
    Single(SingleUse<T>),
    /// A lazy source of sources, flattened when reached.
    Nested(Sequence<Rc<dyn Source<T>>>),
}

impl<T> Clone for Segment<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Reusable(source) => Self::Reusable(Rc::clone(source)),
            Self::Single(cursor) => Self::Single(cursor.clone()),
            Self::Nested(outer) => Self::Nested(outer.clone()),
        }
    }
}

impl<T: 'static> Segment<T> {
    pub(super) fn open(self) -> BoxCursor<T> {
        match self {
            Self::Reusable(source) => source.cursor(),
            Self::Single(cursor) => Box::new(cursor.open()),
            Self::Nested(outer) => Box::new(NestedCursor {
                outer: outer.iter(),
                current: None,
            }),
        }
    }

    /// Returns `true` if a traversal of this segment would yield nothing,
    /// without draining a single-use segment.
    pub(super) fn is_empty(&self) -> bool {
        match self {
            Self::Reusable(source) => source_is_empty(source.as_ref()),
            Self::Single(cursor) => !cursor.has_next(),
            Self::Nested(outer) => outer.iter().all(|source| source_is_empty(source.as_ref())),
        }
    }
}

fn source_is_empty<T>(source: &dyn Source<T>) -> bool {
    source
        .known_size()
        .map_or_else(|| source.cursor().next().is_none(), |size| size == 0)
}

/// Opens each inner source in turn as the outer cursor produces it.
struct NestedCursor<T> {
    outer: BoxCursor<Rc<dyn Source<T>>>,
    current: Option<BoxCursor<T>>,
}

impl<T> Iterator for NestedCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(element) = self.current.as_mut().and_then(Iterator::next) {
                return Some(element);
            }
            self.current = Some(self.outer.next()?.cursor());
        }
    }
}

impl<T> Cursor for NestedCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        match self.current.as_mut() {
            Some(current) => current.remove(),
            None => Err(SequenceError::illegal_state(
                "remove called without a preceding next",
            )),
        }
    }
}
