//! Replayable wrapper around a single-use iterator.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::source::{BoxCursor, Cursor};

/// State shared by every traversal of a cached sequence.
pub(crate) struct CacheState<T> {
    buffer: Vec<T>,
    source: Option<BoxCursor<T>>,
}

impl<T> CacheState<T> {
    pub(crate) fn new(source: BoxCursor<T>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            buffer: Vec::new(),
            source: Some(source),
        }))
    }
}

/// Replays the buffered prefix, then keeps pulling (and buffering) from the
/// original iterator.
///
/// Several cursors may be open at once: whichever reaches the end of the
/// buffer first pulls the next element and makes it visible to the others.
pub(crate) struct CacheCursor<T> {
    state: Rc<RefCell<CacheState<T>>>,
    index: usize,
}

impl<T> CacheCursor<T> {
    pub(crate) const fn new(state: Rc<RefCell<CacheState<T>>>) -> Self {
        Self { state, index: 0 }
    }
}

impl<T: Clone> Iterator for CacheCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut state = self.state.borrow_mut();
        if let Some(element) = state.buffer.get(self.index) {
            let element = element.clone();
            self.index += 1;
            return Some(element);
        }

        let pulled = state.source.as_mut()?.next();
        match pulled {
            Some(element) => {
                state.buffer.push(element.clone());
                self.index += 1;
                Some(element)
            }
            None => {
                trace!(buffered = state.buffer.len(), "cached source exhausted");
                state.source = None;
                None
            }
        }
    }
}

impl<T: Clone> Cursor for CacheCursor<T> {}
