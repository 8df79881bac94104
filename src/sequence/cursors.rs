//! The stateful cursors behind each sequence combinator.
//!
//! Every combinator is a plain struct wrapping an inner cursor: pull one
//! element from upstream, transform it, hand it on. Nothing is evaluated
//! ahead of the consumer's pull.
//!
//! Cursors that hand on upstream elements unchanged or one-for-one (map,
//! limit, skip, step, distinct, inspect, until) delegate [`Cursor::remove`]
//! upstream. Those that discard upstream elements (skip, step, distinct,
//! until) only do so while upstream's last element is the one they yielded,
//! and report [`SequenceError::IllegalState`] otherwise. Cursors that merge
//! or invent elements (flat-map, batching, recursion, generation) keep the
//! unsupported default.

use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::SequenceError;
use crate::source::{BoxCursor, Cursor};

// =============================================================================
// Map
// =============================================================================

pub(crate) struct MapCursor<T, U> {
    pub(crate) inner: BoxCursor<T>,
    pub(crate) mapper: Rc<dyn Fn(T) -> U>,
}

impl<T, U> Iterator for MapCursor<T, U> {
    type Item = U;

    #[inline]
    fn next(&mut self) -> Option<U> {
        self.inner.next().map(|element| (self.mapper)(element))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, U> Cursor for MapCursor<T, U> {
    #[inline]
    fn remove(&mut self) -> Result<(), SequenceError> {
        self.inner.remove()
    }
}

// =============================================================================
// FlatMap
// =============================================================================

pub(crate) struct FlatMapCursor<T, U> {
    pub(crate) outer: BoxCursor<T>,
    pub(crate) mapper: Rc<dyn Fn(T) -> Box<dyn Iterator<Item = U>>>,
    pub(crate) current: Option<Box<dyn Iterator<Item = U>>>,
}

impl<T, U> Iterator for FlatMapCursor<T, U> {
    type Item = U;

    fn next(&mut self) -> Option<U> {
        loop {
            if let Some(element) = self.current.as_mut().and_then(Iterator::next) {
                return Some(element);
            }
            let outer = self.outer.next()?;
            self.current = Some((self.mapper)(outer));
        }
    }
}

impl<T, U> Cursor for FlatMapCursor<T, U> {}

// =============================================================================
// Batching
// =============================================================================

pub(crate) struct BatchCursor<T> {
    pub(crate) inner: BoxCursor<T>,
    pub(crate) size: usize,
}

impl<T> Iterator for BatchCursor<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        let mut batch = Vec::with_capacity(self.size);
        while batch.len() < self.size {
            match self.inner.next() {
                Some(element) => batch.push(element),
                None => break,
            }
        }
        if batch.is_empty() { None } else { Some(batch) }
    }
}

impl<T> Cursor for BatchCursor<T> {}

/// Splits between two adjacent elements whenever `split(previous, next)`
/// holds.
pub(crate) struct BatchByCursor<T> {
    pub(crate) inner: BoxCursor<T>,
    pub(crate) split: Rc<dyn Fn(&T, &T) -> bool>,
    pub(crate) pending: Option<T>,
}

impl<T> Iterator for BatchByCursor<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        let first = self.pending.take().or_else(|| self.inner.next())?;
        let mut batch = vec![first];
        while let Some(element) = self.inner.next() {
            if batch
                .last()
                .is_some_and(|previous| (self.split)(previous, &element))
            {
                self.pending = Some(element);
                break;
            }
            batch.push(element);
        }
        Some(batch)
    }
}

impl<T> Cursor for BatchByCursor<T> {}

// =============================================================================
// Limit / Skip / Step
// =============================================================================

pub(crate) struct LimitCursor<T> {
    pub(crate) inner: BoxCursor<T>,
    pub(crate) remaining: usize,
}

impl<T> Iterator for LimitCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.inner.size_hint();
        let upper = upper.map_or(self.remaining, |upper| upper.min(self.remaining));
        (lower.min(self.remaining), Some(upper))
    }
}

impl<T> Cursor for LimitCursor<T> {
    #[inline]
    fn remove(&mut self) -> Result<(), SequenceError> {
        self.inner.remove()
    }
}

const fn not_yielded() -> SequenceError {
    SequenceError::illegal_state("upstream moved past the last element handed out")
}

pub(crate) struct SkipCursor<T> {
    pub(crate) inner: BoxCursor<T>,
    pub(crate) to_skip: usize,
    pub(crate) yielded: bool,
}

impl<T> Iterator for SkipCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.yielded = false;
        while self.to_skip > 0 {
            self.to_skip -= 1;
            self.inner.next()?;
        }
        let element = self.inner.next()?;
        self.yielded = true;
        Some(element)
    }
}

impl<T> Cursor for SkipCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        if !self.yielded {
            return Err(not_yielded());
        }
        self.yielded = false;
        self.inner.remove()
    }
}

/// Yields elements at positions `0, step, 2 * step, ...`.
pub(crate) struct StepCursor<T> {
    pub(crate) inner: BoxCursor<T>,
    pub(crate) step: usize,
    pub(crate) started: bool,
    pub(crate) yielded: bool,
}

impl<T> Iterator for StepCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.yielded = false;
        if self.started {
            for _ in 1..self.step {
                self.inner.next()?;
            }
        }
        self.started = true;
        let element = self.inner.next()?;
        self.yielded = true;
        Some(element)
    }
}

impl<T> Cursor for StepCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        if !self.yielded {
            return Err(not_yielded());
        }
        self.yielded = false;
        self.inner.remove()
    }
}

// =============================================================================
// Until / EndingAt
// =============================================================================

/// Stops at the first element matching `terminal`; `inclusive` decides
/// whether that element is yielded.
pub(crate) struct UntilCursor<T> {
    pub(crate) inner: BoxCursor<T>,
    pub(crate) terminal: Rc<dyn Fn(&T) -> bool>,
    pub(crate) inclusive: bool,
    pub(crate) finished: bool,
    /// Set when upstream has moved past the last element handed out.
    pub(crate) overran: bool,
}

impl<T> Iterator for UntilCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.finished {
            return None;
        }
        let element = self.inner.next()?;
        if (self.terminal)(&element) {
            self.finished = true;
            if !self.inclusive {
                self.overran = true;
                return None;
            }
        }
        Some(element)
    }
}

impl<T> Cursor for UntilCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        if self.overran {
            return Err(SequenceError::illegal_state(
                "cursor already consumed the terminal element",
            ));
        }
        self.inner.remove()
    }
}

// =============================================================================
// Distinct / Inspect
// =============================================================================

pub(crate) struct DistinctCursor<T> {
    pub(crate) inner: BoxCursor<T>,
    pub(crate) seen: HashSet<T>,
    pub(crate) yielded: bool,
}

impl<T: Eq + Hash + Clone> Iterator for DistinctCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.yielded = false;
        loop {
            let element = self.inner.next()?;
            if self.seen.insert(element.clone()) {
                self.yielded = true;
                return Some(element);
            }
        }
    }
}

impl<T: Eq + Hash + Clone> Cursor for DistinctCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        if !self.yielded {
            return Err(not_yielded());
        }
        self.yielded = false;
        self.inner.remove()
    }
}

pub(crate) struct InspectCursor<T> {
    pub(crate) inner: BoxCursor<T>,
    pub(crate) action: Rc<dyn Fn(&T)>,
}

impl<T> Iterator for InspectCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let element = self.inner.next()?;
        (self.action)(&element);
        Some(element)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> Cursor for InspectCursor<T> {
    #[inline]
    fn remove(&mut self) -> Result<(), SequenceError> {
        self.inner.remove()
    }
}

// =============================================================================
// Generators
// =============================================================================

/// Yields `seed`, `step(seed)`, `step(step(seed))`, ... without ever
/// computing an element before it is pulled.
pub(crate) struct RecurseCursor<T> {
    pub(crate) seed: Option<T>,
    pub(crate) previous: Option<T>,
    pub(crate) step: Rc<dyn Fn(&T) -> T>,
}

impl<T: Clone> Iterator for RecurseCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let element = match self.seed.take() {
            Some(seed) => seed,
            None => (self.step)(self.previous.as_ref()?),
        };
        self.previous = Some(element.clone());
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<T: Clone> Cursor for RecurseCursor<T> {}

pub(crate) struct GenerateCursor<T> {
    pub(crate) supplier: Rc<dyn Fn() -> T>,
}

impl<T> Iterator for GenerateCursor<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        Some((self.supplier)())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<T> Cursor for GenerateCursor<T> {}

// =============================================================================
// Concat
// =============================================================================

/// Drains `first`, then opens and drains `second`.
pub(crate) struct ConcatCursor<T> {
    pub(crate) first: Option<BoxCursor<T>>,
    pub(crate) second: Rc<dyn Fn() -> BoxCursor<T>>,
    pub(crate) current: Option<BoxCursor<T>>,
}

impl<T> Iterator for ConcatCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if let Some(first) = self.first.as_mut() {
            if let Some(element) = first.next() {
                return Some(element);
            }
            self.first = None;
            self.current = Some((self.second)());
        }
        self.current.as_mut()?.next()
    }
}

impl<T> Cursor for ConcatCursor<T> {
    fn remove(&mut self) -> Result<(), SequenceError> {
        match (self.first.as_mut(), self.current.as_mut()) {
            (Some(first), _) => first.remove(),
            (None, Some(current)) => current.remove(),
            (None, None) => Err(SequenceError::illegal_state(
                "remove called without a preceding next",
            )),
        }
    }
}
