//! Lazy, restartable sequences.
//!
//! A [`Sequence<T>`] is an immutable description of how to open a cursor.
//! Combinators such as [`Sequence::map`] and [`Sequence::filter`] return new
//! descriptions and evaluate nothing; work happens only when a consumer pulls
//! from a cursor obtained through [`Sequence::iter`] (or `for ... in &seq`).
//!
//! # Restartability
//!
//! Every sequence can be traversed any number of times and each traversal
//! starts from the beginning, with two explicit exceptions:
//!
//! - [`Sequence::once`] wraps an already-started iterator; the first
//!   traversal drains it and later traversals are empty.
//! - [`Sequence::cache`] also wraps a single-use iterator, but remembers
//!   what it has pulled so later traversals replay it.
//!
//! # Mutation
//!
//! A sequence built with [`Sequence::from_source`] over a mutable store keeps
//! a live handle to it. [`Sequence::remove_if`] and [`Sequence::clear`]
//! remove through the cursor chain and reach the store as long as every step
//! maps elements one-to-one; otherwise they fail with
//! [`SequenceError::UnsupportedMutation`].
//!
//! # Examples
//!
//! ```rust
//! use sequins::sequence::Sequence;
//!
//! let collatz = Sequence::recurse(27_u64, |&n| if n % 2 == 0 { n / 2 } else { 3 * n + 1 })
//!     .ending_at(1);
//! assert_eq!(collatz.count(), 112);
//! assert_eq!(collatz.last(), Some(1));
//!
//! let squares = Sequence::range(1, 6).map(|n: i32| n * n).filter(|n| n % 2 == 1);
//! assert_eq!(squares.to_vec(), vec![1, 9, 25]);
//! assert_eq!(squares.to_string(), "[1, 9, 25]");
//! ```

mod cache;
mod cursors;

use std::collections::HashSet;
use std::fmt::{self, Display};
use std::hash::Hash;
use std::ops::Range;
use std::rc::Rc;

use cache::{CacheCursor, CacheState};
use cursors::{
    BatchByCursor, BatchCursor, ConcatCursor, DistinctCursor, FlatMapCursor, GenerateCursor,
    InspectCursor, LimitCursor, MapCursor, RecurseCursor, SkipCursor, StepCursor, UntilCursor,
};

use crate::error::SequenceError;
use crate::source::cursor::{boxed, empty as empty_cursor};
use crate::source::{BoxCursor, Cursor, FilterCursor, SingleUse, SliceCursor, Source, Store};

type Factory<T> = Rc<dyn Fn() -> BoxCursor<T>>;
type Predicate<T> = Rc<dyn Fn(&T) -> bool>;
type SizeQuery = Rc<dyn Fn() -> Option<usize>>;
type EmptyQuery = Rc<dyn Fn() -> bool>;

/// How a sequence opens its cursor.
enum Kind<T> {
    /// An upstream iteration factory, possibly with transform steps already
    /// folded into it.
    Factory(Factory<T>),
    /// An upstream factory plus one predicate. Kept separate so that chained
    /// filters collapse into a single AND-ed predicate.
    Filtered {
        upstream: Factory<T>,
        predicate: Predicate<T>,
    },
}

impl<T> Clone for Kind<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Factory(factory) => Self::Factory(Rc::clone(factory)),
            Self::Filtered {
                upstream,
                predicate,
            } => Self::Filtered {
                upstream: Rc::clone(upstream),
                predicate: Rc::clone(predicate),
            },
        }
    }
}

/// A lazy, restartable, composable sequence of `T`.
///
/// Cloning a sequence is cheap: it clones a handful of `Rc`s, never the
/// elements.
pub struct Sequence<T> {
    kind: Kind<T>,
    size: Option<SizeQuery>,
    /// Answers emptiness without pulling from a single-use source.
    emptiness: Option<EmptyQuery>,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            size: self.size.clone(),
            emptiness: self.emptiness.clone(),
        }
    }
}

impl<T> fmt::Debug for Sequence<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            Kind::Factory(_) => "factory",
            Kind::Filtered { .. } => "filtered",
        };
        formatter
            .debug_struct("Sequence")
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Construction
// =============================================================================

impl<T: 'static> Sequence<T> {
    fn build<F>(factory: F, size: Option<SizeQuery>) -> Self
    where
        F: Fn() -> BoxCursor<T> + 'static,
    {
        Self {
            kind: Kind::Factory(Rc::new(factory)),
            size,
            emptiness: None,
        }
    }

    fn with_emptiness(mut self, emptiness: Option<EmptyQuery>) -> Self {
        self.emptiness = emptiness;
        self
    }

    /// Creates a sequence from a cursor factory. The factory is called once
    /// per traversal.
    pub fn from_cursor_fn<F>(factory: F) -> Self
    where
        F: Fn() -> BoxCursor<T> + 'static,
    {
        Self::build(factory, None)
    }

    /// Creates a sequence from an iteration factory. The factory is called
    /// once per traversal, so anything it captures must allow restarting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequins::sequence::Sequence;
    ///
    /// let letters = Sequence::from_fn(|| "abc".chars());
    /// assert_eq!(letters.to_vec(), vec!['a', 'b', 'c']);
    /// assert_eq!(letters.to_vec(), vec!['a', 'b', 'c']);
    /// ```
    pub fn from_fn<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::from_cursor_fn(move || boxed(factory().into_iter()))
    }

    /// The empty sequence.
    pub fn empty() -> Self {
        Self::build(empty_cursor::<T>, Some(Rc::new(|| Some(0))))
    }

    /// Creates a sequence directly over `source`, keeping a live handle to it.
    ///
    /// Every traversal opens a fresh cursor on the source, so the sequence
    /// always reflects the source's current contents, and cursor removals
    /// reach the source.
    pub fn from_source<S>(source: S) -> Self
    where
        S: Source<T> + 'static,
    {
        let source = Rc::new(source);
        let sized = Rc::clone(&source);
        Self::build(
            move || source.cursor(),
            Some(Rc::new(move || sized.known_size())),
        )
    }

    /// Wraps an already-started iterator as a single-use sequence.
    ///
    /// The first traversal drains the iterator; every later traversal is
    /// empty. This is not an error. [`Sequence::is_empty`] looks ahead
    /// without consuming anything.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequins::sequence::Sequence;
    ///
    /// let once = Sequence::once(vec![1, 2, 3]);
    /// assert!(!once.is_empty());
    /// assert_eq!(once.to_vec(), vec![1, 2, 3]);
    /// assert!(once.to_vec().is_empty());
    /// ```
    pub fn once<I>(iterator: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::once_cursor(boxed(iterator.into_iter()))
    }

    /// Like [`Sequence::once`], but keeps the cursor's own removal support.
    pub fn once_cursor(cursor: BoxCursor<T>) -> Self {
        let shared = SingleUse::new(cursor);
        let lookahead = shared.clone();
        Self::from_cursor_fn(move || Box::new(shared.open()))
            .with_emptiness(Some(Rc::new(move || !lookahead.has_next())))
    }

    /// Generates an infinite sequence by calling `supplier` for every pull.
    ///
    /// Bound the traversal with [`Sequence::limit`] or a stopping predicate.
    pub fn generate<F>(supplier: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let supplier: Rc<dyn Fn() -> T> = Rc::new(supplier);
        Self::from_cursor_fn(move || {
            Box::new(GenerateCursor {
                supplier: Rc::clone(&supplier),
            })
        })
    }

    // =========================================================================
    // Combinators
    // =========================================================================

    /// Returns a factory opening this sequence's cursor.
    fn factory(&self) -> Factory<T> {
        match &self.kind {
            Kind::Factory(factory) => Rc::clone(factory),
            Kind::Filtered { .. } => {
                let this = self.clone();
                Rc::new(move || this.iter())
            }
        }
    }

    /// Transforms each element with `mapper`, which runs only when the
    /// element is pulled.
    pub fn map<U, F>(&self, mapper: F) -> Sequence<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        let upstream = self.factory();
        let mapper: Rc<dyn Fn(T) -> U> = Rc::new(mapper);
        Sequence::build(
            move || {
                Box::new(MapCursor {
                    inner: upstream(),
                    mapper: Rc::clone(&mapper),
                })
            },
            self.size.clone(),
        )
        .with_emptiness(self.emptiness.clone())
    }

    /// Keeps only elements satisfying `predicate`.
    ///
    /// Filtering an already filtered sequence combines both predicates with
    /// logical AND over the original upstream.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        let (upstream, predicate) = match &self.kind {
            Kind::Factory(factory) => {
                let predicate: Predicate<T> = Rc::new(predicate);
                (Rc::clone(factory), predicate)
            }
            Kind::Filtered {
                upstream,
                predicate: existing,
            } => {
                let existing = Rc::clone(existing);
                let combined: Predicate<T> =
                    Rc::new(move |element: &T| existing(element) && predicate(element));
                (Rc::clone(upstream), combined)
            }
        };
        Self {
            kind: Kind::Filtered {
                upstream,
                predicate,
            },
            size: None,
            emptiness: None,
        }
    }

    /// Maps each element to an iterable and flattens the results.
    pub fn flat_map<U, I, F>(&self, mapper: F) -> Sequence<U>
    where
        U: 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: 'static,
        F: Fn(T) -> I + 'static,
    {
        let upstream = self.factory();
        let mapper: Rc<dyn Fn(T) -> Box<dyn Iterator<Item = U>>> =
            Rc::new(move |element: T| -> Box<dyn Iterator<Item = U>> {
                Box::new(mapper(element).into_iter())
            });
        Sequence::from_cursor_fn(move || {
            Box::new(FlatMapCursor {
                outer: upstream(),
                mapper: Rc::clone(&mapper),
                current: None,
            })
        })
    }

    /// Flattens a sequence of iterables.
    pub fn flatten<U>(&self) -> Sequence<U>
    where
        U: 'static,
        T: IntoIterator<Item = U>,
        T::IntoIter: 'static,
    {
        self.flat_map(|element| element)
    }

    /// Groups consecutive elements into batches of `size`; the last batch may
    /// be shorter.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn batch(&self, size: usize) -> Sequence<Vec<T>> {
        assert!(size > 0, "batch size must be positive");
        let upstream = self.factory();
        Sequence::from_cursor_fn(move || {
            Box::new(BatchCursor {
                inner: upstream(),
                size,
            })
        })
    }

    /// Groups consecutive elements, starting a new batch between two
    /// adjacent elements whenever `split(previous, next)` holds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequins::sequence::Sequence;
    ///
    /// let runs = Sequence::of(vec![1, 2, 3, 1, 2, 0]).batch_by(|previous, next| next < previous);
    /// assert_eq!(runs.to_vec(), vec![vec![1, 2, 3], vec![1, 2], vec![0]]);
    /// ```
    pub fn batch_by<P>(&self, split: P) -> Sequence<Vec<T>>
    where
        P: Fn(&T, &T) -> bool + 'static,
    {
        let upstream = self.factory();
        let split: Rc<dyn Fn(&T, &T) -> bool> = Rc::new(split);
        Sequence::from_cursor_fn(move || {
            Box::new(BatchByCursor {
                inner: upstream(),
                split: Rc::clone(&split),
                pending: None,
            })
        })
    }

    /// Yields at most `count` elements.
    pub fn limit(&self, count: usize) -> Self {
        let upstream = self.factory();
        let size = self.size.clone().map(|size| -> SizeQuery {
            Rc::new(move || size().map(|known| known.min(count)))
        });
        Self::build(
            move || {
                Box::new(LimitCursor {
                    inner: upstream(),
                    remaining: count,
                })
            },
            size,
        )
        .with_emptiness(if count == 0 {
            Some(Rc::new(|| true))
        } else {
            self.emptiness.clone()
        })
    }

    /// Skips the first `count` elements.
    pub fn skip(&self, count: usize) -> Self {
        let upstream = self.factory();
        let size = self.size.clone().map(|size| -> SizeQuery {
            Rc::new(move || size().map(|known| known.saturating_sub(count)))
        });
        Self::build(
            move || {
                Box::new(SkipCursor {
                    inner: upstream(),
                    to_skip: count,
                    yielded: false,
                })
            },
            size,
        )
    }

    /// Yields every `step`-th element, starting with the first.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero.
    pub fn step(&self, step: usize) -> Self {
        assert!(step > 0, "step must be positive");
        let upstream = self.factory();
        Self::from_cursor_fn(move || {
            Box::new(StepCursor {
                inner: upstream(),
                step,
                started: false,
                yielded: false,
            })
        })
    }

    fn terminated<P>(&self, terminal: P, inclusive: bool) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        let upstream = self.factory();
        let terminal: Predicate<T> = Rc::new(terminal);
        Self::from_cursor_fn(move || {
            Box::new(UntilCursor {
                inner: upstream(),
                terminal: Rc::clone(&terminal),
                inclusive,
                finished: false,
                overran: false,
            })
        })
    }

    /// Stops before the first element matching `terminal`.
    pub fn until_matching<P>(&self, terminal: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        self.terminated(terminal, false)
    }

    /// Stops after the first element matching `terminal`, yielding it.
    pub fn ending_at_matching<P>(&self, terminal: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        self.terminated(terminal, true)
    }

    /// Stops before the first element equal to `terminal`.
    pub fn until(&self, terminal: T) -> Self
    where
        T: PartialEq,
    {
        self.terminated(move |element| *element == terminal, false)
    }

    /// Stops after the first element equal to `terminal`, yielding it.
    pub fn ending_at(&self, terminal: T) -> Self
    where
        T: PartialEq,
    {
        self.terminated(move |element| *element == terminal, true)
    }

    /// Drops elements already seen earlier in the same traversal.
    pub fn distinct(&self) -> Self
    where
        T: Eq + Hash + Clone,
    {
        let upstream = self.factory();
        Self::from_cursor_fn(move || {
            Box::new(DistinctCursor {
                inner: upstream(),
                seen: HashSet::new(),
                yielded: false,
            })
        })
    }

    /// Runs `action` on each element as it is pulled.
    pub fn inspect<F>(&self, action: F) -> Self
    where
        F: Fn(&T) + 'static,
    {
        let upstream = self.factory();
        let action: Rc<dyn Fn(&T)> = Rc::new(action);
        Self::build(
            move || {
                Box::new(InspectCursor {
                    inner: upstream(),
                    action: Rc::clone(&action),
                })
            },
            self.size.clone(),
        )
        .with_emptiness(self.emptiness.clone())
    }

    /// Lazily concatenates `other` after this sequence. `other`'s cursor is
    /// opened only once this one is exhausted.
    pub fn append(&self, other: &Self) -> Self {
        let first = self.factory();
        let second = other.factory();
        let size = match (&self.size, &other.size) {
            (Some(left), Some(right)) => {
                let (left, right) = (Rc::clone(left), Rc::clone(right));
                Some(Rc::new(move || Some(left()? + right()?)) as SizeQuery)
            }
            _ => None,
        };
        Self::build(
            move || {
                Box::new(ConcatCursor {
                    first: Some(first()),
                    second: Rc::clone(&second),
                    current: None,
                })
            },
            size,
        )
        .with_emptiness(match (&self.emptiness, &other.emptiness) {
            (Some(left), Some(right)) => {
                let (left, right) = (Rc::clone(left), Rc::clone(right));
                Some(Rc::new(move || left() && right()) as EmptyQuery)
            }
            _ => None,
        })
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Opens a new cursor.
    pub fn iter(&self) -> BoxCursor<T> {
        match &self.kind {
            Kind::Factory(factory) => factory(),
            Kind::Filtered {
                upstream,
                predicate,
            } => Box::new(FilterCursor::new(upstream(), Rc::clone(predicate))),
        }
    }

    /// Collects one traversal into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Collects one traversal into a new [`Store`].
    pub fn to_store(&self) -> Store<T> {
        self.iter().collect()
    }

    /// First element, if any.
    pub fn first(&self) -> Option<T> {
        self.iter().next()
    }

    /// Last element, if any. Never returns on an unbounded sequence.
    pub fn last(&self) -> Option<T> {
        self.iter().last()
    }

    /// Element at `index`, if the sequence is that long.
    pub fn at(&self, index: usize) -> Option<T> {
        self.iter().nth(index)
    }

    /// Number of elements, answered without traversal when the size is
    /// known.
    pub fn count(&self) -> usize {
        self.size
            .as_ref()
            .and_then(|size| size())
            .unwrap_or_else(|| self.iter().count())
    }

    /// Returns `true` if a traversal yields nothing.
    ///
    /// Answered from the known size when there is one. A single-use source
    /// reached through one-to-one steps is peeked rather than drained;
    /// anything else is answered by pulling the first element.
    pub fn is_empty(&self) -> bool {
        if let Some(size) = self.size.as_ref().and_then(|size| size()) {
            return size == 0;
        }
        self.emptiness
            .as_ref()
            .map_or_else(|| self.first().is_none(), |empty| empty())
    }

    /// Returns `true` if some element equals `element`.
    pub fn contains(&self, element: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|candidate| candidate == *element)
    }

    /// Left fold over one traversal.
    pub fn fold<B, F>(&self, init: B, function: F) -> B
    where
        F: FnMut(B, T) -> B,
    {
        self.iter().fold(init, function)
    }

    /// Folds using the first element as the initial accumulator.
    pub fn reduce<F>(&self, function: F) -> Option<T>
    where
        F: FnMut(T, T) -> T,
    {
        self.iter().reduce(function)
    }

    /// Runs `action` on every element of one traversal.
    pub fn for_each<F>(&self, action: F)
    where
        F: FnMut(T),
    {
        self.iter().for_each(action);
    }

    /// Renders the elements separated by `separator`.
    pub fn join(&self, separator: &str) -> String
    where
        T: Display,
    {
        let mut rendered = String::new();
        for (index, element) in self.iter().enumerate() {
            if index > 0 {
                rendered.push_str(separator);
            }
            rendered.push_str(&element.to_string());
        }
        rendered
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Removes every element matching `predicate` from the backing store,
    /// returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::UnsupportedMutation`] when the sequence is not
    /// backed by a mutable store through one-to-one steps. Elements removed
    /// before the failing removal stay removed.
    pub fn remove_if<P>(&self, mut predicate: P) -> Result<usize, SequenceError>
    where
        P: FnMut(&T) -> bool,
    {
        let mut cursor = self.iter();
        let mut removed = 0;
        while let Some(element) = cursor.next() {
            if predicate(&element) {
                cursor.remove()?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Removes every element of this sequence from the backing store.
    ///
    /// # Errors
    ///
    /// Same as [`Sequence::remove_if`].
    pub fn clear(&self) -> Result<(), SequenceError> {
        self.remove_if(|_| true).map(|_| ())
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// Creates a sequence over a fixed vector of elements.
    pub fn of(elements: Vec<T>) -> Self {
        let elements: Rc<[T]> = Rc::from(elements);
        let length = elements.len();
        Self::build(
            move || Box::new(SliceCursor::new(Rc::clone(&elements))),
            Some(Rc::new(move || Some(length))),
        )
    }

    /// Wraps a single-use iterator so that every traversal sees all of its
    /// elements.
    ///
    /// Elements are buffered as the first traversal pulls them. A later
    /// traversal replays the buffer and then keeps pulling from the original
    /// iterator, so partially completed traversals interleave correctly.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequins::sequence::Sequence;
    ///
    /// let cached = Sequence::cache(vec![1, 2, 3]);
    /// assert_eq!(cached.first(), Some(1));
    /// assert_eq!(cached.to_vec(), vec![1, 2, 3]);
    /// assert_eq!(cached.to_vec(), vec![1, 2, 3]);
    /// ```
    pub fn cache<I>(iterator: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let state = CacheState::new(boxed(iterator.into_iter()));
        Self::from_cursor_fn(move || Box::new(CacheCursor::new(Rc::clone(&state))))
    }

    /// Lazily generates `seed`, `step(&seed)`, `step(&step(&seed))`, ...
    ///
    /// The result is infinite and restartable: each traversal starts again
    /// from `seed`, and `step` runs only when the next element is pulled.
    /// Bound it with [`Sequence::limit`], [`Sequence::until`] or
    /// [`Sequence::ending_at`]; fully consuming it otherwise never returns.
    pub fn recurse<F>(seed: T, step: F) -> Self
    where
        F: Fn(&T) -> T + 'static,
    {
        let step: Rc<dyn Fn(&T) -> T> = Rc::new(step);
        Self::from_cursor_fn(move || {
            Box::new(RecurseCursor {
                seed: Some(seed.clone()),
                previous: None,
                step: Rc::clone(&step),
            })
        })
    }

    /// Repeats `value` forever.
    pub fn repeat(value: T) -> Self {
        Self::generate(move || value.clone())
    }

    /// The half-open range `start..end`.
    pub fn range(start: T, end: T) -> Self
    where
        Range<T>: Iterator<Item = T>,
    {
        let range = start..end;
        let length = range.clone().count();
        Self::build(
            move || boxed(range.clone()),
            Some(Rc::new(move || Some(length))),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T: 'static> Source<T> for Sequence<T> {
    fn cursor(&self) -> BoxCursor<T> {
        self.iter()
    }

    fn known_size(&self) -> Option<usize> {
        self.size.as_ref().and_then(|size| size())
    }
}

impl<T: 'static> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = BoxCursor<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: 'static> IntoIterator for &Sequence<T> {
    type Item = T;
    type IntoIter = BoxCursor<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + 'static> From<Vec<T>> for Sequence<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::of(elements)
    }
}

impl<T: Clone + 'static> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter.into_iter().collect())
    }
}

impl<T: Display + 'static> Display for Sequence<T> {
    /// Renders `[a, b, c]`. Rendering traverses the sequence, so it drains a
    /// single-use sequence.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[{}]", self.join(", "))
    }
}

static_assertions::assert_not_impl_any!(Sequence<i32>: Send, Sync);
