use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::permutation::fisher_yates;
use crate::control::Memo;
use crate::sequence::Sequence;
use crate::source::{BoxCursor, SliceCursor, Source};

// =============================================================================
// Shuffled
// =============================================================================

/// A freshly shuffled view of a backing source on every traversal.
///
/// The backing elements are copied into a buffer once, on first traversal.
/// Each traversal then shuffles that buffer in place with a shared
/// generator. Because the generator's state advances, repeated traversals
/// yield different permutations; handing the same generator to several
/// `Shuffled` values makes them draw from one stream.
///
/// # Examples
///
/// ```rust
/// use sequins::ordering::Shuffled;
/// use sequins::sequence::Sequence;
///
/// let shuffled = Shuffled::seeded(Sequence::of(vec![1, 2, 3, 4]), 42);
/// let mut once = shuffled.to_vec();
/// once.sort_unstable();
/// assert_eq!(once, vec![1, 2, 3, 4]);
/// ```
pub struct Shuffled<T, R = ChaCha8Rng> {
    buffer: Rc<Memo<Vec<T>>>,
    rng: Rc<RefCell<R>>,
}

impl<T: Clone + 'static, R: RngCore + 'static> Shuffled<T, R> {
    /// Shuffles `source` with the shared generator `rng`.
    pub fn new<S>(source: S, rng: Rc<RefCell<R>>) -> Self
    where
        S: Source<T> + 'static,
    {
        let initializer: Box<dyn FnOnce() -> Vec<T>> =
            Box::new(move || source.cursor().collect());
        Self {
            buffer: Rc::new(Memo::new(initializer)),
            rng,
        }
    }

    /// The shared generator.
    #[inline]
    pub const fn rng(&self) -> &Rc<RefCell<R>> {
        &self.rng
    }

    /// Draws the next permutation and returns it.
    pub fn to_vec(&self) -> Vec<T> {
        let mut buffer = self.buffer.force_mut();
        fisher_yates(buffer.as_mut_slice(), &mut *self.rng.borrow_mut());
        debug!(length = buffer.len(), "drew a fresh permutation");
        buffer.clone()
    }

    /// A sequence that draws a fresh permutation on each traversal.
    pub fn to_sequence(&self) -> Sequence<T> {
        Sequence::from_source(self.clone())
    }
}

impl<T: Clone + 'static> Shuffled<T> {
    /// Shuffles `source` with a private generator seeded with `seed`.
    pub fn seeded<S>(source: S, seed: u64) -> Self
    where
        S: Source<T> + 'static,
    {
        Self::new(source, Rc::new(RefCell::new(ChaCha8Rng::seed_from_u64(seed))))
    }

    /// Shuffles `source` with a private generator seeded from the operating
    /// system.
    pub fn from_entropy<S>(source: S) -> Self
    where
        S: Source<T> + 'static,
    {
        Self::new(source, Rc::new(RefCell::new(ChaCha8Rng::from_entropy())))
    }
}

impl<T, R> Clone for Shuffled<T, R> {
    fn clone(&self) -> Self {
        Self {
            buffer: Rc::clone(&self.buffer),
            rng: Rc::clone(&self.rng),
        }
    }
}

impl<T, R> fmt::Debug for Shuffled<T, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Shuffled").finish_non_exhaustive()
    }
}

impl<T: Clone + 'static, R: RngCore + 'static> Source<T> for Shuffled<T, R> {
    fn cursor(&self) -> BoxCursor<T> {
        Box::new(SliceCursor::new(Rc::from(self.to_vec())))
    }

    fn known_size(&self) -> Option<usize> {
        self.buffer.is_ready().then(|| self.buffer.force().len())
    }
}

// =============================================================================
// StableShuffled
// =============================================================================

/// A shuffled view whose permutation is computed once and then fixed.
///
/// On first use the backing elements are collected and shuffled with a
/// generator of type `R` seeded with the caller's seed. That order is cached
/// for the life of the value (and its clones): every traversal and every
/// positional query is served from it, so results are repeatable for a
/// fixed seed.
///
/// # Examples
///
/// ```rust
/// use sequins::ordering::StableShuffled;
/// use sequins::sequence::Sequence;
///
/// let stable: StableShuffled<i32> = StableShuffled::new(Sequence::range(0, 10), 17);
/// let order = stable.to_vec();
/// assert_eq!(stable.to_vec(), order);
/// assert_eq!(stable.first(), order.first().copied());
/// assert_eq!(stable.at(5), Some(order[5]));
/// ```
pub struct StableShuffled<T, R = ChaCha8Rng> {
    seed: u64,
    order: Rc<Memo<Rc<[T]>>>,
    _generator: PhantomData<fn() -> R>,
}

impl<T: Clone + 'static, R: RngCore + SeedableRng + 'static> StableShuffled<T, R> {
    /// Fixes a permutation of `source` derived from `seed`. Nothing is read
    /// from `source` until first use.
    pub fn new<S>(source: S, seed: u64) -> Self
    where
        S: Source<T> + 'static,
    {
        let initializer: Box<dyn FnOnce() -> Rc<[T]>> = Box::new(move || {
            let mut elements: Vec<T> = source.cursor().collect();
            fisher_yates(&mut elements, &mut R::seed_from_u64(seed));
            debug!(seed, length = elements.len(), "fixed stable permutation");
            Rc::from(elements)
        });
        Self {
            seed,
            order: Rc::new(Memo::new(initializer)),
            _generator: PhantomData,
        }
    }

    /// The seed the permutation derives from.
    #[inline]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    fn order(&self) -> Rc<[T]> {
        Rc::clone(&*self.order.force())
    }

    /// The fixed permutation.
    pub fn to_vec(&self) -> Vec<T> {
        self.order().to_vec()
    }

    /// First element of the fixed permutation.
    pub fn first(&self) -> Option<T> {
        self.order().first().cloned()
    }

    /// Last element of the fixed permutation.
    pub fn last(&self) -> Option<T> {
        self.order().last().cloned()
    }

    /// Element at `index` in the fixed permutation.
    pub fn at(&self, index: usize) -> Option<T> {
        self.order().get(index).cloned()
    }

    /// Number of elements in the fixed permutation.
    pub fn len(&self) -> usize {
        self.order().len()
    }

    /// Returns `true` if the permutation is empty.
    pub fn is_empty(&self) -> bool {
        self.order().is_empty()
    }

    /// A sequence replaying the fixed permutation.
    pub fn to_sequence(&self) -> Sequence<T> {
        Sequence::from_source(self.clone())
    }
}

impl<T, R> Clone for StableShuffled<T, R> {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            order: Rc::clone(&self.order),
            _generator: PhantomData,
        }
    }
}

impl<T, R> fmt::Debug for StableShuffled<T, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StableShuffled")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static, R: RngCore + SeedableRng + 'static> Source<T> for StableShuffled<T, R> {
    fn cursor(&self) -> BoxCursor<T> {
        Box::new(SliceCursor::new(self.order()))
    }

    fn known_size(&self) -> Option<usize> {
        self.order.is_ready().then(|| self.len())
    }
}
