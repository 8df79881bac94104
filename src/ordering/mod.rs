//! Sorted and shuffled views over sources.
//!
//! - [`Sorted`] re-sorts the backing elements on every query with a stable
//!   sort, so it always reflects the source's current contents.
//! - [`Shuffled`] snapshots the backing elements once and draws a fresh
//!   permutation of that snapshot on every traversal from a shared random
//!   generator.
//! - [`StableShuffled`] fixes a single permutation, derived from a seed, the
//!   first time it is used, and serves every later query from it.
//!
//! All three are driven by [`fisher_yates`] (shuffles) or the standard
//! library's stable sort, and all three can be turned back into a
//! [`Sequence`] for further composition.
//!
//! # Examples
//!
//! ```rust
//! use sequins::sequence::Sequence;
//!
//! let numbers = Sequence::of(vec![5, 3, 9, 1]);
//! assert_eq!(numbers.sorted().to_vec(), vec![1, 3, 5, 9]);
//! assert_eq!(numbers.sorted().reversed().first(), Some(9));
//!
//! let stable = numbers.shuffled_stable(7);
//! assert_eq!(stable.to_vec(), stable.to_vec());
//! ```

mod permutation;
mod shuffled;
mod sorted;

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use rand::RngCore;

pub use permutation::fisher_yates;
pub use shuffled::{Shuffled, StableShuffled};
pub use sorted::Sorted;

use crate::sequence::Sequence;

impl<T: Clone + 'static> Sequence<T> {
    /// A view of this sequence in natural order.
    pub fn sorted(&self) -> Sorted<T>
    where
        T: Ord,
    {
        Sorted::natural(self.clone())
    }

    /// A view of this sequence ordered by `comparator`. Ties keep their
    /// original order.
    pub fn sorted_by<C>(&self, comparator: C) -> Sorted<T>
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Sorted::new(self.clone(), comparator)
    }

    /// A view of this sequence ordered by the key `key` extracts.
    pub fn sorted_by_key<K, F>(&self, key: F) -> Sorted<T>
    where
        K: Ord,
        F: Fn(&T) -> K + 'static,
    {
        Sorted::by_key(self.clone(), key)
    }

    /// A view drawing a fresh permutation from `rng` on every traversal.
    pub fn shuffled<R>(&self, rng: Rc<RefCell<R>>) -> Shuffled<T, R>
    where
        R: RngCore + 'static,
    {
        Shuffled::new(self.clone(), rng)
    }

    /// Like [`Sequence::shuffled`], with a private generator seeded with
    /// `seed`.
    pub fn shuffled_seeded(&self, seed: u64) -> Shuffled<T> {
        Shuffled::seeded(self.clone(), seed)
    }

    /// A view fixed to one permutation derived from `seed`.
    pub fn shuffled_stable(&self, seed: u64) -> StableShuffled<T> {
        StableShuffled::new(self.clone(), seed)
    }
}
