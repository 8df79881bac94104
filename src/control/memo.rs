//! Memoized, on-demand values.
//!
//! [`Memo<T, F>`] defers a computation until the value is first needed and
//! caches the result. The ordering layer uses it to materialize a snapshot
//! of a backing source exactly once: the shuffle buffer, and the cached order
//! of a stable shuffle.
//!
//! # Examples
//!
//! ```rust
//! use sequins::control::Memo;
//! use std::cell::Cell;
//!
//! let calls = Cell::new(0);
//! let memo = Memo::new(|| {
//!     calls.set(calls.get() + 1);
//!     vec![3, 1, 2]
//! });
//! assert_eq!(calls.get(), 0);
//!
//! assert_eq!(memo.force().len(), 3);
//! memo.force_mut().sort_unstable();
//! assert_eq!(*memo.force(), vec![1, 2, 3]);
//! assert_eq!(calls.get(), 1);
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;

/// The internal state of a [`Memo`].
#[derive(Debug)]
pub enum MemoState<T, F> {
    /// Not computed yet; holds the initializer.
    Pending(F),
    /// Computed.
    Ready(T),
    /// The initializer panicked; the memo is unusable.
    Poisoned,
}

/// A value computed on first access and cached afterwards.
///
/// Unlike `std::cell::LazyCell`, a `Memo` hands out *mutable* access through
/// a shared reference, because the snapshot it holds is rearranged in place
/// on every traversal of an ephemeral shuffle.
///
/// # Thread Safety
///
/// Not thread-safe, like every other type in this crate.
pub struct Memo<T, F = Box<dyn FnOnce() -> T>> {
    state: RefCell<MemoState<T, F>>,
}

impl<T, F: FnOnce() -> T> Memo<T, F> {
    /// Creates a memo that will run `initializer` on first access.
    #[inline]
    pub const fn new(initializer: F) -> Self {
        Self {
            state: RefCell::new(MemoState::Pending(initializer)),
        }
    }

    /// Returns `true` once the value has been computed.
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.borrow(), MemoState::Ready(_))
    }

    /// Computes the value if necessary and returns a shared borrow of it.
    ///
    /// # Panics
    ///
    /// - If the initializer panics; the memo becomes poisoned.
    /// - If the memo is already poisoned.
    /// - If a mutable borrow from [`Memo::force_mut`] is still alive.
    pub fn force(&self) -> Ref<'_, T> {
        self.initialize();
        Ref::map(self.state.borrow(), |state| match state {
            MemoState::Ready(value) => value,
            _ => unreachable!("memo is initialized at this point"),
        })
    }

    /// Computes the value if necessary and returns a mutable borrow of it.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Memo::force`], plus any outstanding shared
    /// borrow.
    pub fn force_mut(&self) -> RefMut<'_, T> {
        self.initialize();
        RefMut::map(self.state.borrow_mut(), |state| match state {
            MemoState::Ready(value) => value,
            _ => unreachable!("memo is initialized at this point"),
        })
    }

    /// Runs the initializer without holding a borrow, so the initializer may
    /// read other cells freely.
    fn initialize(&self) {
        let initializer = {
            let mut state = self.state.borrow_mut();
            match &*state {
                MemoState::Ready(_) => return,
                MemoState::Poisoned => panic!("Memo instance has been poisoned"),
                MemoState::Pending(_) => {}
            }
            match std::mem::replace(&mut *state, MemoState::Poisoned) {
                MemoState::Pending(initializer) => initializer,
                _ => unreachable!("state checked above"),
            }
        };

        // Stays poisoned if this panics.
        let value = initializer();
        *self.state.borrow_mut() = MemoState::Ready(value);
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Memo<T, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.borrow() {
            MemoState::Ready(value) => formatter.debug_tuple("Memo").field(value).finish(),
            MemoState::Pending(_) => formatter.debug_tuple("Memo").field(&"<pending>").finish(),
            MemoState::Poisoned => formatter.debug_tuple("Memo").field(&"<poisoned>").finish(),
        }
    }
}
