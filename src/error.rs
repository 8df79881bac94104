//! Error type shared by sequences, views and cursors.
//!
//! Every fallible operation in this crate returns
//! `Result<_, SequenceError>`. Errors are synchronous and local to the
//! operation that raised them: nothing is retried and nothing is mutated
//! before an argument has been validated.
//!
//! Two conditions are deliberately *not* errors:
//!
//! - Traversing an exhausted single-use source yields an empty traversal.
//! - A panic raised by a user closure (a mapper, a generator step, a nested
//!   source) propagates unchanged at the point the consumer pulls the
//!   element that triggers it.

use std::fmt::{self, Display, Formatter};

/// Error returned by mutating and positional operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// A mutating operation was invoked on something with no mutable backing
    /// store, or through a step that cannot map removals back to it.
    UnsupportedMutation {
        /// Name of the rejected operation.
        operation: &'static str,
    },
    /// An inserted value would violate the invariant of a view.
    InvalidArgument {
        /// Why the value was rejected.
        reason: String,
    },
    /// An index fell outside the current logical range.
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// The logical length at the time of the request.
        length: usize,
    },
    /// A cursor operation was invoked in a state that does not permit it,
    /// such as `remove` before the first `next`.
    IllegalState {
        /// Description of the offending state.
        reason: &'static str,
    },
}

impl SequenceError {
    /// Shorthand for [`SequenceError::UnsupportedMutation`].
    #[inline]
    #[must_use]
    pub const fn unsupported(operation: &'static str) -> Self {
        Self::UnsupportedMutation { operation }
    }

    /// Shorthand for [`SequenceError::InvalidArgument`].
    #[inline]
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`SequenceError::OutOfBounds`].
    #[inline]
    #[must_use]
    pub const fn out_of_bounds(index: usize, length: usize) -> Self {
        Self::OutOfBounds { index, length }
    }

    /// Shorthand for [`SequenceError::IllegalState`].
    #[inline]
    #[must_use]
    pub const fn illegal_state(reason: &'static str) -> Self {
        Self::IllegalState { reason }
    }
}

impl Display for SequenceError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedMutation { operation } => {
                write!(formatter, "unsupported mutation: {operation}")
            }
            Self::InvalidArgument { reason } => write!(formatter, "invalid argument: {reason}"),
            Self::OutOfBounds { index, length } => {
                write!(formatter, "index {index} out of bounds for length {length}")
            }
            Self::IllegalState { reason } => write!(formatter, "illegal state: {reason}"),
        }
    }
}

impl std::error::Error for SequenceError {}

static_assertions::assert_impl_all!(SequenceError: std::error::Error, Clone, Send, Sync);
