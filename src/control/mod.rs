//! Control structures shared by the other layers.
//!
//! - [`Memo`]: a value computed on first access and cached, with mutable
//!   access through a shared reference.

mod memo;

pub use memo::{Memo, MemoState};
