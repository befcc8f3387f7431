//! PDF concatenation.
//!
//! See [`Concatenator`] for the page-tree strategy.

pub mod merger;

pub use merger::{ConcatResult, ConcatStatistics, Concatenator};
