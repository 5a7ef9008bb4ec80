//! Pipeline orchestration
//!
//! Program-level entry points: each runs one pass or analysis over every
//! function, in parallel (functions share no mutable state), and contains
//! failures per function so one malformed function never blocks siblings.

pub mod error;
pub mod processor;

pub use error::*;
pub use processor::*;
