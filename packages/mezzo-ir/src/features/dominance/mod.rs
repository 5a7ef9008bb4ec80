//! Dominance feature - dominator sets, immediate-dominator tree, frontiers
//!
//! Consumes a read-only CFG. The SSA converter is the main downstream
//! client; the analyses are intraprocedural (one function at a time).

pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
