//! Flow Graph feature - basic blocks and control-flow edges
//!
//! Segments a function's flat instruction stream into basic blocks, applies
//! the two unconditional shape repairs (synthetic entry block, synthesized
//! terminators) and computes successor/predecessor edges. Every downstream
//! pass consumes this feature's output.

pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
