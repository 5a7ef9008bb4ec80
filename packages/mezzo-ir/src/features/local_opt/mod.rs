//! Local optimizations - block-local passes with no CFG/dominance needs
//!
//! Local value numbering and trivial dead-code elimination consume and
//! produce the same instruction-stream format as the core passes and may
//! run before or after them.

pub mod infrastructure;

pub use infrastructure::*;
