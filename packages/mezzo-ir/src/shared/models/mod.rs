//! Shared IR models (single source of truth for the wire format)

pub mod instruction;
pub mod program;

pub use instruction::*;
pub use program::*;
