//! Crate-wide constants

/// Sentinel name a read resolves to when no write reaches it.
///
/// SSA renaming seeds every non-parameter variable stack with this name so
/// that use-before-def is deterministic instead of fatal; the CFG builder's
/// operand validation treats it as always-defined for the same reason.
pub const UNDEFINED_NAME: &str = "__undefined";
