//! Dominance error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DominanceError {
    /// Immediate-dominator derivation found zero or multiple candidates for
    /// a block - a disconnected or malformed dominance region.
    #[error(
        "invalid CFG in function '{function}': block '{block}' has {candidates} immediate-dominator candidate(s)"
    )]
    InvalidCfg {
        function: String,
        block: String,
        candidates: usize,
    },
}

pub type DominanceResult<T> = Result<T, DominanceError>;
