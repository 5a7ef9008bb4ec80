//! SSA error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SsaError {
    /// A phi names a predecessor label that is not a block of the CFG.
    #[error("phi in block '{block}' names predecessor '{pred}' which is not a block")]
    UnknownPhiPredecessor { block: String, pred: String },

    /// A phi's parallel args/labels sequences have different lengths.
    #[error("phi in block '{block}' carries {args} args but {labels} labels")]
    MismatchedPhiOperands {
        block: String,
        args: usize,
        labels: usize,
    },
}

pub type SsaResult<T> = Result<T, SsaError>;
