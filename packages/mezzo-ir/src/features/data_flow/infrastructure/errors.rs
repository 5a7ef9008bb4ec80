//! Data Flow error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataFlowError {
    /// Constant folding hit a division by zero on literal operands. The
    /// source program is malformed; guessing a result would be worse.
    #[error(
        "malformed IR in block '{block}': division by zero on constant operands of '{dest}'"
    )]
    DivisionByZero { block: String, dest: String },
}

pub type DataFlowResult<T> = Result<T, DataFlowError>;
