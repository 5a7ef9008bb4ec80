//! Local optimization error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocalOptError {
    /// Constant folding inside LVN hit a division by zero on literal
    /// operands; the block is malformed.
    #[error("malformed IR: division by zero on constant operands of '{dest}'")]
    DivisionByZero { dest: String },
}

pub type LocalOptResult<T> = Result<T, LocalOptError>;
