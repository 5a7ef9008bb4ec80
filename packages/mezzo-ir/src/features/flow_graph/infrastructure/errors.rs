//! Flow Graph error types

use thiserror::Error;

/// Malformed-IR conditions detected while building a CFG.
///
/// Detection is best-effort: forward references to labels defined later in
/// the same function are legal and resolve; only names that resolve nowhere
/// in the whole function are errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowGraphError {
    /// A jump/branch targets a label no block in the function carries.
    #[error("malformed IR in function '{function}': branch target '{label}' does not name a block")]
    MalformedBranchTarget { function: String, label: String },

    /// An operand is never produced as a destination and is not a parameter.
    #[error(
        "malformed IR in function '{function}', block '{block}': operand '{name}' has no definition"
    )]
    MalformedOperand {
        function: String,
        block: String,
        name: String,
    },
}

pub type FlowGraphResult<T> = Result<T, FlowGraphError>;
