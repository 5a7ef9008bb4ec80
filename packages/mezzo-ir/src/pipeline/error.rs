//! Pipeline error types

use thiserror::Error;

use crate::features::data_flow::infrastructure::errors::DataFlowError;
use crate::features::dominance::infrastructure::errors::DominanceError;
use crate::features::flow_graph::infrastructure::errors::FlowGraphError;
use crate::features::local_opt::infrastructure::errors::LocalOptError;
use crate::features::ssa::infrastructure::errors::SsaError;

/// Umbrella over every per-feature error a pass can surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PassError {
    #[error(transparent)]
    FlowGraph(#[from] FlowGraphError),

    #[error(transparent)]
    Dominance(#[from] DominanceError),

    #[error(transparent)]
    DataFlow(#[from] DataFlowError),

    #[error(transparent)]
    Ssa(#[from] SsaError),

    #[error(transparent)]
    LocalOpt(#[from] LocalOptError),
}
