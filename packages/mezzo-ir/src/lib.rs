/*
 * Mezzo IR - Middle-End Toolkit for a JSON-Encoded IR
 *
 * Feature-First Hexagonal Architecture:
 * - shared/    : Wire models (Instruction, Function, Program)
 * - features/  : Vertical slices (flow_graph → dominance → data_flow / ssa,
 *                plus block-local local_opt)
 * - pipeline/  : Whole-program orchestration (rayon per-function fan-out)
 *
 * The core invariant chain: the CFG builder normalizes shape (synthetic
 * entry, synthesized terminators) so dominance can assume a single
 * predecessor-free entry; SSA construction leans on dominance frontiers
 * and the idom tree; the dataflow engine shares the same worklist
 * discipline over the same read-only CFG.
 */

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared wire models and constants
pub mod shared;

/// Feature modules
pub mod features;

/// Pipeline orchestration
pub mod pipeline;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use shared::models::{Function, FunctionArg, Instruction, Literal, Operation, Program};

pub use features::flow_graph::{BasicBlock, ControlFlowGraph, FlowGraphError};
pub use features::flow_graph::infrastructure::builder::build as build_cfg;

pub use features::dominance::{
    dominance_frontier, dominator_sets, immediate_dominator_tree, DominanceError,
    DominanceFrontier, DominatorSets, DominatorTree,
};

pub use features::data_flow::{
    render_results, solve, ConstValue, ConstantPropagation, DataFlowError, DataFlowResults,
    Lattice, LiveVariables, ReachingDefinitions,
};

pub use features::ssa::{eliminate_phis, from_ssa, to_ssa, SsaError};

pub use features::local_opt::{
    drop_killed_local, local_value_numbering, tdce, LocalOptError, LvnOptions,
};

pub use pipeline::{
    analyze, convert_from_ssa, convert_to_ssa, render_analysis, run_local_value_numbering,
    run_tdce, FunctionAnalysis, FunctionFailure, PassError, PipelineReport,
};
