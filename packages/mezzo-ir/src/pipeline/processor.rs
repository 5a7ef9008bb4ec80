/*
 * Program Processor
 *
 * Whole-program pass runners. Functions are independent (each owns its
 * CFG, dominance and renaming state), so every runner fans out with rayon
 * and no locking. Error containment: a failing function is reported with
 * its name and skipped; siblings are unaffected.
 */

use rayon::prelude::*;

use crate::features::data_flow::domain::DataFlowResults;
use crate::features::data_flow::infrastructure::report::{render_results, RenderFact};
use crate::features::data_flow::infrastructure::solver::solve;
use crate::features::data_flow::ports::Lattice;
use crate::features::dominance::infrastructure::{
    dominance_frontier, dominator_sets, immediate_dominator_tree,
};
use crate::features::flow_graph::infrastructure::builder;
use crate::features::local_opt::infrastructure::errors::LocalOptResult;
use crate::features::local_opt::infrastructure::lvn::{local_value_numbering, LvnOptions};
use crate::features::local_opt::infrastructure::tdce::{drop_killed_local, tdce};
use crate::features::ssa::infrastructure::{from_ssa, to_ssa};
use crate::shared::models::{Function, Instruction, Program};

use super::error::PassError;

/// One function's failure, carried with the function name per the error
/// containment contract.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionFailure {
    pub function: String,
    pub error: PassError,
}

/// Outcome of one whole-program pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub processed: usize,
    pub failures: Vec<FunctionFailure>,
}

impl PipelineReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Per-function analysis outcome (facts or a contained failure).
#[derive(Debug)]
pub struct FunctionAnalysis<F> {
    pub function: String,
    pub result: Result<DataFlowResults<F>, PassError>,
}

/// Rewrite every function body in parallel with `pass`; collect failures.
fn transform_functions<F>(program: &mut Program, pass: F) -> PipelineReport
where
    F: Fn(&mut Function) -> Result<(), PassError> + Sync,
{
    let total = program.functions.len();
    let failures: Vec<FunctionFailure> = program
        .functions
        .par_iter_mut()
        .filter_map(|function| {
            pass(function).err().map(|error| FunctionFailure {
                function: function.name.clone(),
                error,
            })
        })
        .collect();
    tracing::debug!(
        processed = total - failures.len(),
        failed = failures.len(),
        "program pass finished"
    );
    PipelineReport {
        processed: total - failures.len(),
        failures,
    }
}

/// Convert every function into SSA form in place.
pub fn convert_to_ssa(program: &mut Program) -> PipelineReport {
    transform_functions(program, |function| {
        let mut cfg = builder::build(function)?;
        if cfg.is_empty() {
            return Ok(());
        }
        let sets = dominator_sets(&cfg);
        let frontier = dominance_frontier(&cfg, &sets);
        let tree = immediate_dominator_tree(&cfg, &sets)?;
        to_ssa(&mut cfg, function, &frontier, &tree);
        function.instrs = cfg.flatten();
        Ok(())
    })
}

/// Convert every function out of SSA form in place (phi elimination plus
/// trivial-DCE cleanup).
pub fn convert_from_ssa(program: &mut Program) -> PipelineReport {
    transform_functions(program, |function| {
        let mut cfg = builder::build(function)?;
        if cfg.is_empty() {
            return Ok(());
        }
        function.instrs = from_ssa(&mut cfg)?;
        Ok(())
    })
}

/// Run one dataflow analysis over every function; per-function results or
/// contained failures, in program order.
pub fn analyze<L>(program: &Program, lattice: &L) -> Vec<FunctionAnalysis<L::Fact>>
where
    L: Lattice + Sync,
    L::Fact: Send,
{
    program
        .functions
        .par_iter()
        .map(|function| {
            let result = builder::build(function)
                .map_err(PassError::from)
                .and_then(|cfg| solve(&cfg, function, lattice).map_err(PassError::from));
            FunctionAnalysis {
                function: function.name.clone(),
                result,
            }
        })
        .collect()
}

/// Render a whole-program analysis the way the stock tools print it:
/// block facts per function, failures inline.
pub fn render_analysis<F: RenderFact>(analyses: &[FunctionAnalysis<F>]) -> String {
    let mut out = String::new();
    for analysis in analyses {
        match &analysis.result {
            Ok(results) => out.push_str(&render_results(results)),
            Err(error) => {
                out.push_str(&format!("{}: error: {}\n", analysis.function, error));
            }
        }
    }
    out
}

/// Run local value numbering over every basic block of every function.
pub fn run_local_value_numbering(program: &mut Program, options: LvnOptions) -> PipelineReport {
    transform_functions(program, |function| {
        for_each_block(&mut function.instrs, |block| {
            local_value_numbering(block, options)
        })?;
        Ok(())
    })
}

/// Run trivial DCE (plus killed-definition removal) block-locally over
/// every function.
pub fn run_tdce(program: &mut Program) -> PipelineReport {
    transform_functions(program, |function| {
        for_each_block(&mut function.instrs, |block| {
            tdce(block);
            drop_killed_local(block);
            Ok(())
        })?;
        Ok(())
    })
}

/// Block-local iteration over a flat stream: same segmentation discipline
/// as the CFG builder (a label opens a block, a terminator closes one),
/// but without shape repairs - the stream is reassembled exactly, labels
/// kept inline, so block-local passes never alter block structure.
fn for_each_block<F>(instrs: &mut Vec<Instruction>, mut pass: F) -> LocalOptResult<()>
where
    F: FnMut(&mut Vec<Instruction>) -> LocalOptResult<()>,
{
    let mut blocks: Vec<Vec<Instruction>> = Vec::new();
    let mut current: Vec<Instruction> = Vec::new();
    for instr in instrs.drain(..) {
        if instr.is_label() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            current.push(instr);
        } else {
            let terminates = instr.is_terminator();
            current.push(instr);
            if terminates {
                blocks.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    for block in &mut blocks {
        pass(block)?;
    }
    *instrs = blocks.concat();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::data_flow::infrastructure::constant_propagation::ConstantPropagation;
    use crate::features::flow_graph::infrastructure::errors::FlowGraphError;
    use pretty_assertions::assert_eq;

    fn program_of(json: &str) -> Program {
        Program::from_json(json).unwrap()
    }

    #[test]
    fn test_ssa_round_trip_pipeline() {
        let mut program = program_of(
            r#"{"functions":[{"name":"main","instrs":[
                {"label":"b1"},
                {"op":"const","dest":"v","type":"int","value":4},
                {"op":"jmp","labels":["b2"]},
                {"label":"b2"},
                {"op":"print","args":["v"]},
                {"op":"ret"}
            ]}]}"#,
        );
        assert!(convert_to_ssa(&mut program).is_clean());
        assert!(convert_from_ssa(&mut program).is_clean());
        // Straight-line code: the round trip leaves one definition of v
        // feeding the print.
        let func = &program.functions[0];
        let print = func
            .instrs
            .iter()
            .filter_map(Instruction::as_op)
            .find(|op| op.op == "print")
            .unwrap();
        let def = func
            .instrs
            .iter()
            .filter_map(Instruction::as_op)
            .find(|op| op.dest.is_some())
            .unwrap();
        assert_eq!(print.args, vec![def.dest.clone().unwrap()]);
    }

    #[test]
    fn test_failure_containment() {
        // The second function branches nowhere; the first must still
        // convert.
        let mut program = program_of(
            r#"{"functions":[
                {"name":"good","instrs":[
                    {"op":"const","dest":"x","type":"int","value":1},
                    {"op":"ret"}
                ]},
                {"name":"bad","instrs":[
                    {"label":"b1"},
                    {"op":"jmp","labels":["nowhere"]}
                ]}
            ]}"#,
        );
        let report = convert_to_ssa(&mut program);
        assert_eq!(report.processed, 1);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.function, "bad");
        assert_eq!(
            failure.error,
            PassError::FlowGraph(FlowGraphError::MalformedBranchTarget {
                function: "bad".to_string(),
                label: "nowhere".to_string(),
            })
        );
        // The good function was rewritten (its const now carries an SSA
        // version).
        let good = &program.functions[0];
        assert!(good
            .instrs
            .iter()
            .filter_map(Instruction::as_op)
            .any(|op| op.dest.as_deref() == Some("x.0")));
    }

    #[test]
    fn test_analyze_renders_per_function() {
        let program = program_of(
            r#"{"functions":[{"name":"main","instrs":[
                {"label":"b1"},
                {"op":"const","dest":"v","type":"int","value":4},
                {"op":"jmp","labels":["b2"]},
                {"label":"b2"},
                {"op":"print","args":["v"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let analyses = analyze(&program, &ConstantPropagation);
        assert_eq!(analyses.len(), 1);
        let rendered = render_analysis(&analyses);
        assert!(rendered.contains("b1:\n  in:  ∅\n  out: v: 4"));
        assert!(rendered.contains("b2:\n  in:  v: 4\n  out: v: 4"));
    }

    #[test]
    fn test_run_tdce_keeps_labels_inline() {
        let mut program = program_of(
            r#"{"functions":[{"name":"f","instrs":[
                {"label":"b1"},
                {"op":"const","dest":"dead","type":"int","value":1},
                {"op":"const","dest":"v","type":"int","value":4},
                {"op":"print","args":["v"]},
                {"op":"ret"}
            ]}]}"#,
        );
        assert!(run_tdce(&mut program).is_clean());
        let func = &program.functions[0];
        assert_eq!(func.instrs.len(), 4);
        assert_eq!(func.instrs[0].label_name(), Some("b1"));
    }

    #[test]
    fn test_run_lvn_over_blocks() {
        let mut program = program_of(
            r#"{"functions":[{"name":"f","instrs":[
                {"op":"const","dest":"a","type":"int","value":2},
                {"op":"const","dest":"b","type":"int","value":2},
                {"op":"print","args":["b"]},
                {"op":"ret"}
            ]}]}"#,
        );
        assert!(run_local_value_numbering(&mut program, LvnOptions::default()).is_clean());
        let ops: Vec<&str> = program.functions[0]
            .instrs
            .iter()
            .filter_map(Instruction::as_op)
            .map(|op| op.op.as_str())
            .collect();
        // b became a copy of a, and no labels/terminators were invented.
        assert_eq!(ops, vec!["const", "id", "print", "ret"]);
    }
}
