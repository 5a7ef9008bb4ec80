/*
 * SSA Destruction (from-SSA)
 *
 * Every phi (dest, arg_i, label_i) lowers to an `id` copy of arg_i into
 * dest at the end of predecessor label_i, inserted just before that
 * block's terminator. Phis are then dropped and trivial DCE runs to
 * convergence over the flattened stream, so copies orphaned by removing a
 * consumer disappear too.
 *
 * All copies are gathered before any block is edited; editing while
 * scanning would corrupt self-loop blocks.
 */

use crate::features::flow_graph::domain::ControlFlowGraph;
use crate::features::local_opt::infrastructure::tdce::tdce;
use crate::shared::models::{Instruction, Operation};

use super::errors::{SsaError, SsaResult};

/// Lower one function's CFG out of SSA form; returns the cleaned flat
/// instruction stream.
pub fn from_ssa(cfg: &mut ControlFlowGraph) -> SsaResult<Vec<Instruction>> {
    eliminate_phis(cfg)?;
    let mut instrs = cfg.flatten();
    tdce(&mut instrs);
    Ok(instrs)
}

/// Replace every phi with copies in its predecessors.
pub fn eliminate_phis(cfg: &mut ControlFlowGraph) -> SsaResult<()> {
    let labels: Vec<String> = cfg.labels().map(String::from).collect();

    let mut copies: Vec<(String, Operation)> = Vec::new();
    for label in &labels {
        let block = cfg.block(label).expect("labels come from the CFG");
        for op in block.instrs.iter().filter_map(Instruction::as_op) {
            if !op.is_phi() {
                continue;
            }
            let Some(dest) = &op.dest else { continue };
            if op.args.len() != op.labels.len() {
                return Err(SsaError::MismatchedPhiOperands {
                    block: label.clone(),
                    args: op.args.len(),
                    labels: op.labels.len(),
                });
            }
            for (arg, pred) in op.args.iter().zip(&op.labels) {
                if cfg.block(pred).is_none() {
                    return Err(SsaError::UnknownPhiPredecessor {
                        block: label.clone(),
                        pred: pred.clone(),
                    });
                }
                copies.push((
                    pred.clone(),
                    Operation::copy(dest.clone(), op.op_type.clone(), arg.clone()),
                ));
            }
        }
    }

    for (pred, copy) in copies {
        let block = cfg.block_mut(&pred).expect("predecessors were checked");
        let at = if block.terminator().is_some() {
            block.instrs.len() - 1
        } else {
            block.instrs.len()
        };
        block.instrs.insert(at, copy.into());
    }

    for label in &labels {
        cfg.block_mut(label)
            .expect("labels come from the CFG")
            .instrs
            .retain(|instr| !instr.as_op().is_some_and(Operation::is_phi));
    }
    Ok(())
}
