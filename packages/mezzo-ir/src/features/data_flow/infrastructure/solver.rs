/*
 * Worklist Solver
 *
 * Generic forward/backward fixpoint engine. Direction is handled by
 * swapping the roles of succs/preds and of the in/out maps - one loop, not
 * two. Re-processing a block is safe (the worklist is not deduplicated),
 * just redundant.
 */

use std::collections::{BTreeMap, VecDeque};

use crate::features::data_flow::domain::DataFlowResults;
use crate::features::data_flow::ports::Lattice;
use crate::features::flow_graph::domain::ControlFlowGraph;
use crate::shared::models::Function;

use super::errors::DataFlowResult;

/// Run one analysis over one function's CFG to a fixpoint.
///
/// Every block's IN and OUT start at `lattice.initial(function)`; the
/// worklist is seeded with every block in block order. Termination is
/// guaranteed for finite-height lattices with monotone merge/transfer
/// (the caller's obligation, see `Lattice`).
pub fn solve<L: Lattice>(
    cfg: &ControlFlowGraph,
    function: &Function,
    lattice: &L,
) -> DataFlowResult<DataFlowResults<L::Fact>> {
    let labels: Vec<String> = cfg.labels().map(String::from).collect();
    let forward = lattice.is_forward();

    let seed = || -> BTreeMap<String, L::Fact> {
        labels
            .iter()
            .map(|label| (label.clone(), lattice.initial(function)))
            .collect()
    };
    // Oriented maps: for backward analyses flow_in plays the role of the
    // OUT facts and the edge maps swap.
    let mut flow_in = seed();
    let mut flow_out = seed();

    let mut worklist: VecDeque<String> = labels.iter().cloned().collect();
    while let Some(label) = worklist.pop_front() {
        let incoming = if forward {
            cfg.preds_of(&label)
        } else {
            cfg.succs_of(&label)
        };
        let outgoing = if forward {
            cfg.succs_of(&label)
        } else {
            cfg.preds_of(&label)
        };

        let merged = lattice.merge(incoming.iter().map(|pred| &flow_out[pred]).collect());
        flow_in.insert(label.clone(), merged.clone());

        let block = cfg.block(&label).expect("worklist only carries block labels");
        let candidate = lattice.transfer(merged, block)?;

        if candidate != flow_out[&label] {
            flow_out.insert(label.clone(), candidate);
            for next in outgoing {
                worklist.push_back(next.clone());
            }
        }
    }

    let (ins, outs) = if forward {
        (flow_in, flow_out)
    } else {
        (flow_out, flow_in)
    };
    Ok(DataFlowResults { labels, ins, outs })
}
