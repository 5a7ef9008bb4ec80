/*
 * Immediate-Dominator Tree
 *
 * The immediate dominator of a non-entry block is its closest strict
 * dominator: the unique one dominated by every other strict dominator.
 * Derived by pairwise elimination - a candidate that strictly dominates
 * another candidate is farther from the block and drops out. Anything other
 * than exactly one survivor means the dominance inputs are disconnected or
 * cyclic, which is an InvalidCfg error.
 */

use std::collections::BTreeMap;

use crate::features::dominance::domain::{DominatorSets, DominatorTree};
use crate::features::flow_graph::domain::ControlFlowGraph;

use super::errors::{DominanceError, DominanceResult};

pub fn immediate_dominator_tree(
    cfg: &ControlFlowGraph,
    dominators: &DominatorSets,
) -> DominanceResult<DominatorTree> {
    let Some(entry) = cfg.entry_label() else {
        return Ok(DominatorTree::default());
    };

    let mut idom: BTreeMap<String, String> = BTreeMap::new();
    for (block, doms) in dominators {
        if block == entry {
            continue;
        }
        let strict: Vec<&String> = doms.iter().filter(|dom| *dom != block).collect();
        let candidates: Vec<&String> = strict
            .iter()
            .filter(|candidate| {
                // Survives only if it dominates no other strict dominator.
                !strict
                    .iter()
                    .any(|other| other != *candidate && dominators[other.as_str()].contains(**candidate))
            })
            .copied()
            .collect();

        match candidates.as_slice() {
            [only] => {
                idom.insert(block.clone(), (*only).clone());
            }
            _ => {
                return Err(DominanceError::InvalidCfg {
                    function: cfg.function.clone(),
                    block: block.clone(),
                    candidates: candidates.len(),
                });
            }
        }
    }

    let mut children: BTreeMap<String, Vec<String>> = cfg
        .labels()
        .map(|label| (label.to_string(), Vec::new()))
        .collect();
    for (block, parent) in &idom {
        children
            .get_mut(parent)
            .expect("idom parents are block labels")
            .push(block.clone());
    }

    Ok(DominatorTree {
        root: entry.to_string(),
        idom,
        children,
    })
}
