/*
 * Dominance Frontier
 *
 * frontier[a] = blocks b such that a dominates a predecessor of b but does
 * not strictly dominate b itself. For each edge p -> b, every dominator of
 * p that fails the strict-domination test picks up b.
 */

use std::collections::BTreeSet;

use crate::features::dominance::domain::{DominanceFrontier, DominatorSets};
use crate::features::flow_graph::domain::ControlFlowGraph;

pub fn dominance_frontier(cfg: &ControlFlowGraph, dominators: &DominatorSets) -> DominanceFrontier {
    let mut frontier: DominanceFrontier = cfg
        .labels()
        .map(|label| (label.to_string(), BTreeSet::new()))
        .collect();

    for block in cfg.labels() {
        for pred in cfg.preds_of(block) {
            for runner in &dominators[pred] {
                // runner dominates pred; add unless it strictly dominates
                // block too (strict = dominates and is not block itself).
                let strictly_dominates_block =
                    runner != block && dominators[block].contains(runner);
                if !strictly_dominates_block {
                    frontier
                        .get_mut(runner)
                        .expect("dominator sets only mention block labels")
                        .insert(block.to_string());
                }
            }
        }
    }

    frontier
}
