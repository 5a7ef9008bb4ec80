/*
 * Dominator Sets
 *
 * Classic iterative fixpoint over the powerset lattice:
 *
 *   dominators[entry] = {entry}
 *   dominators[b]     = {b} ∪ ⋂ dominators[p]  for p in preds[b]
 *
 * Initialized with the universal set everywhere but the entry; the set
 * sequence is monotonically non-increasing on a finite lattice, so a full
 * pass without change is a fixpoint.
 */

use std::collections::{BTreeMap, BTreeSet};

use crate::features::dominance::domain::DominatorSets;
use crate::features::flow_graph::domain::ControlFlowGraph;

/// Compute the dominator-set relation of a CFG.
///
/// Unreachable blocks (no predecessors, not the entry) keep the universal
/// set; they are reported through `tracing::warn!`, never silently dropped.
pub fn dominator_sets(cfg: &ControlFlowGraph) -> DominatorSets {
    let Some(entry) = cfg.entry_label() else {
        return BTreeMap::new();
    };

    let universe: BTreeSet<String> = cfg.labels().map(String::from).collect();
    let mut dominators: DominatorSets = cfg
        .labels()
        .map(|label| {
            let init = if label == entry {
                BTreeSet::from([label.to_string()])
            } else {
                universe.clone()
            };
            (label.to_string(), init)
        })
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for label in cfg.labels() {
            if label == entry {
                continue;
            }
            let preds = cfg.preds_of(label);
            if preds.is_empty() {
                // Unreachable: the universal set is the (degenerate) fixpoint.
                continue;
            }

            let mut common: Option<BTreeSet<String>> = None;
            for pred in preds {
                let pred_doms = &dominators[pred];
                common = Some(match common {
                    None => pred_doms.clone(),
                    Some(acc) => acc.intersection(pred_doms).cloned().collect(),
                });
            }
            let mut next = common.unwrap_or_default();
            next.insert(label.to_string());

            if next != dominators[label] {
                dominators.insert(label.to_string(), next);
                changed = true;
            }
        }
    }

    for label in cfg.labels() {
        if label != entry && cfg.preds_of(label).is_empty() {
            tracing::warn!(
                function = %cfg.function,
                block = %label,
                "unreachable block keeps the universal dominator set"
            );
        }
    }

    dominators
}
