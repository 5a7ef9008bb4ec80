//! Dominance domain model
//!
//! Deterministically ordered map types throughout: dominance results are
//! rendered and iterated, so reproducible order is part of the contract.

use std::collections::{BTreeMap, BTreeSet};

/// `dominators[b]` = every block that dominates `b` (always contains `b`
/// itself and the entry label).
pub type DominatorSets = BTreeMap<String, BTreeSet<String>>;

/// `frontier[b]` = blocks where `b`'s dominance just ends: `b` dominates a
/// predecessor of the frontier block but not (strictly) the block itself.
pub type DominanceFrontier = BTreeMap<String, BTreeSet<String>>;

/// Immediate-dominator tree, rooted at the entry label.
///
/// Derivable bijectively from the dominator sets; every non-entry block has
/// exactly one parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DominatorTree {
    /// Entry label; empty only for an empty CFG.
    pub root: String,
    /// Non-entry block -> its immediate dominator.
    pub idom: BTreeMap<String, String>,
    /// Block -> children, sorted by label.
    pub children: BTreeMap<String, Vec<String>>,
}

impl DominatorTree {
    pub fn children_of(&self, label: &str) -> &[String] {
        self.children.get(label).map(Vec::as_slice).unwrap_or(&[])
    }
}
