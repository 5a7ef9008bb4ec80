/*
 * SSA Construction (to-SSA)
 *
 * Two phases over one function's CFG:
 *
 * 1. Phi placement: for every variable, a worklist of defining blocks;
 *    each popped definition site plants a phi in every frontier block that
 *    lacks one, and the frontier block itself becomes a new definition
 *    site. Args/labels stay empty until renaming.
 *
 * 2. Renaming: depth-first pre-order over the immediate-dominator tree,
 *    one version stack per original variable. Parameters enter as version
 *    0 of themselves; every other variable starts at the __undefined
 *    sentinel so a read before any write resolves deterministically. On
 *    block exit exactly the versions pushed in that block are popped,
 *    which bounds each version's visibility to its dominator subtree.
 *
 * Stacks are plain growable vectors keyed by variable name; phi operand
 * filling goes through a (block, index, variable) side table recorded
 * after placement, so destinations can be renamed in place.
 */

use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeMap, BTreeSet};

use crate::features::dominance::domain::{DominanceFrontier, DominatorTree};
use crate::features::flow_graph::domain::ControlFlowGraph;
use crate::shared::constants::UNDEFINED_NAME;
use crate::shared::models::{Function, Instruction, Operation};

/// block label -> (instruction index, original variable) of each planted
/// phi. Indices stay valid because renaming never moves instructions.
type PhiSites = AHashMap<String, Vec<(usize, String)>>;

/// Convert one function's CFG into SSA form in place.
///
/// The caller supplies the dominance products computed from the same CFG;
/// `Function` is only read for its parameter list.
pub fn to_ssa(
    cfg: &mut ControlFlowGraph,
    function: &Function,
    frontier: &DominanceFrontier,
    tree: &DominatorTree,
) {
    if cfg.is_empty() {
        return;
    }
    let sites = insert_phis(cfg, frontier);
    rename_all(cfg, function, tree, &sites);
}

/// Phase 1: plant empty phis on dominance frontiers.
fn insert_phis(cfg: &mut ControlFlowGraph, frontier: &DominanceFrontier) -> PhiSites {
    // Variable -> defining blocks, plus the declared type of each variable.
    let mut defs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut types: AHashMap<String, Option<String>> = AHashMap::new();
    for block in &cfg.blocks {
        for op in block.instrs.iter().filter_map(Instruction::as_op) {
            if let Some(dest) = &op.dest {
                defs.entry(dest.clone())
                    .or_default()
                    .insert(block.label.clone());
                types.entry(dest.clone()).or_insert_with(|| op.op_type.clone());
            }
        }
    }

    // Variables processed independently, in sorted order for reproducible
    // output; planting a phi makes the frontier block a definition site.
    for (var, def_blocks) in &defs {
        let mut worklist: Vec<String> = def_blocks.iter().cloned().collect();
        let mut planted: AHashSet<String> = AHashSet::new();
        while let Some(def_block) = worklist.pop() {
            let Some(frontier_blocks) = frontier.get(&def_block) else {
                continue;
            };
            for front in frontier_blocks {
                if planted.insert(front.clone()) {
                    let mut phi = Operation::new("phi");
                    phi.dest = Some(var.clone());
                    phi.op_type = types.get(var.as_str()).cloned().flatten();
                    let block = cfg
                        .block_mut(front)
                        .expect("frontier only mentions block labels");
                    block.instrs.insert(0, phi.into());
                    worklist.push(front.clone());
                }
            }
        }
    }

    // Record sites once insertion is done, when indices are final.
    let mut sites: PhiSites = AHashMap::new();
    for block in &cfg.blocks {
        for (idx, instr) in block.instrs.iter().enumerate() {
            let Some(op) = instr.as_op() else { continue };
            if op.is_phi() && op.args.is_empty() {
                let var = op.dest.clone().expect("planted phis carry a dest");
                sites.entry(block.label.clone()).or_default().push((idx, var));
            }
        }
    }
    sites
}

/// Phase 2: version every name along the dominator tree.
fn rename_all(cfg: &mut ControlFlowGraph, function: &Function, tree: &DominatorTree, sites: &PhiSites) {
    let mut stacks: AHashMap<String, Vec<String>> = AHashMap::new();
    for arg in function.arg_names() {
        stacks.insert(arg.to_string(), vec![arg.to_string()]);
    }
    stacks
        .entry(UNDEFINED_NAME.to_string())
        .or_insert_with(|| vec![UNDEFINED_NAME.to_string()]);
    for block in &cfg.blocks {
        for op in block.instrs.iter().filter_map(Instruction::as_op) {
            if let Some(dest) = &op.dest {
                stacks
                    .entry(dest.clone())
                    .or_insert_with(|| vec![UNDEFINED_NAME.to_string()]);
            }
        }
    }

    let mut counters: AHashMap<String, usize> =
        stacks.keys().map(|name| (name.clone(), 0)).collect();

    let root = tree.root.clone();
    rename_block(cfg, tree, sites, &root, &mut stacks, &mut counters);
}

fn rename_block(
    cfg: &mut ControlFlowGraph,
    tree: &DominatorTree,
    sites: &PhiSites,
    label: &str,
    stacks: &mut AHashMap<String, Vec<String>>,
    counters: &mut AHashMap<String, usize>,
) {
    // How many versions this block pushed per variable, for the exit pops.
    let mut pushed: AHashMap<String, usize> = AHashMap::new();

    if let Some(block) = cfg.block_mut(label) {
        for instr in &mut block.instrs {
            let Some(op) = instr.as_op_mut() else { continue };

            // Phi operands are filled from predecessors, never rewritten here.
            if !op.is_phi() {
                for arg in &mut op.args {
                    if let Some(stack) = stacks.get(arg.as_str()) {
                        *arg = stack.last().expect("stacks are never empty").clone();
                    }
                }
            }

            if let Some(original) = op.dest.clone() {
                let counter = counters.entry(original.clone()).or_insert(0);
                let fresh = format!("{}.{}", original, counter);
                *counter += 1;
                stacks
                    .get_mut(&original)
                    .expect("every destination was seeded")
                    .push(fresh.clone());
                *pushed.entry(original).or_insert(0) += 1;
                op.dest = Some(fresh);
            }
        }
    }

    // Feed this block's reaching versions into successor phis. Sorted
    // order keeps phi args reproducible; duplicate edges append twice.
    let mut successors = cfg.succs_of(label).to_vec();
    successors.sort();
    for succ in &successors {
        let Some(site_list) = sites.get(succ) else { continue };
        for (idx, var) in site_list {
            let reaching = stacks
                .get(var.as_str())
                .and_then(|stack| stack.last())
                .cloned()
                .unwrap_or_else(|| UNDEFINED_NAME.to_string());
            let block = cfg.block_mut(succ).expect("successors are block labels");
            let op = block.instrs[*idx]
                .as_op_mut()
                .expect("phi sites index operations");
            op.args.push(reaching);
            op.labels.push(label.to_string());
        }
    }

    for child in tree.children_of(label) {
        rename_block(cfg, tree, sites, child, stacks, counters);
    }

    for (var, count) in pushed {
        let stack = stacks.get_mut(&var).expect("pushed stacks exist");
        for _ in 0..count {
            stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::dominance::infrastructure::{
        dominator_sets, dominance_frontier, immediate_dominator_tree,
    };
    use crate::features::flow_graph::infrastructure::builder;
    use crate::shared::models::Program;
    use pretty_assertions::assert_eq;

    fn ssa_cfg(json: &str) -> ControlFlowGraph {
        let func = Program::from_json(json).unwrap().functions.remove(0);
        let mut cfg = builder::build(&func).unwrap();
        let sets = dominator_sets(&cfg);
        let frontier = dominance_frontier(&cfg, &sets);
        let tree = immediate_dominator_tree(&cfg, &sets).unwrap();
        to_ssa(&mut cfg, &func, &frontier, &tree);
        cfg
    }

    fn phis_of(cfg: &ControlFlowGraph, label: &str) -> Vec<Operation> {
        cfg.block(label)
            .unwrap()
            .instrs
            .iter()
            .filter_map(Instruction::as_op)
            .filter(|op| op.is_phi())
            .cloned()
            .collect()
    }

    const DIAMOND: &str = r#"{"functions":[{"name":"d","args":[{"name":"c","type":"bool"}],"instrs":[
        {"label":"entry"},
        {"op":"br","args":["c"],"labels":["left","right"]},
        {"label":"left"},
        {"op":"const","dest":"x","type":"int","value":1},
        {"op":"jmp","labels":["join"]},
        {"label":"right"},
        {"op":"const","dest":"x","type":"int","value":2},
        {"op":"jmp","labels":["join"]},
        {"label":"join"},
        {"op":"print","args":["x"]},
        {"op":"ret"}
    ]}]}"#;

    #[test]
    fn test_diamond_phi_placement_and_order() {
        let cfg = ssa_cfg(DIAMOND);

        let phis = phis_of(&cfg, "join");
        assert_eq!(phis.len(), 1, "exactly one phi for x at the join");
        let phi = &phis[0];
        // The arg order must match the label order: left's value first.
        // (The phi's own version is minted when the join is visited, which
        // the sorted child order puts before either branch.)
        assert_eq!(phi.labels, vec!["left", "right"]);
        assert_eq!(phi.args, vec!["x.1", "x.2"]);
        assert_eq!(phi.dest.as_deref(), Some("x.0"));

        // No phis anywhere else.
        for label in ["entry", "left", "right"] {
            assert!(phis_of(&cfg, label).is_empty());
        }
    }

    #[test]
    fn test_diamond_versions() {
        let cfg = ssa_cfg(DIAMOND);
        let left = cfg.block("left").unwrap();
        assert_eq!(
            left.instrs[0].as_op().unwrap().dest.as_deref(),
            Some("x.1")
        );
        let right = cfg.block("right").unwrap();
        assert_eq!(
            right.instrs[0].as_op().unwrap().dest.as_deref(),
            Some("x.2")
        );
        // The join's read resolves to the phi's fresh version.
        let join = cfg.block("join").unwrap();
        let print = join.instrs[1].as_op().unwrap();
        assert_eq!(print.args, vec!["x.0"]);
    }

    #[test]
    fn test_parameters_enter_as_version_zero() {
        let cfg = ssa_cfg(
            r#"{"functions":[{"name":"f","args":[{"name":"p","type":"int"}],"instrs":[
                {"op":"print","args":["p"]},
                {"op":"const","dest":"p","type":"int","value":9},
                {"op":"print","args":["p"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let block = &cfg.blocks[0];
        let ops: Vec<&Operation> = block.instrs.iter().filter_map(Instruction::as_op).collect();
        // First read sees the raw parameter name; after the write, p.0.
        assert_eq!(ops[0].args, vec!["p"]);
        assert_eq!(ops[1].dest.as_deref(), Some("p.0"));
        assert_eq!(ops[2].args, vec!["p.0"]);
    }

    #[test]
    fn test_read_before_write_hits_sentinel() {
        let cfg = ssa_cfg(
            r#"{"functions":[{"name":"f","args":[{"name":"c","type":"bool"}],"instrs":[
                {"label":"top"},
                {"op":"br","args":["c"],"labels":["skip","defs"]},
                {"label":"defs"},
                {"op":"const","dest":"v","type":"int","value":1},
                {"op":"jmp","labels":["skip"]},
                {"label":"skip"},
                {"op":"print","args":["v"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let phis = phis_of(&cfg, "skip");
        assert_eq!(phis.len(), 1);
        // The path that skips the definition contributes the sentinel.
        assert!(phis[0].args.contains(&UNDEFINED_NAME.to_string()));
        assert!(phis[0].args.iter().any(|arg| arg == "v.0"));
    }

    #[test]
    fn test_loop_phi_from_back_edge() {
        let cfg = ssa_cfg(
            r#"{"functions":[{"name":"loopy","args":[{"name":"c","type":"bool"}],"instrs":[
                {"op":"const","dest":"i","type":"int","value":0},
                {"op":"jmp","labels":["head"]},
                {"label":"head"},
                {"op":"const","dest":"i","type":"int","value":1},
                {"op":"br","args":["c"],"labels":["head","done"]},
                {"label":"done"},
                {"op":"print","args":["i"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let phis = phis_of(&cfg, "head");
        assert_eq!(phis.len(), 1, "the loop header merges i across the back edge");
        assert_eq!(phis[0].labels.len(), 2);
        // done is dominated by head, so the exit read sees head's version.
        let done = cfg.block("done").unwrap();
        let print = done.instrs[0].as_op().unwrap();
        assert_ne!(print.args[0], "i");
    }

    // EDGE CASE: versions pop on subtree exit - a sibling never sees them
    #[test]
    fn test_sibling_does_not_leak_versions() {
        let cfg = ssa_cfg(DIAMOND);
        let right = cfg.block("right").unwrap();
        // right mints its own version rather than seeing left's x.1, and
        // the phi proves the stacks rolled back between siblings.
        assert_eq!(right.instrs[0].as_op().unwrap().dest.as_deref(), Some("x.2"));
        let phi = &phis_of(&cfg, "join")[0];
        assert_eq!(phi.args[0], "x.1");
    }
}
