/*
 * Trivial Dead-Code Elimination
 *
 * Two flavors:
 * - tdce: whole-stream removal of instructions whose destination is never
 *   read, iterated to convergence (removing a consumer can orphan its
 *   producers, so one pass is not enough);
 * - drop_killed_local: per-block removal of definitions overwritten before
 *   any intervening read.
 */

use ahash::{AHashMap, AHashSet};

use crate::shared::models::Instruction;

/// Remove instructions whose destination is never used as an operand
/// anywhere in the stream; repeat until a full pass removes nothing.
pub fn tdce(instrs: &mut Vec<Instruction>) {
    loop {
        let used: AHashSet<&str> = instrs
            .iter()
            .filter_map(Instruction::as_op)
            .flat_map(|op| op.args.iter().map(String::as_str))
            .collect();

        let keep: Vec<bool> = instrs
            .iter()
            .map(|instr| match instr.as_op().and_then(|op| op.dest.as_deref()) {
                Some(dest) => used.contains(dest),
                None => true,
            })
            .collect();
        if keep.iter().all(|&k| k) {
            break;
        }

        let mut index = 0;
        instrs.retain(|_| {
            let kept = keep[index];
            index += 1;
            kept
        });
    }
}

/// Remove definitions that are overwritten later in the same block with no
/// read in between. Block-local: reads in other blocks are invisible, so
/// this is only sound inside one basic block.
pub fn drop_killed_local(instrs: &mut Vec<Instruction>) {
    let mut last_def: AHashMap<String, usize> = AHashMap::new();
    let mut dead: AHashSet<usize> = AHashSet::new();

    for (i, instr) in instrs.iter().enumerate() {
        let Some(op) = instr.as_op() else { continue };
        for arg in &op.args {
            last_def.remove(arg);
        }
        if let Some(dest) = &op.dest {
            if let Some(previous) = last_def.insert(dest.clone(), i) {
                dead.insert(previous);
            }
        }
    }
    if dead.is_empty() {
        return;
    }

    let mut index = 0;
    instrs.retain(|_| {
        let kept = !dead.contains(&index);
        index += 1;
        kept
    });
}
