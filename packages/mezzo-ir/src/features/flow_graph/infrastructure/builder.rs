/*
 * CFG Builder
 *
 * Single-scan block segmentation plus the two unconditional shape repairs:
 * - every block gets a terminator (fallthrough jmp, or ret for the last
 *   block);
 * - a synthetic empty entry block is prepended when the lexically first
 *   block is itself a branch target (the dominance engine requires an entry
 *   with no predecessors).
 *
 * The repairs are normalization, not error recovery: they encode algorithm
 * preconditions, so they run on well-formed input too.
 */

use ahash::{AHashMap, AHashSet};

use crate::features::flow_graph::domain::{BasicBlock, ControlFlowGraph};
use crate::shared::constants::UNDEFINED_NAME;
use crate::shared::models::{Function, Instruction};

use super::errors::{FlowGraphError, FlowGraphResult};

/// Build the control-flow graph of one function.
///
/// # Errors
///
/// `MalformedBranchTarget` when a jump/branch names a label no block
/// carries; `MalformedOperand` when an operand name is produced nowhere in
/// the function and is not a parameter. Both carry the function name for
/// per-function error containment.
pub fn build(function: &Function) -> FlowGraphResult<ControlFlowGraph> {
    let mut blocks = segment(&function.instrs);
    repair_terminators(&mut blocks);
    repair_entry(&mut blocks);
    validate(function, &blocks)?;
    let (succs, preds) = compute_edges(&blocks);
    Ok(ControlFlowGraph::new(
        function.name.clone(),
        blocks,
        succs,
        preds,
    ))
}

/// Partition a flat stream into blocks: a label starts a new block (the
/// current one is flushed first), a terminator always flushes. Blocks that
/// start without a label get a synthesized `bN` one, with the counter
/// bumped past any user label it would collide with.
fn segment(instrs: &[Instruction]) -> Vec<BasicBlock> {
    let used: AHashSet<&str> = instrs.iter().filter_map(Instruction::label_name).collect();
    let mut counter = 0usize;
    let mut next_label = move || loop {
        counter += 1;
        let candidate = format!("b{}", counter);
        if !used.contains(candidate.as_str()) {
            return candidate;
        }
    };

    let mut blocks: Vec<BasicBlock> = Vec::new();
    let mut current: Option<BasicBlock> = None;

    for instr in instrs {
        match instr {
            Instruction::Label { label } => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some(BasicBlock::new(label.clone()));
            }
            Instruction::Op(_) => {
                let block = current.get_or_insert_with(|| BasicBlock::new(next_label()));
                block.instrs.push(instr.clone());
                if instr.is_terminator() {
                    blocks.push(current.take().expect("block was just populated"));
                }
            }
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// Give every unterminated block a terminator: a jump to the lexically next
/// block, or a `ret` for the function's last block.
fn repair_terminators(blocks: &mut [BasicBlock]) {
    let labels: Vec<String> = blocks.iter().map(|block| block.label.clone()).collect();
    for (i, block) in blocks.iter_mut().enumerate() {
        if block.terminator().is_some() {
            continue;
        }
        let terminator = match labels.get(i + 1) {
            Some(next) => crate::shared::models::Operation::jmp(next.clone()),
            None => crate::shared::models::Operation::ret(),
        };
        block.instrs.push(terminator.into());
    }
}

/// Prepend a synthetic empty entry block when the first block has incoming
/// edges, so the entry never has predecessors.
fn repair_entry(blocks: &mut Vec<BasicBlock>) {
    let Some(first_label) = blocks.first().map(|block| block.label.clone()) else {
        return;
    };
    let targeted = blocks.iter().any(|block| {
        block
            .terminator()
            .and_then(Instruction::as_op)
            .is_some_and(|op| op.labels.contains(&first_label))
    });
    if !targeted {
        return;
    }

    let taken: AHashSet<&str> = blocks.iter().map(|block| block.label.as_str()).collect();
    let mut counter = 0usize;
    let entry_label = loop {
        counter += 1;
        let candidate = format!("entry{}", counter);
        if !taken.contains(candidate.as_str()) {
            break candidate;
        }
    };

    let mut entry = BasicBlock::new(entry_label);
    entry
        .instrs
        .push(crate::shared::models::Operation::jmp(first_label).into());
    blocks.insert(0, entry);
}

/// Best-effort malformed-IR detection over the segmented blocks.
fn validate(function: &Function, blocks: &[BasicBlock]) -> FlowGraphResult<()> {
    let block_labels: AHashSet<&str> = blocks.iter().map(|block| block.label.as_str()).collect();

    let mut defined: AHashSet<&str> = function.arg_names().collect();
    defined.insert(UNDEFINED_NAME);
    for block in blocks {
        for op in block.instrs.iter().filter_map(Instruction::as_op) {
            if let Some(dest) = &op.dest {
                defined.insert(dest);
            }
        }
    }

    for block in blocks {
        for op in block.instrs.iter().filter_map(Instruction::as_op) {
            for label in &op.labels {
                if !block_labels.contains(label.as_str()) {
                    return Err(FlowGraphError::MalformedBranchTarget {
                        function: function.name.clone(),
                        label: label.clone(),
                    });
                }
            }
            for arg in &op.args {
                if !defined.contains(arg.as_str()) {
                    return Err(FlowGraphError::MalformedOperand {
                        function: function.name.clone(),
                        block: block.label.clone(),
                        name: arg.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Successors from each block's terminator; predecessors as the transpose.
/// Duplicate targets are preserved (self-loops and multi-edges are legal).
fn compute_edges(
    blocks: &[BasicBlock],
) -> (AHashMap<String, Vec<String>>, AHashMap<String, Vec<String>>) {
    let mut succs: AHashMap<String, Vec<String>> = AHashMap::new();
    let mut preds: AHashMap<String, Vec<String>> = AHashMap::new();
    for block in blocks {
        succs.insert(block.label.clone(), Vec::new());
        preds.insert(block.label.clone(), Vec::new());
    }

    for block in blocks {
        let Some(op) = block.terminator().and_then(Instruction::as_op) else {
            continue;
        };
        let targets: &[String] = match op.op.as_str() {
            "jmp" | "br" => &op.labels,
            _ => &[], // ret
        };
        for target in targets {
            succs
                .get_mut(&block.label)
                .expect("every block label is seeded")
                .push(target.clone());
            preds
                .get_mut(target)
                .expect("targets are validated against block labels")
                .push(block.label.clone());
        }
    }
    (succs, preds)
}
