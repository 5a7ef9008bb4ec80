/*
 * CFG (Control Flow Graph) Domain Model
 *
 * Blocks in insertion order (= lexical order of the source stream) plus
 * label-keyed successor/predecessor adjacency. Built once per function and
 * read-only afterwards; only the SSA converter rewrites block contents.
 */

use ahash::AHashMap;

use crate::shared::models::Instruction;

/// A maximal straight-line run of operations with one entry label and at
/// most one exit terminator. The label lives beside the instructions, not
/// inside them; `flatten` re-emits it as a wire-format label record.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub label: String,
    pub instrs: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instrs: Vec::new(),
        }
    }

    /// The block's terminator, if its last instruction is one.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instrs.last().filter(|instr| instr.is_terminator())
    }
}

/// Control-flow graph of a single function.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    /// Owning function name, carried for error reporting.
    pub function: String,
    /// Blocks in block order (insertion order = lexical order).
    pub blocks: Vec<BasicBlock>,
    /// label -> ordered successors; duplicates preserved (multi-edges legal).
    pub succs: AHashMap<String, Vec<String>>,
    /// label -> ordered predecessors; transpose of `succs`.
    pub preds: AHashMap<String, Vec<String>>,

    index: AHashMap<String, usize>,
}

impl ControlFlowGraph {
    pub fn new(
        function: String,
        blocks: Vec<BasicBlock>,
        succs: AHashMap<String, Vec<String>>,
        preds: AHashMap<String, Vec<String>>,
    ) -> Self {
        let index = blocks
            .iter()
            .enumerate()
            .map(|(i, block)| (block.label.clone(), i))
            .collect();
        Self {
            function,
            blocks,
            succs,
            preds,
            index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Entry label: the first block in block order.
    pub fn entry_label(&self) -> Option<&str> {
        self.blocks.first().map(|block| block.label.as_str())
    }

    /// Block labels in block order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|block| block.label.as_str())
    }

    pub fn block(&self, label: &str) -> Option<&BasicBlock> {
        self.index.get(label).map(|&i| &self.blocks[i])
    }

    pub fn block_mut(&mut self, label: &str) -> Option<&mut BasicBlock> {
        let i = *self.index.get(label)?;
        Some(&mut self.blocks[i])
    }

    pub fn succs_of(&self, label: &str) -> &[String] {
        self.succs.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn preds_of(&self, label: &str) -> &[String] {
        self.preds.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Re-emit the flat instruction stream: each block's label record
    /// followed by its instructions. Synthesized labels and terminators
    /// become ordinary instructions here.
    pub fn flatten(&self) -> Vec<Instruction> {
        let mut instrs = Vec::new();
        for block in &self.blocks {
            instrs.push(Instruction::label(block.label.clone()));
            instrs.extend(block.instrs.iter().cloned());
        }
        instrs
    }

    /// Graphviz rendering: one node line per block, one edge line per
    /// successor, in block order.
    pub fn to_dot(&self) -> String {
        let mut out = format!("digraph {} {{\n", self.function);
        for block in &self.blocks {
            out.push_str(&format!("  {}\n", block.label));
        }
        for block in &self.blocks {
            for succ in self.succs_of(&block.label) {
                out.push_str(&format!("  {} -> {}\n", block.label, succ));
            }
        }
        out.push('}');
        out
    }
}
