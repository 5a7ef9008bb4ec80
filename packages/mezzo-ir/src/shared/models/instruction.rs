/*
 * Instruction Model
 *
 * Wire-format instruction types for the JSON-encoded IR.
 *
 * Two kinds of records appear in an instruction stream:
 * - labels:     {"label": "loop"}
 * - operations: {"op": "add", "dest": "sum", "type": "int", "args": ["a", "b"]}
 *
 * Unspecified fields are absent on the wire, never null.
 */

use serde::{Deserialize, Serialize};

/// Opcodes that end a basic block. At most one per block, always last.
pub const TERMINATORS: [&str; 3] = ["jmp", "br", "ret"];

/// A literal constant carried by `const` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Bool(bool),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// An executable operation.
///
/// `args` order is significant (non-commutative opcodes read operands in
/// order); `labels` order is significant for `br` (true target first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub op: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub op_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Literal>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl Operation {
    /// Bare operation with nothing but an opcode.
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            dest: None,
            op_type: None,
            args: Vec::new(),
            value: None,
            labels: Vec::new(),
        }
    }

    /// Unconditional jump to `target` (used by the fallthrough repair).
    pub fn jmp(target: impl Into<String>) -> Self {
        let mut op = Self::new("jmp");
        op.labels = vec![target.into()];
        op
    }

    /// Bare `ret` (used by the trailing-block repair).
    pub fn ret() -> Self {
        Self::new("ret")
    }

    /// `dest: type = id arg` copy (used by phi elimination).
    pub fn copy(dest: impl Into<String>, op_type: Option<String>, arg: impl Into<String>) -> Self {
        let mut op = Self::new("id");
        op.dest = Some(dest.into());
        op.op_type = op_type;
        op.args = vec![arg.into()];
        op
    }

    /// `dest: type = const value` (used by constant folding).
    pub fn constant(dest: impl Into<String>, op_type: Option<String>, value: Literal) -> Self {
        let mut op = Self::new("const");
        op.dest = Some(dest.into());
        op.op_type = op_type;
        op.value = Some(value);
        op
    }

    pub fn is_terminator(&self) -> bool {
        TERMINATORS.contains(&self.op.as_str())
    }

    pub fn is_phi(&self) -> bool {
        self.op == "phi"
    }
}

/// One record of an instruction stream: a jump-target marker or an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    Label { label: String },
    Op(Operation),
}

impl Instruction {
    pub fn label(name: impl Into<String>) -> Self {
        Instruction::Label { label: name.into() }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Instruction::Label { .. })
    }

    pub fn label_name(&self) -> Option<&str> {
        match self {
            Instruction::Label { label } => Some(label),
            Instruction::Op(_) => None,
        }
    }

    pub fn as_op(&self) -> Option<&Operation> {
        match self {
            Instruction::Op(op) => Some(op),
            Instruction::Label { .. } => None,
        }
    }

    pub fn as_op_mut(&mut self) -> Option<&mut Operation> {
        match self {
            Instruction::Op(op) => Some(op),
            Instruction::Label { .. } => None,
        }
    }

    pub fn is_terminator(&self) -> bool {
        self.as_op().is_some_and(Operation::is_terminator)
    }
}

impl From<Operation> for Instruction {
    fn from(op: Operation) -> Self {
        Instruction::Op(op)
    }
}
