/*
 * Local Value Numbering
 *
 * Single-block redundancy elimination. Each destination instruction gets a
 * value number; instructions computing an already-numbered value are
 * rewritten to `id` copies of the first computation. Redefinition of a
 * variable evicts the older numbering to a fresh `lvn.N` home (and renames
 * the instruction that computed it), so earlier reads keep a name that
 * still exists.
 *
 * Numberings live in one growable vector and reference each other by
 * index; value equality goes through the table, alias chains through
 * indices.
 *
 * Optional behaviors:
 * - fold_constants: arithmetic whose operands chase to integer constants
 *   collapses to a `const` (literal division by zero is malformed IR);
 * - propagate_copies: operands chase through id/const chains;
 * - eliminate_dead: block-local DCE to convergence after rewriting.
 */

use ahash::{AHashMap, AHashSet};

use crate::features::data_flow::infrastructure::folding::{arith_op, fold};
use crate::shared::models::{Instruction, Literal, Operation};

use super::errors::{LocalOptError, LocalOptResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct LvnOptions {
    pub eliminate_dead: bool,
    pub propagate_copies: bool,
    pub fold_constants: bool,
}

/// An operand of an encoded value: a local value number, or a name defined
/// outside the block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum ValueOperand {
    Number(usize),
    Name(String),
}

/// Opcodes whose operand order does not matter; only these get their
/// operands canonically sorted in the value encoding.
const COMMUTATIVE_OPS: [&str; 5] = ["add", "mul", "eq", "and", "or"];

/// Canonical value of an instruction, the key of the value table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ValueKey {
    Literal { op: String, literal: Literal },
    Expr { op: String, operands: Vec<ValueOperand> },
}

/// One numbered value; its number is its index in the numbering vector.
#[derive(Debug, Clone)]
struct Numbering {
    home: String,
    value: ValueKey,
    alias: Option<usize>,
}

/// What an instruction carries into the rewrite pass.
#[derive(Debug, Clone)]
enum Attachment {
    /// Destination instruction: index into the numbering vector.
    Table(usize),
    /// No destination (print, br, ret): just the encoded value.
    Inline(ValueKey),
}

/// Where an operand chase through id/const chains ends.
enum Chase {
    Const(usize, Literal),
    Name(String),
    Other(usize),
}

/// Run LVN over one basic block's instruction list.
pub fn local_value_numbering(
    instrs: &mut Vec<Instruction>,
    options: LvnOptions,
) -> LocalOptResult<()> {
    let mut numberings: Vec<Numbering> = Vec::new();
    let mut value_table: AHashMap<ValueKey, usize> = AHashMap::new();
    let mut homes: AHashMap<String, usize> = AHashMap::new();
    let mut attachments: Vec<Option<Attachment>> = vec![None; instrs.len()];

    // Pass 1: number every value, resolving home conflicts.
    for (i, instr) in instrs.iter().enumerate() {
        let Some(op) = instr.as_op() else { continue };
        if op.op == "jmp" {
            continue;
        }

        // Encode against the pre-instruction state so `x = add x y` reads
        // the incoming x, not itself.
        let value = encode(op, &numberings, &homes);

        let Some(dest) = op.dest.clone() else {
            attachments[i] = Some(Attachment::Inline(value));
            continue;
        };

        // Folding also reads the pre-instruction state; the destination is
        // not registered yet.
        let folded = if options.fold_constants {
            try_fold(op, &numberings, &homes)?
        } else {
            None
        };

        let number = numberings.len();

        if let Some(previous) = homes.remove(&dest) {
            let renamed = format!("lvn.{}", previous);
            numberings[previous].home = renamed.clone();
            homes.insert(renamed, previous);
        }
        homes.insert(dest.clone(), number);

        let mut numbering = Numbering {
            home: dest.clone(),
            value: value.clone(),
            alias: None,
        };

        let canonical = match folded {
            Some(literal) => ValueKey::Literal {
                op: "const".to_string(),
                literal,
            },
            None => value,
        };

        match value_table.get(&canonical) {
            Some(&existing) => {
                numbering.value = ValueKey::Expr {
                    op: "id".to_string(),
                    operands: vec![ValueOperand::Number(existing)],
                };
                numbering.alias = Some(existing);
            }
            None => {
                numbering.value = canonical.clone();
                value_table.insert(canonical, number);
            }
        }

        numberings.push(numbering);
        attachments[i] = Some(Attachment::Table(number));
    }

    // Pass 2: rewrite the block from the numberings.
    for (i, instr) in instrs.iter_mut().enumerate() {
        let Some(attachment) = &attachments[i] else { continue };
        let op = instr.as_op_mut().expect("only operations are numbered");

        let value = match attachment {
            Attachment::Table(number) => {
                let numbering = &numberings[*number];
                op.dest = Some(numbering.home.clone());
                numbering.value.clone()
            }
            Attachment::Inline(value) => value.clone(),
        };

        match value {
            ValueKey::Literal { op: value_op, literal } => {
                op.op = value_op;
                op.value = Some(literal);
                op.args.clear();
            }
            ValueKey::Expr { op: value_op, operands } => {
                op.op = value_op;
                if options.propagate_copies {
                    rewrite_propagating(op, &operands, &numberings);
                } else {
                    op.args = operands
                        .iter()
                        .map(|operand| match operand {
                            ValueOperand::Number(number) => numberings[*number].home.clone(),
                            ValueOperand::Name(name) => name.clone(),
                        })
                        .collect();
                }
            }
        }
    }

    // Pass 3: block-local cleanup.
    if options.eliminate_dead {
        eliminate_dead(instrs, options.propagate_copies);
    }
    Ok(())
}

/// Encode an instruction's value: literal carriers keep their literal;
/// everything else is the opcode over alias-chased operands. Only
/// commutative opcodes get their operands sorted - operand order is
/// significant everywhere else.
fn encode(op: &Operation, numberings: &[Numbering], homes: &AHashMap<String, usize>) -> ValueKey {
    if let Some(literal) = op.value {
        return ValueKey::Literal {
            op: op.op.clone(),
            literal,
        };
    }

    let mut operands: Vec<ValueOperand> = op
        .args
        .iter()
        .map(|arg| match homes.get(arg.as_str()) {
            Some(&index) => {
                let mut number = index;
                while let Some(alias) = numberings[number].alias {
                    number = alias;
                }
                ValueOperand::Number(number)
            }
            None => ValueOperand::Name(arg.clone()),
        })
        .collect();
    if COMMUTATIVE_OPS.contains(&op.op.as_str()) {
        operands.sort();
    }
    ValueKey::Expr {
        op: op.op.clone(),
        operands,
    }
}

/// Fold arithmetic whose operands (in source order) all chase to integer
/// constants.
fn try_fold(
    op: &Operation,
    numberings: &[Numbering],
    homes: &AHashMap<String, usize>,
) -> LocalOptResult<Option<Literal>> {
    let Some(arith) = arith_op(&op.op) else {
        return Ok(None);
    };

    let mut operands = Vec::with_capacity(op.args.len());
    for arg in &op.args {
        let Some(&index) = homes.get(arg.as_str()) else {
            return Ok(None);
        };
        match chase(index, numberings) {
            Chase::Const(_, Literal::Int(value)) => operands.push(value),
            _ => return Ok(None),
        }
    }
    let [lhs, rhs] = operands.as_slice() else {
        return Ok(None);
    };

    let folded = fold(arith, *lhs, *rhs).map_err(|_| LocalOptError::DivisionByZero {
        dest: op.dest.clone().unwrap_or_default(),
    })?;
    Ok(Some(Literal::Int(folded)))
}

/// Follow id/const chains by numbering index. Chains only point backwards,
/// so this terminates.
fn chase(mut index: usize, numberings: &[Numbering]) -> Chase {
    loop {
        match &numberings[index].value {
            ValueKey::Literal { op, literal } if op == "const" => {
                return Chase::Const(index, *literal);
            }
            ValueKey::Expr { op, operands } if op == "id" => match operands.as_slice() {
                [ValueOperand::Number(next)] => index = *next,
                [ValueOperand::Name(name)] => return Chase::Name(name.clone()),
                _ => return Chase::Other(index),
            },
            _ => return Chase::Other(index),
        }
    }
}

/// Operand rewriting with copy propagation: an `id` of a constant becomes
/// the constant itself; other operands land on the chased home.
fn rewrite_propagating(op: &mut Operation, operands: &[ValueOperand], numberings: &[Numbering]) {
    let mut args = Vec::with_capacity(operands.len());
    for operand in operands {
        match operand {
            ValueOperand::Name(name) => args.push(name.clone()),
            ValueOperand::Number(number) => match chase(*number, numberings) {
                Chase::Const(index, literal) => {
                    if op.op == "id" {
                        op.op = "const".to_string();
                        op.value = Some(literal);
                        op.args.clear();
                        return;
                    }
                    args.push(numberings[index].home.clone());
                }
                Chase::Name(name) => args.push(name),
                Chase::Other(index) => args.push(numberings[index].home.clone()),
            },
        }
    }
    op.args = args;
}

/// Block-local trivial DCE to convergence. With copy propagation done, id
/// copies are bypassed by their consumers, so their reads do not keep
/// values alive; without it they must count as uses.
fn eliminate_dead(instrs: &mut Vec<Instruction>, ignore_copy_reads: bool) {
    loop {
        let used: AHashSet<&str> = instrs
            .iter()
            .filter_map(Instruction::as_op)
            .filter(|op| !(ignore_copy_reads && op.op == "id"))
            .flat_map(|op| op.args.iter().map(String::as_str))
            .collect();

        let keep: Vec<bool> = instrs
            .iter()
            .map(|instr| match instr.as_op().and_then(|op| op.dest.as_deref()) {
                Some(dest) => used.contains(dest),
                None => true,
            })
            .collect();
        if keep.iter().all(|&kept| kept) {
            return;
        }

        let mut index = 0;
        instrs.retain(|_| {
            let kept = keep[index];
            index += 1;
            kept
        });
    }
}
