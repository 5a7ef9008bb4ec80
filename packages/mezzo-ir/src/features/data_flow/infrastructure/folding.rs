/*
 * Constant Folding
 *
 * Explicit, total evaluation of the four integer arithmetic opcodes over
 * i64 with wrapping semantics. Division by zero is the one undefined case
 * and is reported, never guessed. Constant propagation and local value
 * numbering both fold through this table.
 */

use ahash::AHashMap;
use once_cell::sync::Lazy;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

static ARITH_OPS: Lazy<AHashMap<&'static str, ArithOp>> = Lazy::new(|| {
    AHashMap::from_iter([
        ("add", ArithOp::Add),
        ("sub", ArithOp::Sub),
        ("mul", ArithOp::Mul),
        ("div", ArithOp::Div),
    ])
});

/// Classify an opcode as foldable integer arithmetic.
pub fn arith_op(op: &str) -> Option<ArithOp> {
    ARITH_OPS.get(op).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("division by zero on constant operands")]
pub struct DivisionByZero;

/// Fold one binary operation. Total except for division by zero; overflow
/// wraps (i64::MIN / -1 included).
pub fn fold(op: ArithOp, lhs: i64, rhs: i64) -> Result<i64, DivisionByZero> {
    match op {
        ArithOp::Add => Ok(lhs.wrapping_add(rhs)),
        ArithOp::Sub => Ok(lhs.wrapping_sub(rhs)),
        ArithOp::Mul => Ok(lhs.wrapping_mul(rhs)),
        ArithOp::Div => {
            if rhs == 0 {
                Err(DivisionByZero)
            } else {
                Ok(lhs.wrapping_div(rhs))
            }
        }
    }
}
