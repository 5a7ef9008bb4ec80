//! Data Flow domain model

use std::collections::BTreeMap;

use crate::shared::models::Literal;

/// Abstract value of constant propagation: a known literal, or the
/// distinguished "not a constant" marker two disagreeing paths merge into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstValue {
    Known(Literal),
    NotConstant,
}

impl std::fmt::Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstValue::Known(literal) => write!(f, "{}", literal),
            ConstValue::NotConstant => write!(f, "?"),
        }
    }
}

/// Per-block IN/OUT facts of one analysis run, keyed by block label.
///
/// `labels` preserves CFG block order for deterministic rendering; the fact
/// maps are owned by the engine for the duration of one run and handed to
/// the caller whole.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFlowResults<F> {
    pub labels: Vec<String>,
    pub ins: BTreeMap<String, F>,
    pub outs: BTreeMap<String, F>,
}
