/*
 * Result Rendering
 *
 * Deterministic pretty-printing of per-block IN/OUT facts: empty facts
 * render as the distinguished ∅ marker, everything else as a sorted,
 * comma-joined listing. Output order follows CFG block order.
 */

use std::collections::{BTreeMap, BTreeSet};

use crate::features::data_flow::domain::{ConstValue, DataFlowResults};

/// A fact that knows how to print itself for the report.
pub trait RenderFact {
    fn render(&self) -> String;
}

impl RenderFact for BTreeSet<String> {
    fn render(&self) -> String {
        if self.is_empty() {
            "∅".to_string()
        } else {
            self.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

impl RenderFact for BTreeMap<String, ConstValue> {
    fn render(&self) -> String {
        if self.is_empty() {
            "∅".to_string()
        } else {
            self.iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// Render one analysis run the way the stock tools print it:
///
/// ```text
/// b1:
///   in:  ∅
///   out: v: 4
/// ```
pub fn render_results<F: RenderFact>(results: &DataFlowResults<F>) -> String {
    let mut out = String::new();
    for label in &results.labels {
        out.push_str(&format!("{}:\n", label));
        out.push_str(&format!("  in:  {}\n", results.ins[label].render()));
        out.push_str(&format!("  out: {}\n", results.outs[label].render()));
    }
    out
}
