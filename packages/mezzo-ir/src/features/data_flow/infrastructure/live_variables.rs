/*
 * Live Variables
 *
 * Backward powerset analysis: a name is live at a point if some path to a
 * use avoids every intervening redefinition. Instructions fold in reverse
 * order; a definition kills liveness before the instruction's own reads
 * re-gen it, so `x = add x y` still keeps x live above itself.
 */

use std::collections::BTreeSet;

use crate::features::data_flow::ports::Lattice;
use crate::features::flow_graph::domain::BasicBlock;
use crate::shared::models::{Function, Instruction};

use super::errors::DataFlowResult;

pub struct LiveVariables;

impl Lattice for LiveVariables {
    type Fact = BTreeSet<String>;

    fn initial(&self, _function: &Function) -> Self::Fact {
        BTreeSet::new()
    }

    fn is_forward(&self) -> bool {
        false
    }

    fn merge(&self, facts: Vec<&Self::Fact>) -> Self::Fact {
        let mut merged = BTreeSet::new();
        for fact in facts {
            merged.extend(fact.iter().cloned());
        }
        merged
    }

    fn transfer(&self, incoming: Self::Fact, block: &BasicBlock) -> DataFlowResult<Self::Fact> {
        let mut fact = incoming;
        for op in block.instrs.iter().rev().filter_map(Instruction::as_op) {
            if let Some(dest) = &op.dest {
                fact.remove(dest); // kill: the definition ends liveness
            }
            for arg in &op.args {
                fact.insert(arg.clone()); // gen: reads make operands live
            }
        }
        Ok(fact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Program;
    use pretty_assertions::assert_eq;

    fn block_of(json: &str) -> BasicBlock {
        let func = Program::from_json(json).unwrap().functions.remove(0);
        let cfg = crate::features::flow_graph::infrastructure::builder::build(&func).unwrap();
        cfg.blocks.into_iter().next().unwrap()
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_use_gens_liveness() {
        let block = block_of(
            r#"{"functions":[{"name":"f","args":[{"name":"a","type":"int"}],"instrs":[
                {"op":"print","args":["a"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let live = LiveVariables.transfer(BTreeSet::new(), &block).unwrap();
        assert_eq!(live, names(&["a"]));
    }

    #[test]
    fn test_definition_kills_liveness() {
        let block = block_of(
            r#"{"functions":[{"name":"f","instrs":[
                {"op":"const","dest":"a","type":"int","value":1},
                {"op":"print","args":["a"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let live = LiveVariables.transfer(BTreeSet::new(), &block).unwrap();
        assert!(live.is_empty(), "a is defined before its only use");
    }

    // EDGE CASE: self-referential update keeps the operand live above
    #[test]
    fn test_self_update_stays_live() {
        let block = block_of(
            r#"{"functions":[{"name":"f","args":[{"name":"x","type":"int"},{"name":"y","type":"int"}],"instrs":[
                {"op":"add","dest":"x","type":"int","args":["x","y"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let live = LiveVariables.transfer(BTreeSet::new(), &block).unwrap();
        assert_eq!(live, names(&["x", "y"]));
    }
}
