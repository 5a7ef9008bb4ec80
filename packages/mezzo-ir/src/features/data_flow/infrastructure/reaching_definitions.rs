/*
 * Reaching Definitions
 *
 * Forward powerset analysis over variable names. Does not distinguish
 * assignments to the same variable: a name reaches a point if some
 * definition of it does.
 */

use std::collections::BTreeSet;

use crate::features::data_flow::ports::Lattice;
use crate::features::flow_graph::domain::BasicBlock;
use crate::shared::models::{Function, Instruction, Operation};

use super::errors::DataFlowResult;

pub struct ReachingDefinitions;

impl ReachingDefinitions {
    fn gen(op: &Operation) -> Option<&str> {
        op.dest.as_deref()
    }

    fn kill(op: &Operation) -> Option<&str> {
        op.dest.as_deref()
    }
}

impl Lattice for ReachingDefinitions {
    type Fact = BTreeSet<String>;

    /// Parameters are definitions that reach the entry.
    fn initial(&self, function: &Function) -> Self::Fact {
        function.arg_names().map(String::from).collect()
    }

    fn is_forward(&self) -> bool {
        true
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
        for op in block.instrs.iter().filter_map(Instruction::as_op) {
            if let Some(killed) = Self::kill(op) {
                fact.remove(killed);
            }
            if let Some(genned) = Self::gen(op) {
                fact.insert(genned.to_string());
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

    #[test]
    fn test_transfer_gens_definitions() {
        let block = block_of(
            r#"{"functions":[{"name":"f","instrs":[
                {"op":"const","dest":"a","type":"int","value":1},
                {"op":"const","dest":"b","type":"int","value":2},
                {"op":"ret"}
            ]}]}"#,
        );
        let out = ReachingDefinitions
            .transfer(BTreeSet::new(), &block)
            .unwrap();
        assert_eq!(out.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_merge_is_union() {
        let left: BTreeSet<String> = ["a".to_string()].into();
        let right: BTreeSet<String> = ["b".to_string()].into();
        let merged = ReachingDefinitions.merge(vec![&left, &right]);
        assert_eq!(merged.len(), 2);
    }

    // EDGE CASE: empty merge (the entry block) yields the empty set
    #[test]
    fn test_empty_merge() {
        assert!(ReachingDefinitions.merge(vec![]).is_empty());
    }
}
