/*
 * Constant Propagation
 *
 * Forward mapping analysis: variable name -> known literal or the
 * "not-constant" marker. Merge keeps a binding only when every input that
 * mentions it agrees; a key present in a single input is carried through
 * unchanged (no conflicting information yet, not a kill).
 *
 * The transfer kills the written name before evaluating the instruction's
 * gen, so an instruction that reads its own destination sees the killed
 * state. Unknown opcodes are uninterpreted black boxes: their destination
 * conservatively goes to NotConstant, never an error.
 */

use std::collections::BTreeMap;

use crate::features::data_flow::domain::ConstValue;
use crate::features::data_flow::ports::Lattice;
use crate::features::flow_graph::domain::BasicBlock;
use crate::shared::models::{Function, Instruction, Literal, Operation};

use super::errors::{DataFlowError, DataFlowResult};
use super::folding::{arith_op, fold};

pub struct ConstantPropagation;

impl ConstantPropagation {
    /// The abstract value an operation writes, given the already-killed map.
    fn gen(
        op: &Operation,
        fact: &BTreeMap<String, ConstValue>,
        block_label: &str,
    ) -> DataFlowResult<Option<ConstValue>> {
        let Some(dest) = &op.dest else {
            return Ok(None);
        };

        if op.op == "const" {
            return Ok(Some(match op.value {
                Some(literal) => ConstValue::Known(literal),
                None => ConstValue::NotConstant,
            }));
        }

        if let Some(arith) = arith_op(&op.op) {
            let mut operands = Vec::with_capacity(op.args.len());
            for arg in &op.args {
                match fact.get(arg) {
                    Some(ConstValue::Known(Literal::Int(value))) => operands.push(*value),
                    // Unknown, not-constant, or non-integer operand.
                    _ => return Ok(Some(ConstValue::NotConstant)),
                }
            }
            if let [lhs, rhs] = operands.as_slice() {
                let folded = fold(arith, *lhs, *rhs).map_err(|_| DataFlowError::DivisionByZero {
                    block: block_label.to_string(),
                    dest: dest.clone(),
                })?;
                return Ok(Some(ConstValue::Known(Literal::Int(folded))));
            }
            return Ok(Some(ConstValue::NotConstant));
        }

        // Uninterpreted opcode with a destination.
        Ok(Some(ConstValue::NotConstant))
    }
}

impl Lattice for ConstantPropagation {
    type Fact = BTreeMap<String, ConstValue>;

    fn initial(&self, _function: &Function) -> Self::Fact {
        BTreeMap::new()
    }

    fn is_forward(&self) -> bool {
        true
    }

    fn merge(&self, facts: Vec<&Self::Fact>) -> Self::Fact {
        let mut merged: Self::Fact = BTreeMap::new();
        for fact in facts {
            for (name, value) in fact.iter() {
                match merged.get(name) {
                    None => {
                        merged.insert(name.clone(), *value);
                    }
                    Some(existing) if existing == value => {}
                    Some(_) => {
                        merged.insert(name.clone(), ConstValue::NotConstant);
                    }
                }
            }
        }
        merged
    }

    fn transfer(&self, incoming: Self::Fact, block: &BasicBlock) -> DataFlowResult<Self::Fact> {
        let mut fact = incoming;
        for op in block.instrs.iter().filter_map(Instruction::as_op) {
            if let Some(dest) = &op.dest {
                fact.insert(dest.clone(), ConstValue::NotConstant); // kill
            }
            if let Some(value) = Self::gen(op, &fact, &block.label)? {
                let dest = op.dest.as_ref().expect("gen only fires with a dest");
                fact.insert(dest.clone(), value);
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

    fn known(value: i64) -> ConstValue {
        ConstValue::Known(Literal::Int(value))
    }

    #[test]
    fn test_const_and_fold() {
        let block = block_of(
            r#"{"functions":[{"name":"f","instrs":[
                {"op":"const","dest":"a","type":"int","value":2},
                {"op":"const","dest":"b","type":"int","value":3},
                {"op":"add","dest":"c","type":"int","args":["a","b"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let out = ConstantPropagation.transfer(BTreeMap::new(), &block).unwrap();
        assert_eq!(out["a"], known(2));
        assert_eq!(out["b"], known(3));
        assert_eq!(out["c"], known(5));
    }

    #[test]
    fn test_unknown_opcode_is_black_box() {
        let block = block_of(
            r#"{"functions":[{"name":"f","args":[{"name":"p","type":"int"}],"instrs":[
                {"op":"mystery","dest":"x","type":"int","args":["p"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let out = ConstantPropagation.transfer(BTreeMap::new(), &block).unwrap();
        assert_eq!(out["x"], ConstValue::NotConstant);
    }

    #[test]
    fn test_division_by_zero_is_malformed() {
        let block = block_of(
            r#"{"functions":[{"name":"f","instrs":[
                {"op":"const","dest":"a","type":"int","value":1},
                {"op":"const","dest":"z","type":"int","value":0},
                {"op":"div","dest":"boom","type":"int","args":["a","z"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let err = ConstantPropagation
            .transfer(BTreeMap::new(), &block)
            .unwrap_err();
        assert!(matches!(err, DataFlowError::DivisionByZero { ref dest, .. } if dest == "boom"));
    }

    #[test]
    fn test_merge_agreement_and_conflict() {
        let left: BTreeMap<String, ConstValue> =
            [("same".to_string(), known(1)), ("diff".to_string(), known(2))].into();
        let right: BTreeMap<String, ConstValue> =
            [("same".to_string(), known(1)), ("diff".to_string(), known(3))].into();

        let merged = ConstantPropagation.merge(vec![&left, &right]);
        assert_eq!(merged["same"], known(1));
        assert_eq!(merged["diff"], ConstValue::NotConstant);
    }

    // EDGE CASE: a key known on only one path is carried through, not killed
    #[test]
    fn test_merge_one_sided_key_carries() {
        let left: BTreeMap<String, ConstValue> = [("only".to_string(), known(7))].into();
        let right: BTreeMap<String, ConstValue> = BTreeMap::new();

        let merged = ConstantPropagation.merge(vec![&left, &right]);
        assert_eq!(merged["only"], known(7));
    }

    // EDGE CASE: reading your own destination sees the killed state
    #[test]
    fn test_self_read_sees_kill() {
        let block = block_of(
            r#"{"functions":[{"name":"f","instrs":[
                {"op":"const","dest":"x","type":"int","value":1},
                {"op":"add","dest":"x","type":"int","args":["x","x"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let out = ConstantPropagation.transfer(BTreeMap::new(), &block).unwrap();
        // The kill lands before the gen evaluates its operands.
        assert_eq!(out["x"], ConstValue::NotConstant);
    }

    // EDGE CASE: boolean operands never fold as integers
    #[test]
    fn test_bool_operand_not_folded() {
        let block = block_of(
            r#"{"functions":[{"name":"f","instrs":[
                {"op":"const","dest":"flag","type":"bool","value":true},
                {"op":"const","dest":"one","type":"int","value":1},
                {"op":"add","dest":"x","type":"int","args":["flag","one"]},
                {"op":"ret"}
            ]}]}"#,
        );
        let out = ConstantPropagation.transfer(BTreeMap::new(), &block).unwrap();
        assert_eq!(out["x"], ConstValue::NotConstant);
    }
}
