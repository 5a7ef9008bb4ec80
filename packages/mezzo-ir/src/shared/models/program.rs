/*
 * Program Model
 *
 * Top-level wire format: a program is a named list of functions, each
 * carrying a flat instruction stream. Bodies are rewritten in place by
 * passes; the function name is its identity across passes.
 */

use serde::{Deserialize, Serialize};

use super::instruction::Instruction;

/// A formal parameter of a function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionArg {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub arg_type: Option<String>,
}

/// A function: identity, parameters, and a flat instruction stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<FunctionArg>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,

    #[serde(default)]
    pub instrs: Vec<Instruction>,
}

impl Function {
    pub fn new(name: impl Into<String>, instrs: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            return_type: None,
            instrs,
        }
    }

    /// Parameter names in declaration order.
    pub fn arg_names(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|arg| arg.name.as_str())
    }
}

/// A whole program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Pretty-printed JSON, matching the indent-2 dumps consumers expect.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
