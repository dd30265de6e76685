// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator definitions.
//!
//! An [`OperatorDef`] names the computation to run ([`OpCode`]) and the
//! tensors it reads and writes. Operands are tensor indices; `None` marks an
//! optional operand the graph omits.

use std::fmt;

/// The kind of computation an operator performs.
///
/// Codes are resolved to kernels by the runtime's op resolver, so any name
/// not built in is carried as [`OpCode::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OpCode {
    /// Elementwise addition.
    Add,
    /// Elementwise multiplication.
    Mul,
    /// An operator registered under a custom name.
    Custom(String),
}

impl OpCode {
    /// Parses an operator code from a manifest string.
    ///
    /// Built-in codes are matched case-insensitively; anything else becomes
    /// a custom code with the name kept verbatim.
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "add" => Self::Add,
            "mul" | "multiply" => Self::Mul,
            _ => Self::Custom(s.to_string()),
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Add => "add",
            Self::Mul => "mul",
            Self::Custom(name) => name,
        }
    }
}

impl From<String> for OpCode {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<OpCode> for String {
    fn from(code: OpCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operator of the graph, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OperatorDef {
    /// Operator name, used in diagnostics and profiler events.
    pub name: String,
    /// What to compute.
    pub code: OpCode,
    /// Input tensor indices; `None` for an omitted optional input.
    pub inputs: Vec<Option<usize>>,
    /// Output tensor indices; `None` for an omitted optional output.
    pub outputs: Vec<Option<usize>>,
}

impl OperatorDef {
    pub fn new(
        name: impl Into<String>,
        code: OpCode,
        inputs: Vec<Option<usize>>,
        outputs: Vec<Option<usize>>,
    ) -> Self {
        Self {
            name: name.into(),
            code,
            inputs,
            outputs,
        }
    }

    /// Indices of the inputs that are present.
    pub fn input_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.inputs.iter().flatten().copied()
    }

    /// Indices of the outputs that are present.
    pub fn output_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.outputs.iter().flatten().copied()
    }

    /// Returns a one-line summary.
    pub fn summary(&self) -> String {
        fn operands(ids: &[Option<usize>]) -> String {
            ids.iter()
                .map(|id| id.map_or_else(|| "-".to_string(), |i| format!("t{i}")))
                .collect::<Vec<_>>()
                .join(", ")
        }
        format!(
            "{} ({}): [{}] -> [{}]",
            self.name,
            self.code,
            operands(&self.inputs),
            operands(&self.outputs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(OpCode::from_name("ADD"), OpCode::Add);
        assert_eq!(OpCode::from_name("multiply"), OpCode::Mul);
        assert_eq!(
            OpCode::from_name("mock_custom"),
            OpCode::Custom("mock_custom".into())
        );
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&OpCode::custom("no_op")).unwrap();
        assert_eq!(json, "\"no_op\"");
        let back: OpCode = serde_json::from_str("\"add\"").unwrap();
        assert_eq!(back, OpCode::Add);
    }

    #[test]
    fn test_operand_ids_skip_omitted() {
        let op = OperatorDef::new("op", OpCode::Add, vec![Some(0), None, Some(2)], vec![None]);
        assert_eq!(op.input_ids().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(op.output_ids().count(), 0);
    }

    #[test]
    fn test_summary() {
        let op = OperatorDef::new("op0", OpCode::Mul, vec![Some(0), None], vec![Some(1)]);
        assert_eq!(op.summary(), "op0 (mul): [t0, -] -> [t1]");
    }
}
