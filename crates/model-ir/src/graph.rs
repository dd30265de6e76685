// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: tensors plus operators in a fixed execution order.
//!
//! # Type-State Pattern
//!
//! The graph transitions through states enforced at compile time:
//!
//! ```text
//! ModelGraph<Loaded>      tensors and operators parsed, not yet checked.
//!       │  .validate()
//!       ▼
//! ModelGraph<Validated>   operands checked, ready for memory planning.
//! ```
//!
//! The planner and the interpreter only accept `ModelGraph<Validated>`, so
//! they never see dangling tensor indices or read-before-write activations.

use crate::{ModelError, OperatorDef, TensorDef, TensorKind};
use std::fmt;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been loaded but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated and is ready for planning.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── ModelGraph ─────────────────────────────────────────────────────

/// A static computation graph.
///
/// Operators run in the order they are listed. The generic parameter `S`
/// encodes the validation state at compile time.
#[derive(Debug, Clone)]
pub struct ModelGraph<S: GraphState = Loaded> {
    /// Human-readable model name.
    pub name: String,
    /// All tensors, addressed by index.
    pub tensors: Vec<TensorDef>,
    /// Operators in execution order.
    pub operators: Vec<OperatorDef>,
    /// Graph input tensor indices.
    pub inputs: Vec<usize>,
    /// Graph output tensor indices.
    pub outputs: Vec<usize>,
    /// State marker (zero-sized, compile-time only).
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl ModelGraph<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(
        name: impl Into<String>,
        tensors: Vec<TensorDef>,
        operators: Vec<OperatorDef>,
        inputs: Vec<usize>,
        outputs: Vec<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            tensors,
            operators,
            inputs,
            outputs,
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - Every tensor index is in range.
    /// - Every tensor's byte size fits in `isize::MAX`.
    /// - Constant data is exactly `shape × dtype` bytes, and no tensor is
    ///   both constant and variable.
    /// - Graph inputs are neither constants nor variables.
    /// - Every activation an operator reads is a graph input or was written
    ///   by an earlier operator.
    /// - Operators only write activations, each activation is written once,
    ///   and an operator never reads and writes the same tensor.
    /// - A variable appears at most once among an operator's inputs.
    /// - Every graph output is a graph input, a constant, a variable, or
    ///   written by some operator.
    pub fn validate(self) -> Result<ModelGraph<Validated>, ModelError> {
        let n = self.tensors.len();

        for t in &self.tensors {
            match t.shape.checked_size_bytes(t.dtype) {
                Some(bytes) if bytes <= isize::MAX as usize => {}
                _ => {
                    return Err(ModelError::InvalidTensor {
                        tensor: t.name.clone(),
                        detail: format!(
                            "shape {} of {} is too large to address",
                            t.shape, t.dtype
                        ),
                    })
                }
            }
            if let Some(data) = &t.data {
                if t.is_variable {
                    return Err(ModelError::InvalidTensor {
                        tensor: t.name.clone(),
                        detail: "a tensor cannot be both constant and variable".into(),
                    });
                }
                if data.len() != t.size_bytes() {
                    return Err(ModelError::InvalidTensor {
                        tensor: t.name.clone(),
                        detail: format!(
                            "constant data is {} bytes, shape {} of {} needs {}",
                            data.len(),
                            t.shape,
                            t.dtype,
                            t.size_bytes(),
                        ),
                    });
                }
            }
        }

        for &id in self.inputs.iter().chain(&self.outputs) {
            if id >= n {
                return Err(ModelError::InvalidGraph(format!(
                    "graph I/O references tensor {id}, but only {n} tensors exist"
                )));
            }
        }

        let mut is_input = vec![false; n];
        for &id in &self.inputs {
            let t = &self.tensors[id];
            if t.kind() != TensorKind::Activation {
                return Err(ModelError::InvalidGraph(format!(
                    "graph input '{}' is a {} tensor",
                    t.name,
                    t.kind().as_str()
                )));
            }
            is_input[id] = true;
        }

        let mut written = vec![false; n];
        for op in &self.operators {
            let invalid = |detail: String| ModelError::InvalidOperator {
                operator: op.name.clone(),
                detail,
            };

            for id in op.input_ids().chain(op.output_ids()) {
                if id >= n {
                    return Err(invalid(format!(
                        "references tensor {id}, but only {n} tensors exist"
                    )));
                }
            }

            for (pos, id) in op.input_ids().enumerate() {
                let t = &self.tensors[id];
                match t.kind() {
                    TensorKind::Activation if !is_input[id] && !written[id] => {
                        return Err(invalid(format!(
                            "reads '{}' before any operator writes it",
                            t.name
                        )));
                    }
                    TensorKind::Variable if op.input_ids().skip(pos + 1).any(|o| o == id) => {
                        return Err(invalid(format!(
                            "lists variable '{}' more than once",
                            t.name
                        )));
                    }
                    _ => {}
                }
            }

            for (pos, id) in op.output_ids().enumerate() {
                let t = &self.tensors[id];
                if t.kind() != TensorKind::Activation {
                    return Err(invalid(format!(
                        "writes {} tensor '{}'",
                        t.kind().as_str(),
                        t.name
                    )));
                }
                if is_input[id] {
                    return Err(invalid(format!("writes graph input '{}'", t.name)));
                }
                if written[id] || op.output_ids().skip(pos + 1).any(|o| o == id) {
                    return Err(invalid(format!("'{}' is written more than once", t.name)));
                }
                if op.input_ids().any(|i| i == id) {
                    return Err(invalid(format!("both reads and writes '{}'", t.name)));
                }
            }
            for id in op.output_ids() {
                written[id] = true;
            }
        }

        for &id in &self.outputs {
            let t = &self.tensors[id];
            if t.kind() == TensorKind::Activation && !is_input[id] && !written[id] {
                return Err(ModelError::InvalidGraph(format!(
                    "graph output '{}' is never written",
                    t.name
                )));
            }
        }

        for (id, t) in self.tensors.iter().enumerate() {
            let referenced = is_input[id]
                || self.outputs.contains(&id)
                || self
                    .operators
                    .iter()
                    .any(|op| op.input_ids().chain(op.output_ids()).any(|o| o == id));
            if !referenced {
                tracing::warn!("tensor '{}' is never referenced and gets no buffer", t.name);
            }
        }

        Ok(ModelGraph {
            name: self.name,
            tensors: self.tensors,
            operators: self.operators,
            inputs: self.inputs,
            outputs: self.outputs,
            _state: std::marker::PhantomData,
        })
    }
}

// ── Validated state ────────────────────────────────────────────────

impl ModelGraph<Validated> {
    pub fn num_tensors(&self) -> usize {
        self.tensors.len()
    }

    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    pub fn tensor(&self, index: usize) -> Option<&TensorDef> {
        self.tensors.get(index)
    }

    pub fn operator(&self, index: usize) -> Option<&OperatorDef> {
        self.operators.get(index)
    }

    /// Returns an iterator over the operators in execution order.
    pub fn iter_operators(&self) -> impl Iterator<Item = &OperatorDef> {
        self.operators.iter()
    }

    /// Total bytes of tensors of the given kind.
    pub fn total_bytes(&self, kind: TensorKind) -> usize {
        self.tensors
            .iter()
            .filter(|t| t.kind() == kind)
            .map(TensorDef::size_bytes)
            .sum()
    }

    /// Returns a summary string describing the model.
    pub fn summary(&self) -> String {
        format!(
            "Model '{}': {} operators, {} tensors ({} B activations, {} B variables, {} B constants), {} inputs, {} outputs",
            self.name,
            self.num_operators(),
            self.num_tensors(),
            self.total_bytes(TensorKind::Activation),
            self.total_bytes(TensorKind::Variable),
            self.total_bytes(TensorKind::Constant),
            self.inputs.len(),
            self.outputs.len(),
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> fmt::Display for ModelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ModelGraph '{}' ({} operators, {} tensors):",
            self.name,
            self.operators.len(),
            self.tensors.len()
        )?;
        for (i, t) in self.tensors.iter().enumerate() {
            writeln!(f, "  t{i}: {}", t.summary())?;
        }
        for op in &self.operators {
            writeln!(f, "  {}", op.summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpCode;
    use tensor_core::{AlignedBytes, DType, Shape};

    fn scalar(name: &str) -> TensorDef {
        TensorDef::activation(name, DType::I32, Shape::vector(1))
    }

    /// in(t0) + const(t1) -> t2
    fn add_graph() -> ModelGraph<Loaded> {
        ModelGraph::new(
            "add",
            vec![
                scalar("in"),
                TensorDef::constant(
                    "w",
                    DType::I32,
                    Shape::vector(1),
                    AlignedBytes::from_elements(&[21i32]),
                ),
                scalar("out"),
            ],
            vec![OperatorDef::new(
                "add0",
                OpCode::Add,
                vec![Some(0), Some(1)],
                vec![Some(2)],
            )],
            vec![0],
            vec![2],
        )
    }

    #[test]
    fn test_validate_ok() {
        let graph = add_graph().validate().unwrap();
        assert_eq!(graph.num_operators(), 1);
        assert_eq!(graph.num_tensors(), 3);
    }

    #[test]
    fn test_empty_graph_is_valid() {
        let graph = ModelGraph::new("empty", vec![], vec![], vec![], vec![]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_operand() {
        let mut graph = add_graph();
        graph.operators[0].inputs[1] = Some(7);
        assert!(matches!(
            graph.validate(),
            Err(ModelError::InvalidOperator { .. })
        ));
    }

    #[test]
    fn test_wrong_constant_size() {
        let mut graph = add_graph();
        graph.tensors[1].data = Some(AlignedBytes::from_slice(&[0u8; 3]));
        assert!(matches!(
            graph.validate(),
            Err(ModelError::InvalidTensor { .. })
        ));
    }

    #[test]
    fn test_oversized_tensor_rejected() {
        let mut graph = add_graph();
        graph.tensors[2].shape = Shape::new(vec![usize::MAX / 2, 3]);
        assert!(matches!(
            graph.validate(),
            Err(ModelError::InvalidTensor { tensor, .. }) if tensor == "out"
        ));

        let mut graph = add_graph();
        graph.tensors[2].shape = Shape::vector(isize::MAX as usize / 2);
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_constant_variable_rejected() {
        let mut graph = add_graph();
        graph.tensors[1].is_variable = true;
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_read_before_write() {
        let mut graph = add_graph();
        graph.inputs.clear();
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_constant_input_rejected() {
        let mut graph = add_graph();
        graph.inputs.push(1);
        assert!(matches!(graph.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_double_write_rejected() {
        let mut graph = add_graph();
        graph.operators.push(OperatorDef::new(
            "add1",
            OpCode::Add,
            vec![Some(0), Some(1)],
            vec![Some(2)],
        ));
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_in_place_rejected() {
        let mut graph = add_graph();
        graph.operators.push(OperatorDef::new(
            "inplace",
            OpCode::Add,
            vec![Some(2), Some(1)],
            vec![Some(2)],
        ));
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_variable_written_rejected() {
        let mut graph = add_graph();
        graph.tensors[2].is_variable = true;
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_unwritten_output_rejected() {
        let mut graph = add_graph();
        graph.tensors.push(scalar("dangling"));
        graph.outputs.push(3);
        assert!(matches!(graph.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_omitted_operands_allowed() {
        let mut graph = add_graph();
        graph.operators[0].inputs.push(None);
        graph.operators[0].outputs.push(None);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_summary() {
        let s = add_graph().validate().unwrap().summary();
        assert!(s.contains("'add'"));
        assert!(s.contains("1 operators"));
        assert!(s.contains("4 B constants"));
    }

    #[test]
    fn test_display() {
        let display = format!("{}", add_graph());
        assert!(display.contains("t0: in"));
        assert!(display.contains("add0 (add): [t0, t1] -> [t2]"));
    }
}
