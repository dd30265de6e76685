// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON model manifest parsing.
//!
//! The manifest describes a whole graph: its tensors (with constant data
//! inline), its operators in execution order, and the graph inputs and
//! outputs.
//!
//! # Format
//! ```json
//! {
//!   "name": "add21",
//!   "tensors": [
//!     { "name": "input",  "dtype": "int32", "shape": [1] },
//!     { "name": "weight", "dtype": "int32", "shape": [1], "data": [21] },
//!     { "name": "output", "dtype": "int32", "shape": [1] }
//!   ],
//!   "operators": [
//!     { "op": "add", "inputs": [0, 1], "outputs": [2] }
//!   ],
//!   "inputs": [0],
//!   "outputs": [2]
//! }
//! ```
//!
//! Operand lists may contain `null` for omitted optional operands. Constant
//! `data` is a flat list of numbers in row-major order, encoded with the
//! tensor's dtype.

use crate::{graph::Loaded, ModelError, ModelGraph, OpCode, OperatorDef, TensorDef};
use std::path::Path;
use tensor_core::{AlignedBytes, DType, Shape};

/// Top-level model manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelManifest {
    /// Human-readable model name.
    pub name: String,
    /// Tensor definitions, addressed by position.
    pub tensors: Vec<ManifestTensor>,
    /// Operators in execution order.
    pub operators: Vec<ManifestOperator>,
    /// Graph input tensor indices.
    pub inputs: Vec<usize>,
    /// Graph output tensor indices.
    pub outputs: Vec<usize>,
}

/// A single tensor entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestTensor {
    pub name: String,
    /// Dtype string (e.g. `"int32"`, `"f32"`, `"uint8"`).
    pub dtype: String,
    pub shape: Vec<usize>,
    /// Constant values, if the tensor is a constant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<f64>>,
    /// Whether the tensor holds state across invocations.
    #[serde(default)]
    pub variable: bool,
}

/// A single operator entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestOperator {
    /// Optional name; defaults to `"<op>_<index>"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Operator code (e.g. `"add"`, `"mock_custom"`).
    pub op: String,
    pub inputs: Vec<Option<usize>>,
    pub outputs: Vec<Option<usize>>,
}

impl ModelManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Converts the manifest into an unvalidated graph.
    ///
    /// Checks only what the manifest itself can get wrong: dtype strings,
    /// constant element counts and value ranges, and duplicate tensor names.
    /// Structural checks are left to [`ModelGraph::validate`].
    pub fn into_graph(self) -> Result<ModelGraph<Loaded>, ModelError> {
        let mut seen_names = std::collections::HashSet::new();
        let mut tensors = Vec::with_capacity(self.tensors.len());
        for t in self.tensors {
            if !seen_names.insert(t.name.clone()) {
                tracing::warn!("duplicate tensor name '{}' in manifest", t.name);
            }
            let dtype = DType::from_str_loose(&t.dtype).ok_or_else(|| ModelError::InvalidTensor {
                tensor: t.name.clone(),
                detail: format!("unsupported dtype '{}'", t.dtype),
            })?;
            let shape = Shape::new(t.shape);
            let data = match &t.data {
                Some(values) => Some(encode_values(&t.name, dtype, &shape, values)?),
                None => None,
            };
            tensors.push(TensorDef {
                name: t.name,
                dtype,
                shape,
                data,
                is_variable: t.variable,
            });
        }

        let operators = self
            .operators
            .into_iter()
            .enumerate()
            .map(|(i, op)| {
                let code = OpCode::from_name(&op.op);
                let name = op.name.unwrap_or_else(|| format!("{}_{i}", code));
                OperatorDef::new(name, code, op.inputs, op.outputs)
            })
            .collect();

        Ok(ModelGraph::new(
            self.name,
            tensors,
            operators,
            self.inputs,
            self.outputs,
        ))
    }
}

/// Encodes manifest numbers as native-endian elements of `dtype`.
fn encode_values(
    tensor: &str,
    dtype: DType,
    shape: &Shape,
    values: &[f64],
) -> Result<AlignedBytes, ModelError> {
    let invalid = |detail: String| ModelError::InvalidTensor {
        tensor: tensor.to_string(),
        detail,
    };
    let count = shape
        .checked_size_bytes(dtype)
        .and(shape.checked_num_elements())
        .ok_or_else(|| invalid(format!("shape {shape} of {dtype} is too large to address")))?;
    if values.len() != count {
        return Err(invalid(format!(
            "shape {shape} needs {count} values, got {}",
            values.len()
        )));
    }

    fn integral(v: f64, min: f64, max: f64) -> Option<f64> {
        (v.fract() == 0.0 && v >= min && v <= max).then_some(v)
    }

    let mut bytes = Vec::with_capacity(values.len() * dtype.size_bytes());
    for &v in values {
        let out_of_range = || invalid(format!("value {v} does not fit {dtype}"));
        match dtype {
            DType::F32 => bytes.extend_from_slice(&(v as f32).to_ne_bytes()),
            DType::I64 => {
                let x = integral(v, i64::MIN as f64, i64::MAX as f64).ok_or_else(out_of_range)?;
                bytes.extend_from_slice(&(x as i64).to_ne_bytes());
            }
            DType::I32 => {
                let x = integral(v, i32::MIN as f64, i32::MAX as f64).ok_or_else(out_of_range)?;
                bytes.extend_from_slice(&(x as i32).to_ne_bytes());
            }
            DType::I16 => {
                let x = integral(v, i16::MIN as f64, i16::MAX as f64).ok_or_else(out_of_range)?;
                bytes.extend_from_slice(&(x as i16).to_ne_bytes());
            }
            DType::I8 => {
                let x = integral(v, i8::MIN as f64, i8::MAX as f64).ok_or_else(out_of_range)?;
                bytes.extend_from_slice(&(x as i8).to_ne_bytes());
            }
            DType::U8 => {
                let x = integral(v, 0.0, u8::MAX as f64).ok_or_else(out_of_range)?;
                bytes.push(x as u8);
            }
        }
    }
    Ok(AlignedBytes::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::cast_elements;

    fn sample_manifest_json() -> &'static str {
        r#"{
            "name": "add21",
            "tensors": [
                { "name": "input",  "dtype": "int32", "shape": [1] },
                { "name": "weight", "dtype": "int32", "shape": [1], "data": [21] },
                { "name": "output", "dtype": "int32", "shape": [1] }
            ],
            "operators": [
                { "op": "add", "inputs": [0, 1], "outputs": [2] }
            ],
            "inputs": [0],
            "outputs": [2]
        }"#
    }

    #[test]
    fn test_parse_manifest() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.name, "add21");
        assert_eq!(m.tensors.len(), 3);
        assert_eq!(m.operators[0].inputs, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_into_graph() {
        let graph = ModelManifest::from_json(sample_manifest_json())
            .unwrap()
            .into_graph()
            .unwrap();
        assert_eq!(graph.operators[0].code, OpCode::Add);
        assert_eq!(graph.operators[0].name, "add_0");
        let data = graph.tensors[1].data.as_ref().unwrap();
        assert_eq!(cast_elements::<i32>(DType::I32, data.as_bytes()).unwrap(), &[21]);
    }

    #[test]
    fn test_null_operands() {
        let json = r#"{
            "name": "nulls",
            "tensors": [{ "name": "t", "dtype": "i32", "shape": [1] }],
            "operators": [{ "name": "noop", "op": "no_op", "inputs": [0, null], "outputs": [null] }],
            "inputs": [0],
            "outputs": [0]
        }"#;
        let graph = ModelManifest::from_json(json).unwrap().into_graph().unwrap();
        assert_eq!(graph.operators[0].inputs, vec![Some(0), None]);
        assert_eq!(graph.operators[0].outputs, vec![None]);
        assert_eq!(graph.operators[0].code, OpCode::custom("no_op"));
    }

    #[test]
    fn test_bad_dtype() {
        let json = r#"{
            "name": "bad",
            "tensors": [{ "name": "t", "dtype": "complex64", "shape": [1] }],
            "operators": [], "inputs": [], "outputs": []
        }"#;
        let m = ModelManifest::from_json(json).unwrap();
        assert!(matches!(
            m.into_graph(),
            Err(ModelError::InvalidTensor { .. })
        ));
    }

    #[test]
    fn test_data_count_mismatch() {
        assert!(encode_values("t", DType::I32, &Shape::vector(2), &[1.0]).is_err());
    }

    #[test]
    fn test_data_out_of_range() {
        assert!(encode_values("t", DType::I8, &Shape::vector(1), &[200.0]).is_err());
        assert!(encode_values("t", DType::U8, &Shape::vector(1), &[-1.0]).is_err());
        assert!(encode_values("t", DType::I32, &Shape::vector(1), &[0.5]).is_err());
    }

    #[test]
    fn test_encode_f32() {
        let bytes = encode_values("t", DType::F32, &Shape::vector(2), &[0.5, -2.0]).unwrap();
        assert_eq!(
            cast_elements::<f32>(DType::F32, bytes.as_bytes()).unwrap(),
            &[0.5, -2.0]
        );
    }

    #[test]
    fn test_oversized_shape_rejected() {
        let json = r#"{
            "name": "huge",
            "tensors": [
                { "name": "input",  "dtype": "int8", "shape": [4294967296, 4294967296] },
                { "name": "output", "dtype": "int8", "shape": [4294967296, 4294967296] }
            ],
            "operators": [
                { "op": "copy", "inputs": [0], "outputs": [1] }
            ],
            "inputs": [0],
            "outputs": [1]
        }"#;
        let graph = ModelManifest::from_json(json).unwrap().into_graph().unwrap();
        assert!(matches!(
            graph.validate(),
            Err(ModelError::InvalidTensor { tensor, .. }) if tensor == "input"
        ));
    }

    #[test]
    fn test_oversized_constant_rejected() {
        let shape = Shape::new(vec![usize::MAX, 2]);
        assert!(matches!(
            encode_values("w", DType::I32, &shape, &[1.0]),
            Err(ModelError::InvalidTensor { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ModelManifest::from_json("{ not json"),
            Err(ModelError::ManifestParseError(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        let json = serde_json::to_string_pretty(&m).unwrap();
        let back = ModelManifest::from_json(&json).unwrap();
        assert_eq!(back.name, m.name);
        assert_eq!(back.tensors.len(), m.tensors.len());
        assert_eq!(back.tensors[1].data, Some(vec![21.0]));
    }
}
