// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Small graphs built around the mock kernels.

use super::kernels::{ACCUMULATE, MOCK_CUSTOM, MULTIPLE_INPUTS_OP, NO_OP, SIMPLE_STATEFUL_OP};
use model_ir::graph::Validated;
use model_ir::{ModelError, ModelGraph, OpCode, OperatorDef, TensorDef};
use tensor_core::{AlignedBytes, DType, Shape};

fn i32_scalar(name: &str) -> TensorDef {
    TensorDef::activation(name, DType::I32, Shape::vector(1))
}

/// One `mock_custom` op: `t2 = t3 = t0 + 21`.
pub fn simple_model() -> Result<ModelGraph<Validated>, ModelError> {
    let tensors = vec![
        i32_scalar("input"),
        TensorDef::constant(
            "weight",
            DType::I32,
            Shape::vector(1),
            AlignedBytes::from_elements(&[21i32]),
        ),
        i32_scalar("output0"),
        i32_scalar("output1"),
    ];
    let ops = vec![OperatorDef::new(
        "mock",
        OpCode::custom(MOCK_CUSTOM),
        vec![Some(0), Some(1)],
        vec![Some(2), Some(3)],
    )];
    ModelGraph::new("simple", tensors, ops, vec![0], vec![2, 3]).validate()
}

/// Three chained `mock_custom` ops, each adding a zeroed variable.
pub fn complex_model() -> Result<ModelGraph<Validated>, ModelError> {
    let tensors = vec![
        i32_scalar("input"),
        TensorDef::variable("state0", DType::I32, Shape::vector(1)),
        i32_scalar("act0"),
        TensorDef::variable("state1", DType::I32, Shape::vector(1)),
        i32_scalar("act1"),
        TensorDef::variable("state2", DType::I32, Shape::vector(1)),
        i32_scalar("output"),
    ];
    let ops = (0..3)
        .map(|k| {
            OperatorDef::new(
                format!("mock{k}"),
                OpCode::custom(MOCK_CUSTOM),
                vec![Some(2 * k), Some(2 * k + 1)],
                vec![Some(2 * k + 2)],
            )
        })
        .collect();
    ModelGraph::new("complex", tensors, ops, vec![0], vec![6]).validate()
}

/// One `simple_stateful_op`: median of a `u8[3]` input and a call count.
pub fn stateful_model() -> Result<ModelGraph<Validated>, ModelError> {
    stateful_model_with_len(3)
}

/// [`stateful_model`] over a `u8[len]` input; the op asks for `len` bytes
/// of scratch.
pub fn stateful_model_with_len(len: usize) -> Result<ModelGraph<Validated>, ModelError> {
    let tensors = vec![
        TensorDef::activation("input", DType::U8, Shape::vector(len)),
        TensorDef::activation("median", DType::U8, Shape::vector(1)),
        i32_scalar("invoke_count"),
    ];
    let ops = vec![OperatorDef::new(
        "stateful",
        OpCode::custom(SIMPLE_STATEFUL_OP),
        vec![Some(0)],
        vec![Some(1), Some(2)],
    )];
    ModelGraph::new("stateful", tensors, ops, vec![0], vec![1, 2]).validate()
}

/// `t3 = t0 (i32) + t1 (i8) + t2 (i32)`.
pub fn multiple_inputs_model() -> Result<ModelGraph<Validated>, ModelError> {
    let tensors = vec![
        i32_scalar("input0"),
        TensorDef::activation("input1", DType::I8, Shape::vector(1)),
        i32_scalar("input2"),
        i32_scalar("output"),
    ];
    let ops = vec![OperatorDef::new(
        "sum3",
        OpCode::custom(MULTIPLE_INPUTS_OP),
        vec![Some(0), Some(1), Some(2)],
        vec![Some(3)],
    )];
    ModelGraph::new("multiple_inputs", tensors, ops, vec![0, 1, 2], vec![3]).validate()
}

/// A `no_op` with an omitted input and an omitted output. The only tensor
/// is both graph input and graph output.
pub fn null_io_model() -> Result<ModelGraph<Validated>, ModelError> {
    let tensors = vec![i32_scalar("passthrough")];
    let ops = vec![OperatorDef::new(
        "nothing",
        OpCode::custom(NO_OP),
        vec![Some(0), None],
        vec![None],
    )];
    ModelGraph::new("null_io", tensors, ops, vec![0], vec![0]).validate()
}

/// `u8[256, 256]` input multiplied by a single-element constant of 1.
pub fn model_with_256x256_tensor() -> Result<ModelGraph<Validated>, ModelError> {
    let tensors = vec![
        TensorDef::activation("input", DType::U8, Shape::matrix(256, 256)),
        TensorDef::constant(
            "one",
            DType::U8,
            Shape::vector(1),
            AlignedBytes::from_elements(&[1u8]),
        ),
        TensorDef::activation("output", DType::U8, Shape::matrix(256, 256)),
    ];
    let ops = vec![OperatorDef::new(
        "scale",
        OpCode::Mul,
        vec![Some(0), Some(1)],
        vec![Some(2)],
    )];
    ModelGraph::new("large_tensor", tensors, ops, vec![0], vec![2]).validate()
}

/// Built-in `add`: `t2 = t0 + 21`.
pub fn add_model() -> Result<ModelGraph<Validated>, ModelError> {
    let tensors = vec![
        i32_scalar("input"),
        TensorDef::constant(
            "bias",
            DType::I32,
            Shape::vector(1),
            AlignedBytes::from_elements(&[21i32]),
        ),
        i32_scalar("output"),
    ];
    let ops = vec![OperatorDef::new(
        "add",
        OpCode::Add,
        vec![Some(0), Some(1)],
        vec![Some(2)],
    )];
    ModelGraph::new("add", tensors, ops, vec![0], vec![2]).validate()
}

/// No graph inputs; each invocation bumps a variable and reports it.
pub fn accumulator_model() -> Result<ModelGraph<Validated>, ModelError> {
    let tensors = vec![
        TensorDef::variable("total", DType::I32, Shape::vector(1)),
        i32_scalar("output"),
    ];
    let ops = vec![OperatorDef::new(
        "bump",
        OpCode::custom(ACCUMULATE),
        vec![Some(0)],
        vec![Some(1)],
    )];
    ModelGraph::new("accumulator", tensors, ops, vec![], vec![1]).validate()
}
