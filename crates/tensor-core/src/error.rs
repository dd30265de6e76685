// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor views.

use crate::{DType, Shape};

/// Errors that can occur when interpreting tensor bytes.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer size does not match the expected size for the given shape and dtype.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// A typed view was requested with an element type that differs from the tensor's dtype.
    #[error("dtype mismatch: tensor holds {actual}, view requested {expected}")]
    DTypeMismatch { expected: DType, actual: DType },

    /// The bytes cannot be reinterpreted as the requested element type.
    #[error("cannot view {len} bytes as {dtype}: {detail}")]
    Misaligned {
        dtype: DType,
        len: usize,
        detail: String,
    },

    /// Two tensors have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// The requested data type is not supported for this operation.
    #[error("unsupported dtype {dtype} for operation {op}")]
    UnsupportedDType { op: &'static str, dtype: DType },
}
