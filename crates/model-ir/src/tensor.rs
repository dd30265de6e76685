// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor definitions.
//!
//! A [`TensorDef`] describes a tensor as the graph declares it. Only constant
//! tensors carry data here; every other tensor gets its bytes from the arena
//! once the runtime has planned the graph.

use tensor_core::{AlignedBytes, DType, Shape};

/// How a tensor's storage is provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorKind {
    /// Produced and consumed during one invocation; its arena bytes may be reused.
    Activation,
    /// Backed by data stored in the graph; never placed in the arena.
    Constant,
    /// State that persists across invocations in a dedicated arena buffer.
    Variable,
}

impl TensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Constant => "constant",
            Self::Variable => "variable",
        }
    }
}

/// Metadata (and, for constants, data) of one tensor in the graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorDef {
    /// Tensor name, used in diagnostics.
    pub name: String,
    /// Element type.
    pub dtype: DType,
    /// Dimensions.
    pub shape: Shape,
    /// Constant data, if any.
    #[serde(default)]
    pub data: Option<AlignedBytes>,
    /// Whether the tensor holds state across invocations.
    #[serde(default)]
    pub is_variable: bool,
}

impl TensorDef {
    /// A tensor whose buffer the runtime plans.
    pub fn activation(name: impl Into<String>, dtype: DType, shape: Shape) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape,
            data: None,
            is_variable: false,
        }
    }

    /// A tensor backed by graph data.
    pub fn constant(name: impl Into<String>, dtype: DType, shape: Shape, data: AlignedBytes) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape,
            data: Some(data),
            is_variable: false,
        }
    }

    /// A tensor holding state across invocations, zeroed at allocation.
    pub fn variable(name: impl Into<String>, dtype: DType, shape: Shape) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape,
            data: None,
            is_variable: true,
        }
    }

    pub fn kind(&self) -> TensorKind {
        if self.data.is_some() {
            TensorKind::Constant
        } else if self.is_variable {
            TensorKind::Variable
        } else {
            TensorKind::Activation
        }
    }

    pub fn is_constant(&self) -> bool {
        self.data.is_some()
    }

    /// Size of the tensor's data in bytes.
    pub fn size_bytes(&self) -> usize {
        self.shape.size_bytes(self.dtype)
    }

    /// Returns a one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} [{}] {}{} ({} bytes)",
            self.name,
            self.kind().as_str(),
            self.dtype,
            self.shape,
            self.size_bytes(),
        )
    }
}
