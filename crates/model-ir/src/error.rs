// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model loading and graph validation.

/// Errors that can occur when building or validating a model graph.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model manifest file could not be read.
    #[error("failed to read manifest: {0}")]
    ManifestReadError(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("failed to parse manifest: {0}")]
    ManifestParseError(#[from] serde_json::Error),

    /// A tensor definition is invalid (bad dtype, wrong constant size, ...).
    #[error("invalid tensor '{tensor}': {detail}")]
    InvalidTensor { tensor: String, detail: String },

    /// An operator references tensors in a way the runtime cannot execute.
    #[error("invalid operator '{operator}': {detail}")]
    InvalidOperator { operator: String, detail: String },

    /// The graph as a whole is malformed.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),
}
