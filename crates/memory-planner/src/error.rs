// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the memory planner.

/// Errors that can occur during buffer placement.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// An interval ends before it starts.
    #[error("invalid lifetime for {buffer}: first op {first_op} is after last op {last_op}")]
    InvalidInterval {
        buffer: String,
        first_op: usize,
        last_op: usize,
    },

    /// The placement alignment is zero or not a power of two.
    #[error("invalid placement alignment {0}")]
    InvalidAlignment(usize),

    /// The placed buffers need more bytes than are available.
    #[error("strategy '{strategy}' needs {required_bytes} bytes, only {capacity_bytes} available")]
    ExceedsCapacity {
        strategy: String,
        required_bytes: usize,
        capacity_bytes: usize,
    },

    /// Two simultaneously alive buffers share bytes.
    #[error("plan '{strategy}' overlaps {first} and {second}")]
    Overlap {
        strategy: String,
        first: String,
        second: String,
    },

    /// No strategy is registered under this name.
    #[error("unknown placement strategy '{0}' (expected 'greedy-first-fit' or 'linear')")]
    UnknownStrategy(String),
}
