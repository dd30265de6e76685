// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the interpreter.

use crate::InterpreterState;
use memory_manager::{AllocationCategory, MemoryError};
use memory_planner::PlannerError;

/// Errors raised while planning and committing a graph into the arena.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// A head or tail bump request failed.
    #[error("arena exhausted while allocating {category}: {source}")]
    Arena {
        category: AllocationCategory,
        #[source]
        source: MemoryError,
    },

    /// The placement strategy rejected the buffers.
    #[error("buffer placement failed: {0}")]
    Planner(#[from] PlannerError),

    /// A kernel's prepare step failed.
    #[error("prepare failed for operator '{operator}': {source}")]
    Prepare {
        operator: String,
        #[source]
        source: KernelError,
    },

    /// An arena offset does not fit the 32-bit record tables.
    #[error("arena offset {0} does not fit in a record table")]
    TableOverflow(usize),

    /// A previous allocation pass failed; the interpreter is unusable.
    #[error("interpreter is in the failed state")]
    Failed,

    /// Another borrower holds the shared allocator.
    #[error("allocator is busy")]
    AllocatorBusy,
}

/// Errors raised by `Interpreter::invoke`.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Lazy allocation on the first invoke failed.
    #[error("allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    /// An operator reported failure; the remaining operators did not run.
    #[error("operator {index} '{operator}' failed: {source}")]
    Kernel {
        index: usize,
        operator: String,
        #[source]
        source: KernelError,
    },

    /// A tensor an operator needs has no arena buffer.
    #[error("tensor {0} has no arena buffer")]
    Unplaced(usize),

    /// Splitting the arena into operand buffers failed.
    #[error("operand binding failed: {0}")]
    Memory(#[from] MemoryError),

    /// The interpreter failed earlier and cannot run.
    #[error("interpreter is in the failed state")]
    Failed,

    /// Another borrower holds the shared allocator, e.g. a live tensor handle.
    #[error("allocator is busy")]
    AllocatorBusy,
}

/// Errors reported by kernels from `prepare` or `invoke`.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error(transparent)]
    Tensor(#[from] tensor_core::TensorError),

    #[error("required input {0} is missing")]
    MissingInput(usize),

    #[error("required output {0} is missing")]
    MissingOutput(usize),

    #[error("input {0} is not a variable tensor")]
    NotVariable(usize),

    #[error("scratch buffer {0} was not requested")]
    UnknownScratch(usize),

    #[error("at most {max} scratch buffers per operator")]
    TooManyScratchBuffers { max: usize },

    #[error("persistent data already allocated for this operator")]
    PersistentAlreadyAllocated,

    #[error("arena error: {0}")]
    Memory(#[from] MemoryError),

    #[error("{0}")]
    Failed(String),
}

/// The external context slot was already set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("external context is already set")]
pub struct AlreadySet;

/// Errors a profiler may return from its hooks.
///
/// The interpreter logs these and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfilerError {
    #[error("profiler event table is full ({0} events)")]
    TooManyEvents(usize),

    #[error("unknown profiler event {0}")]
    UnknownEvent(u32),
}

/// Errors from interpreter construction, accessors and configuration.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The resolver has no kernel for an operator code.
    #[error("no kernel registered for operator '{operator}' ({code})")]
    UnresolvedOperator { operator: String, code: String },

    /// An operator has more operands than an invoke context can bind.
    #[error("operator '{operator}' has {count} operands, at most {max} supported")]
    TooManyOperands {
        operator: String,
        count: usize,
        max: usize,
    },

    /// Tensor accessors need an allocated interpreter.
    #[error("tensors are not allocated (state: {0})")]
    NotAllocated(InterpreterState),

    /// Index past the end of the inputs, outputs or tensors.
    #[error("{kind} index {index} out of range ({count})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },

    /// The tensor is a constant and cannot be written.
    #[error("tensor {0} is read-only")]
    ReadOnly(usize),

    /// The tensor is never used by the graph and has no buffer.
    #[error("tensor {0} has no arena buffer")]
    NoBuffer(usize),

    /// Another borrower holds the allocator, e.g. a live tensor handle.
    #[error("allocator is busy")]
    AllocatorBusy,

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Tensor(#[from] tensor_core::TensorError),

    #[error(transparent)]
    Model(#[from] model_ir::ModelError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
