// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! Runs a validated `ModelGraph` out of one caller-supplied byte arena.
//!
//! The runtime takes:
//! - A validated `ModelGraph` from `model-ir`.
//! - An [`OpResolver`] that maps operator codes to [`Kernel`]s.
//! - An arena: a raw buffer, or a `SharedAllocator` from `memory-manager`
//!   that several interpreters use one after the other.
//!
//! Allocation plans activation offsets with a `memory-planner` strategy,
//! reserves variable buffers and kernel data in the arena tail and scratch
//! buffers in the head. `invoke` then runs the operators in graph order
//! without touching the heap.
//!
//! # Multi-tenancy
//! ```text
//!  head ─► [scratch: max over tenants]      [tenant 2 | tenant 1] ◄─ tail
//! ```
//! Each allocation pass rewinds the head, so scratch space is shared by all
//! tenants; tail data accumulates and is never reused.
//!
//! # Features
//! - `profiling` (default): compiles the per-operator [`Profiler`] hooks
//!   into `invoke`.

mod config;
mod context;
mod error;
mod interpreter;
mod kernel;
mod metrics;
mod profiler;
mod records;
mod resolver;
pub mod testing;

pub use config::RuntimeConfig;
pub use context::{InvokeContext, Inputs, Outputs, Scratch};
pub use error::{
    AllocationError, AlreadySet, ExecutionError, KernelError, ProfilerError, RuntimeError,
};
pub use interpreter::{Interpreter, InterpreterState, TensorMut, TensorRef};
pub use kernel::{Kernel, PrepareContext, ScratchIndex, MAX_OPERANDS, MAX_SCRATCH_BUFFERS};
pub use metrics::{InvocationMetrics, OperatorMetrics};
pub use profiler::{CountingProfiler, EventHandle, Profiler, TimingProfiler};
pub use resolver::{MutableOpResolver, OpResolver};
