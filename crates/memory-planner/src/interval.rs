// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Lifetime intervals.
//!
//! A buffer is alive from the first operator that touches it to the last
//! one, inclusive, counted in execution order. Two buffers may share bytes
//! only if their intervals are disjoint.

use model_ir::{graph::Validated, ModelGraph, TensorKind};
use std::fmt;

/// What a planned buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum BufferId {
    /// The data of a tensor, by graph index.
    Tensor(usize),
    /// The `index`-th scratch buffer requested by operator `op`.
    Scratch { op: usize, index: usize },
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferId::Tensor(id) => write!(f, "t{id}"),
            BufferId::Scratch { op, index } => write!(f, "op{op}.scratch{index}"),
        }
    }
}

/// The span of operator indices during which a buffer must stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LifetimeInterval {
    pub buffer: BufferId,
    /// Index of the first operator that needs the buffer.
    pub first_op: usize,
    /// Index of the last operator that needs the buffer (inclusive).
    pub last_op: usize,
    /// Size in bytes.
    pub size: usize,
}

impl LifetimeInterval {
    pub fn new(buffer: BufferId, first_op: usize, last_op: usize, size: usize) -> Self {
        Self {
            buffer,
            first_op,
            last_op,
            size,
        }
    }

    /// A scratch buffer, alive only while its operator runs.
    pub fn scratch(op: usize, index: usize, size: usize) -> Self {
        Self::new(BufferId::Scratch { op, index }, op, op, size)
    }

    /// Whether both buffers are alive at some operator.
    pub fn overlaps(&self, other: &LifetimeInterval) -> bool {
        self.first_op <= other.last_op && other.first_op <= self.last_op
    }

    pub fn is_alive_at(&self, op: usize) -> bool {
        self.first_op <= op && op <= self.last_op
    }
}

impl fmt::Display for LifetimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}..={}] {} B",
            self.buffer, self.first_op, self.last_op, self.size
        )
    }
}

/// Computes the lifetime of every activation tensor of `graph`.
///
/// Constants live in the graph and variables get dedicated buffers, so
/// neither gets an interval. Graph inputs are alive from the first
/// operator and graph outputs until the last; an output nobody reads lives
/// only at its producer. Tensors no operator or graph I/O list mentions get
/// no interval at all.
///
/// Intervals are returned in tensor index order.
pub fn tensor_intervals(graph: &ModelGraph<Validated>) -> Vec<LifetimeInterval> {
    let last_op = graph.num_operators().saturating_sub(1);
    let mut spans: Vec<Option<(usize, usize)>> = vec![None; graph.num_tensors()];

    let mut touch = |id: usize, op: usize| {
        let span = spans[id].get_or_insert((op, op));
        span.0 = span.0.min(op);
        span.1 = span.1.max(op);
    };

    for &id in &graph.inputs {
        touch(id, 0);
    }
    for (op_index, op) in graph.iter_operators().enumerate() {
        for id in op.input_ids().chain(op.output_ids()) {
            touch(id, op_index);
        }
    }
    for &id in &graph.outputs {
        touch(id, last_op);
    }

    spans
        .into_iter()
        .enumerate()
        .filter(|&(id, _)| graph.tensors[id].kind() == TensorKind::Activation)
        .filter_map(|(id, span)| {
            span.map(|(first, last)| {
                LifetimeInterval::new(
                    BufferId::Tensor(id),
                    first,
                    last,
                    graph.tensors[id].size_bytes(),
                )
            })
        })
        .collect()
}
