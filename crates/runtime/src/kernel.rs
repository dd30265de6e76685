// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The operator capability interface.
//!
//! A [`Kernel`] is created once per operator when the interpreter is built,
//! prepared once during allocation, invoked once per `Interpreter::invoke`
//! and freed exactly once when the interpreter is dropped.

use crate::{InvokeContext, KernelError};
use memory_manager::{AllocationCategory, ArenaAllocator, ARENA_ALIGNMENT};
use model_ir::{graph::Validated, ModelGraph, OperatorDef, TensorDef};

/// Maximum inputs (and, separately, outputs) an operator may have.
pub const MAX_OPERANDS: usize = 16;

/// Maximum scratch buffers one operator may request.
pub const MAX_SCRATCH_BUFFERS: usize = 4;

/// Handle to a scratch buffer requested during prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScratchIndex(pub(crate) usize);

impl ScratchIndex {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Implementation of one operator.
pub trait Kernel {
    /// Inspects operand metadata and reserves memory. Runs during allocation.
    fn prepare(&mut self, _ctx: &mut PrepareContext<'_>) -> Result<(), KernelError> {
        Ok(())
    }

    /// Computes the outputs from the bound operand buffers.
    fn invoke(&mut self, ctx: &mut InvokeContext<'_>) -> Result<(), KernelError>;

    /// Releases per-instance resources. Called exactly once, on drop.
    fn free(&mut self) {}
}

/// What a kernel can see and reserve while being prepared.
pub struct PrepareContext<'p> {
    graph: &'p ModelGraph<Validated>,
    operator: &'p OperatorDef,
    allocator: &'p mut dyn ArenaAllocator,
    scratch_sizes: [usize; MAX_SCRATCH_BUFFERS],
    scratch_count: usize,
    user_data: Option<(usize, usize)>,
}

impl<'p> PrepareContext<'p> {
    pub(crate) fn new(
        graph: &'p ModelGraph<Validated>,
        operator: &'p OperatorDef,
        allocator: &'p mut dyn ArenaAllocator,
    ) -> Self {
        Self {
            graph,
            operator,
            allocator,
            scratch_sizes: [0; MAX_SCRATCH_BUFFERS],
            scratch_count: 0,
            user_data: None,
        }
    }

    pub fn operator(&self) -> &'p OperatorDef {
        self.operator
    }

    pub fn num_inputs(&self) -> usize {
        self.operator.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.operator.outputs.len()
    }

    /// Definition of input `i`, or `None` if it is omitted.
    pub fn input(&self, i: usize) -> Option<&'p TensorDef> {
        let id = (*self.operator.inputs.get(i)?)?;
        self.graph.tensor(id)
    }

    /// Definition of output `i`, or `None` if it is omitted.
    pub fn output(&self, i: usize) -> Option<&'p TensorDef> {
        let id = (*self.operator.outputs.get(i)?)?;
        self.graph.tensor(id)
    }

    /// Requests a scratch buffer of `bytes`, valid only while this operator
    /// is invoked.
    pub fn request_scratch_buffer(&mut self, bytes: usize) -> Result<ScratchIndex, KernelError> {
        if self.scratch_count == MAX_SCRATCH_BUFFERS {
            return Err(KernelError::TooManyScratchBuffers {
                max: MAX_SCRATCH_BUFFERS,
            });
        }
        let index = self.scratch_count;
        self.scratch_sizes[index] = bytes;
        self.scratch_count += 1;
        Ok(ScratchIndex(index))
    }

    /// Reserves `bytes` of per-operator data that persists across
    /// invocations. Once per operator.
    ///
    /// The returned bytes are not zeroed.
    pub fn allocate_persistent(&mut self, bytes: usize) -> Result<&mut [u8], KernelError> {
        if self.user_data.is_some() {
            return Err(KernelError::PersistentAlreadyAllocated);
        }
        let offset = self
            .allocator
            .allocate_tail(bytes, ARENA_ALIGNMENT, AllocationCategory::OpData)?;
        self.user_data = Some((offset, bytes));
        let capacity = self.allocator.capacity();
        self.allocator
            .buffer_mut()
            .get_mut(offset..offset + bytes)
            .ok_or(KernelError::Memory(memory_manager::MemoryError::OutOfBounds {
                offset,
                len: bytes,
                capacity,
            }))
    }

    /// Scratch sizes and the persistent data range, in request order.
    pub(crate) fn finish(self) -> (ScratchSizes, Option<(usize, usize)>) {
        (
            ScratchSizes {
                sizes: self.scratch_sizes,
                count: self.scratch_count,
            },
            self.user_data,
        )
    }
}

pub(crate) struct ScratchSizes {
    sizes: [usize; MAX_SCRATCH_BUFFERS],
    count: usize,
}

impl ScratchSizes {
    pub fn as_slice(&self) -> &[usize] {
        &self.sizes[..self.count]
    }
}
