// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operand binding for one operator invocation.
//!
//! The arena is split into disjoint mutable slices, one per operand buffer,
//! scratch buffer and persistent data block, all held in fixed-size arrays.
//! Binding never touches the heap.

use crate::kernel::{ScratchIndex, MAX_OPERANDS, MAX_SCRATCH_BUFFERS};
use crate::records::{read_row, OpRecord, Span, Tables};
use crate::{ExecutionError, KernelError};
use memory_manager::{split_disjoint, ByteRange};
use model_ir::{graph::Validated, ModelGraph, OperatorDef, TensorDef};
use std::any::Any;
use std::mem;
use tensor_core::{TensorView, TensorViewMut};

const OUTPUT_BASE: usize = MAX_OPERANDS;
const SCRATCH_BASE: usize = 2 * MAX_OPERANDS;
const USER_DATA: usize = SCRATCH_BASE + MAX_SCRATCH_BUFFERS;
const MAX_REGIONS: usize = USER_DATA + 1;

const _: () = assert!(MAX_REGIONS <= memory_manager::MAX_SPLIT_REGIONS);

enum InputData<'b> {
    Absent,
    Shared {
        def: &'b TensorDef,
        data: &'b [u8],
    },
    Variable {
        def: &'b TensorDef,
        data: &'b mut [u8],
    },
}

/// Input buffers of the running operator.
///
/// Variable inputs are the only writable ones.
pub struct Inputs<'b> {
    data: [InputData<'b>; MAX_OPERANDS],
    len: usize,
}

impl<'b> Inputs<'b> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Input `i`, or `None` if the operand is omitted.
    pub fn optional(&self, i: usize) -> Result<Option<TensorView<'_>>, KernelError> {
        let (def, data): (&TensorDef, &[u8]) = match self.data.get(i) {
            None | Some(InputData::Absent) => return Ok(None),
            Some(InputData::Shared { def, data }) => (*def, *data),
            Some(InputData::Variable { def, data }) => (*def, &**data),
        };
        Ok(Some(TensorView::new(&def.shape, def.dtype, data)?))
    }

    /// Input `i`, failing if the operand is omitted.
    pub fn get(&self, i: usize) -> Result<TensorView<'_>, KernelError> {
        self.optional(i)?.ok_or(KernelError::MissingInput(i))
    }

    /// Writable view of variable input `i`.
    pub fn get_mut(&mut self, i: usize) -> Result<TensorViewMut<'_>, KernelError> {
        match self.data.get_mut(i) {
            Some(InputData::Variable { def, data }) => {
                Ok(TensorViewMut::new(&def.shape, def.dtype, data)?)
            }
            Some(InputData::Shared { .. }) => Err(KernelError::NotVariable(i)),
            None | Some(InputData::Absent) => Err(KernelError::MissingInput(i)),
        }
    }
}

/// Output buffers of the running operator.
pub struct Outputs<'b> {
    data: [Option<(&'b TensorDef, &'b mut [u8])>; MAX_OPERANDS],
    len: usize,
}

impl<'b> Outputs<'b> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Output `i`, or `None` if the operand is omitted.
    pub fn optional_mut(&mut self, i: usize) -> Result<Option<TensorViewMut<'_>>, KernelError> {
        match self.data.get_mut(i) {
            Some(Some((def, data))) => Ok(Some(TensorViewMut::new(&def.shape, def.dtype, data)?)),
            _ => Ok(None),
        }
    }

    /// Output `i`, failing if the operand is omitted.
    pub fn get_mut(&mut self, i: usize) -> Result<TensorViewMut<'_>, KernelError> {
        self.optional_mut(i)?.ok_or(KernelError::MissingOutput(i))
    }
}

/// Scratch buffers requested during prepare.
///
/// Contents do not survive between invocations.
pub struct Scratch<'b> {
    data: [&'b mut [u8]; MAX_SCRATCH_BUFFERS],
    len: usize,
}

impl<'b> Scratch<'b> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get_mut(&mut self, index: ScratchIndex) -> Result<&mut [u8], KernelError> {
        if index.0 >= self.len {
            return Err(KernelError::UnknownScratch(index.0));
        }
        Ok(&mut *self.data[index.0])
    }
}

/// Everything a kernel touches while it runs.
pub struct InvokeContext<'b> {
    pub inputs: Inputs<'b>,
    pub outputs: Outputs<'b>,
    pub scratch: Scratch<'b>,
    /// Persistent data reserved in prepare; empty if none.
    pub user_data: &'b mut [u8],
    operator: &'b OperatorDef,
    external_context: Option<&'b dyn Any>,
}

impl<'b> InvokeContext<'b> {
    pub fn operator(&self) -> &'b OperatorDef {
        self.operator
    }

    /// The interpreter's external context, if one was set.
    pub fn external_context(&self) -> Option<&'b dyn Any> {
        self.external_context
    }
}

fn tensor_range(buffer: &[u8], tables: Tables, id: usize) -> Result<ByteRange, ExecutionError> {
    let span: Span = read_row(buffer, tables.tensors, id)?;
    if !span.is_placed() {
        return Err(ExecutionError::Unplaced(id));
    }
    Ok(span.range())
}

/// Splits `buffer` into the operand buffers of `op`.
pub(crate) fn bind<'b>(
    graph: &'b ModelGraph<Validated>,
    op: &'b OperatorDef,
    tables: Tables,
    record: OpRecord,
    buffer: &'b mut [u8],
    external_context: Option<&'b dyn Any>,
) -> Result<InvokeContext<'b>, ExecutionError> {
    let mut ranges = [ByteRange::default(); MAX_REGIONS];
    let mut defs: [Option<&'b TensorDef>; 2 * MAX_OPERANDS] = [None; 2 * MAX_OPERANDS];
    let mut alias: [Option<usize>; MAX_OPERANDS] = [None; MAX_OPERANDS];

    for (i, operand) in op.inputs.iter().enumerate() {
        let Some(id) = *operand else { continue };
        let def = graph.tensor(id).ok_or(ExecutionError::Unplaced(id))?;
        defs[i] = Some(def);
        if def.is_constant() {
            continue;
        }
        // The same activation read twice binds one shared slice.
        if !def.is_variable {
            alias[i] = op.inputs[..i].iter().position(|&other| other == Some(id));
            if alias[i].is_some() {
                continue;
            }
        }
        ranges[i] = tensor_range(buffer, tables, id)?;
    }
    for (i, operand) in op.outputs.iter().enumerate() {
        let Some(id) = *operand else { continue };
        defs[OUTPUT_BASE + i] = Some(graph.tensor(id).ok_or(ExecutionError::Unplaced(id))?);
        ranges[OUTPUT_BASE + i] = tensor_range(buffer, tables, id)?;
    }
    let scratch_len = record.scratch_count as usize;
    for k in 0..scratch_len {
        let span: Span = read_row(buffer, tables.scratch, record.scratch_first as usize + k)?;
        ranges[SCRATCH_BASE + k] = span.range();
    }
    if record.user_data.is_placed() {
        ranges[USER_DATA] = record.user_data.range();
    }

    let mut pieces: [&'b mut [u8]; MAX_REGIONS] = std::array::from_fn(|_| Default::default());
    split_disjoint(buffer, &ranges, &mut pieces)?;

    let mut inputs = Inputs {
        data: std::array::from_fn(|_| InputData::Absent),
        len: op.inputs.len(),
    };
    for i in 0..op.inputs.len() {
        let Some(def) = defs[i] else { continue };
        inputs.data[i] = if let Some(data) = def.data.as_ref() {
            InputData::Shared {
                def,
                data: data.as_bytes(),
            }
        } else if def.is_variable {
            InputData::Variable {
                def,
                data: mem::take(&mut pieces[i]),
            }
        } else if let Some(j) = alias[i] {
            match inputs.data[j] {
                InputData::Shared { data, .. } => InputData::Shared { def, data },
                _ => InputData::Absent,
            }
        } else {
            InputData::Shared {
                def,
                data: &*mem::take(&mut pieces[i]),
            }
        };
    }

    let mut outputs = Outputs {
        data: std::array::from_fn(|_| None),
        len: op.outputs.len(),
    };
    for i in 0..op.outputs.len() {
        if let Some(def) = defs[OUTPUT_BASE + i] {
            outputs.data[i] = Some((def, mem::take(&mut pieces[OUTPUT_BASE + i])));
        }
    }

    let mut scratch = Scratch {
        data: std::array::from_fn(|_| Default::default()),
        len: scratch_len,
    };
    for k in 0..scratch_len {
        scratch.data[k] = mem::take(&mut pieces[SCRATCH_BASE + k]);
    }

    Ok(InvokeContext {
        inputs,
        outputs,
        scratch,
        user_data: mem::take(&mut pieces[USER_DATA]),
        operator: op,
        external_context,
    })
}
