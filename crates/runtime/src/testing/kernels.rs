// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Mock kernels.

use super::FreeTracker;
use crate::{InvokeContext, Kernel, KernelError, PrepareContext, ScratchIndex};
use tensor_core::{cast_elements_mut, DType, Element, TensorError, TensorView, TensorViewMut};

pub const MOCK_CUSTOM: &str = "mock_custom";
pub const SIMPLE_STATEFUL_OP: &str = "simple_stateful_op";
pub const MULTIPLE_INPUTS_OP: &str = "multiple_inputs_op";
pub const NO_OP: &str = "no_op";
pub const ACCUMULATE: &str = "accumulate";

fn first<T: Element>(view: TensorView<'_>) -> Result<T, KernelError> {
    view.as_slice::<T>()?.first().copied().ok_or(
        TensorError::BufferSizeMismatch {
            expected: std::mem::size_of::<T>(),
            actual: 0,
        }
        .into(),
    )
}

fn fill<T: Element>(mut view: TensorViewMut<'_>, value: T) -> Result<(), KernelError> {
    view.as_slice_mut::<T>()?.fill(value);
    Ok(())
}

/// `out0 = in0 + in1` on the first `i32` element; optional `out1` gets the
/// same value. Stages the sum in a 4-byte scratch buffer.
#[derive(Debug, Default)]
pub struct MockCustom {
    tracker: FreeTracker,
    scratch: Option<ScratchIndex>,
}

impl MockCustom {
    pub fn new(tracker: FreeTracker) -> Self {
        Self {
            tracker,
            scratch: None,
        }
    }
}

impl Kernel for MockCustom {
    fn prepare(&mut self, ctx: &mut PrepareContext<'_>) -> Result<(), KernelError> {
        self.scratch = Some(ctx.request_scratch_buffer(std::mem::size_of::<i32>())?);
        Ok(())
    }

    fn invoke(&mut self, ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        let a: i32 = first(ctx.inputs.get(0)?)?;
        let b: i32 = first(ctx.inputs.get(1)?)?;

        let index = self.scratch.ok_or(KernelError::UnknownScratch(0))?;
        let staged = cast_elements_mut::<i32>(DType::I32, ctx.scratch.get_mut(index)?)?;
        let slot = staged
            .first_mut()
            .ok_or(KernelError::UnknownScratch(index.index()))?;
        *slot = a.wrapping_add(b);
        let sum = *slot;

        fill(ctx.outputs.get_mut(0)?, sum)?;
        if let Some(second) = ctx.outputs.optional_mut(1)? {
            fill(second, sum)?;
        }
        Ok(())
    }

    fn free(&mut self) {
        self.tracker.record();
    }
}

/// Median of a `u8` input plus a running invocation count.
///
/// Sorts in a scratch buffer; keeps the count in persistent kernel data.
#[derive(Debug, Default)]
pub struct SimpleStatefulOp {
    tracker: FreeTracker,
    sorting: Option<ScratchIndex>,
}

impl SimpleStatefulOp {
    pub fn new(tracker: FreeTracker) -> Self {
        Self {
            tracker,
            sorting: None,
        }
    }
}

impl Kernel for SimpleStatefulOp {
    fn prepare(&mut self, ctx: &mut PrepareContext<'_>) -> Result<(), KernelError> {
        let input = ctx.input(0).ok_or(KernelError::MissingInput(0))?;
        if input.dtype != DType::U8 {
            return Err(TensorError::UnsupportedDType {
                op: SIMPLE_STATEFUL_OP,
                dtype: input.dtype,
            }
            .into());
        }
        self.sorting = Some(ctx.request_scratch_buffer(input.shape.num_elements())?);
        ctx.allocate_persistent(std::mem::size_of::<i32>())?.fill(0);
        Ok(())
    }

    fn invoke(&mut self, ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        let values = ctx.inputs.get(0)?.as_slice::<u8>()?;
        let index = self.sorting.ok_or(KernelError::UnknownScratch(0))?;
        let sorted = ctx
            .scratch
            .get_mut(index)?
            .get_mut(..values.len())
            .ok_or(KernelError::UnknownScratch(index.index()))?;
        sorted.copy_from_slice(values);
        sorted.sort_unstable();
        let median = sorted.get(sorted.len() / 2).copied().unwrap_or_default();

        let counter = cast_elements_mut::<i32>(DType::I32, &mut ctx.user_data[..])?;
        let count = counter
            .first_mut()
            .map(|c| {
                *c += 1;
                *c
            })
            .ok_or(KernelError::Failed("invocation counter missing".into()))?;

        fill(ctx.outputs.get_mut(0)?, median)?;
        fill(ctx.outputs.get_mut(1)?, count)
    }

    fn free(&mut self) {
        self.tracker.record();
    }
}

/// `out0 = in0 (i32) + in1 (i8) + in2 (i32)` on the first elements.
#[derive(Debug, Default)]
pub struct MultipleInputs {
    tracker: FreeTracker,
}

impl MultipleInputs {
    pub fn new(tracker: FreeTracker) -> Self {
        Self { tracker }
    }
}

impl Kernel for MultipleInputs {
    fn invoke(&mut self, ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        let a: i32 = first(ctx.inputs.get(0)?)?;
        let b: i8 = first(ctx.inputs.get(1)?)?;
        let c: i32 = first(ctx.inputs.get(2)?)?;
        fill(ctx.outputs.get_mut(0)?, a.wrapping_add(b as i32).wrapping_add(c))
    }

    fn free(&mut self) {
        self.tracker.record();
    }
}

/// Does nothing; accepts omitted operands.
#[derive(Debug, Default)]
pub struct NoOp {
    tracker: FreeTracker,
}

impl NoOp {
    pub fn new(tracker: FreeTracker) -> Self {
        Self { tracker }
    }
}

impl Kernel for NoOp {
    fn invoke(&mut self, _ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        Ok(())
    }

    fn free(&mut self) {
        self.tracker.record();
    }
}

/// Adds one to a variable `i32` tensor in place and copies it out.
#[derive(Debug, Default)]
pub struct Accumulate {
    tracker: FreeTracker,
}

impl Accumulate {
    pub fn new(tracker: FreeTracker) -> Self {
        Self { tracker }
    }
}

impl Kernel for Accumulate {
    fn prepare(&mut self, ctx: &mut PrepareContext<'_>) -> Result<(), KernelError> {
        let state = ctx.input(0).ok_or(KernelError::MissingInput(0))?;
        if !state.is_variable {
            return Err(KernelError::NotVariable(0));
        }
        let output = ctx.output(0).ok_or(KernelError::MissingOutput(0))?;
        if state.shape != output.shape {
            return Err(TensorError::ShapeMismatch {
                op: ACCUMULATE,
                lhs: state.shape.clone(),
                rhs: output.shape.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn invoke(&mut self, ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        let mut state = ctx.inputs.get_mut(0)?;
        let values = state.as_slice_mut::<i32>()?;
        for v in values.iter_mut() {
            *v = v.wrapping_add(1);
        }
        let mut output = ctx.outputs.get_mut(0)?;
        output.as_slice_mut::<i32>()?.copy_from_slice(values);
        Ok(())
    }

    fn free(&mut self) {
        self.tracker.record();
    }
}

/// Arithmetic the elementwise kernels need. Integers wrap.
trait Numeric: Element {
    fn add(self, other: Self) -> Self;
    fn mul(self, other: Self) -> Self;
}

macro_rules! impl_numeric_int {
    ($($t:ty),*) => {$(
        impl Numeric for $t {
            fn add(self, other: Self) -> Self {
                self.wrapping_add(other)
            }
            fn mul(self, other: Self) -> Self {
                self.wrapping_mul(other)
            }
        }
    )*};
}

impl_numeric_int!(i32, i8, u8);

impl Numeric for f32 {
    fn add(self, other: Self) -> Self {
        self + other
    }
    fn mul(self, other: Self) -> Self {
        self * other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Mul,
}

impl BinaryOp {
    fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Mul => "mul",
        }
    }

    fn apply<T: Numeric>(self, a: T, b: T) -> T {
        match self {
            BinaryOp::Add => a.add(b),
            BinaryOp::Mul => a.mul(b),
        }
    }
}

/// Elementwise `add` / `mul` over `f32`, `i32`, `i8` and `u8`.
///
/// Each input either matches the output's element count or holds a single
/// element that is broadcast.
#[derive(Debug)]
pub struct Elementwise {
    op: BinaryOp,
    tracker: FreeTracker,
}

impl Elementwise {
    pub fn add(tracker: FreeTracker) -> Self {
        Self {
            op: BinaryOp::Add,
            tracker,
        }
    }

    pub fn mul(tracker: FreeTracker) -> Self {
        Self {
            op: BinaryOp::Mul,
            tracker,
        }
    }

    fn run<T: Numeric>(&self, ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        let lhs = ctx.inputs.get(0)?.as_slice::<T>()?;
        let rhs = ctx.inputs.get(1)?.as_slice::<T>()?;
        let mut output = ctx.outputs.get_mut(0)?;
        let out = output.as_slice_mut::<T>()?;
        let n = out.len();
        for (k, o) in out.iter_mut().enumerate() {
            let a = lhs[if lhs.len() == n { k } else { 0 }];
            let b = rhs[if rhs.len() == n { k } else { 0 }];
            *o = self.op.apply(a, b);
        }
        Ok(())
    }
}

impl Kernel for Elementwise {
    fn prepare(&mut self, ctx: &mut PrepareContext<'_>) -> Result<(), KernelError> {
        let lhs = ctx.input(0).ok_or(KernelError::MissingInput(0))?;
        let rhs = ctx.input(1).ok_or(KernelError::MissingInput(1))?;
        let out = ctx.output(0).ok_or(KernelError::MissingOutput(0))?;
        let op = self.op.name();

        if !matches!(out.dtype, DType::F32 | DType::I32 | DType::I8 | DType::U8) {
            return Err(TensorError::UnsupportedDType { op, dtype: out.dtype }.into());
        }
        for input in [lhs, rhs] {
            if input.dtype != out.dtype {
                return Err(TensorError::DTypeMismatch {
                    expected: out.dtype,
                    actual: input.dtype,
                }
                .into());
            }
            let n = input.shape.num_elements();
            if n != out.shape.num_elements() && n != 1 {
                return Err(TensorError::ShapeMismatch {
                    op,
                    lhs: input.shape.clone(),
                    rhs: out.shape.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn invoke(&mut self, ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        let dtype = ctx.outputs.get_mut(0)?.dtype();
        match dtype {
            DType::F32 => self.run::<f32>(ctx),
            DType::I32 => self.run::<i32>(ctx),
            DType::I8 => self.run::<i8>(ctx),
            DType::U8 => self.run::<u8>(ctx),
            dtype => Err(TensorError::UnsupportedDType {
                op: self.op.name(),
                dtype,
            }
            .into()),
        }
    }

    fn free(&mut self) {
        self.tracker.record();
    }
}
