// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The interpreter state machine.
//!
//! ```text
//! Created
//!     │  allocate_tensors()   (or the first invoke())
//!     ▼
//! Allocated ──► invoke() ──► invoke() ──► ...
//!
//! Created / Allocated ──(allocation or kernel failure)──► Failed
//! ```
//!
//! `Failed` is terminal. Allocation commits nothing unless every step
//! succeeds; kernels are freed exactly once on drop, in any state.
//!
//! # Arena layout of one interpreter
//!
//! Tail (permanent, in allocation order): operator table, tensor table,
//! kernel persistent data, variable buffers, the activation block sized to
//! the planned peak, the scratch table. Head (rewound per allocation
//! pass): one scratch block sized to the planned scratch peak.

use crate::context::bind;
use crate::records::{allocate_table, read_row, write_table, OpRecord, Span, Tables};
use crate::{
    AllocationError, AlreadySet, ExecutionError, Kernel, KernelError, OpResolver, PrepareContext,
    Profiler, RuntimeConfig, RuntimeError, MAX_OPERANDS,
};
use memory_manager::{
    AllocationCategory, Arena, ArenaAllocator, MemoryError, SharedAllocator, ARENA_ALIGNMENT,
};
use memory_planner::{tensor_intervals, BufferId, GreedyFirstFit, LifetimeInterval, PlacementStrategy};
use model_ir::{graph::Validated, ModelGraph, OperatorDef, TensorDef};
use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use tensor_core::{
    cast_elements, cast_elements_mut, DType, Element, Shape, TensorError, TensorView,
    TensorViewMut,
};

/// Lifecycle state of an [`Interpreter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterState {
    /// Bound to a graph and an arena; nothing allocated yet.
    Created,
    /// Buffers are placed; the graph can be invoked.
    Allocated,
    /// Allocation or execution failed. Terminal.
    Failed,
}

impl fmt::Display for InterpreterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InterpreterState::Created => "created",
            InterpreterState::Allocated => "allocated",
            InterpreterState::Failed => "failed",
        })
    }
}

/// Runs one validated graph out of an arena.
///
/// # Example
/// ```
/// use runtime::{testing, Interpreter};
///
/// let graph = testing::models::simple_model().unwrap();
/// let resolver = testing::mock_resolver();
/// let mut arena = vec![0u8; 2048];
///
/// let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();
/// interpreter.allocate_tensors().unwrap();
/// interpreter.input_mut(0).unwrap().as_slice_mut::<i32>().unwrap()[0] = 21;
/// interpreter.invoke().unwrap();
/// assert_eq!(interpreter.output(0).unwrap().as_slice::<i32>().unwrap()[0], 42);
/// ```
pub struct Interpreter<'a> {
    graph: &'a ModelGraph<Validated>,
    allocator: SharedAllocator<'a>,
    kernels: Vec<Box<dyn Kernel>>,
    strategy: Box<dyn PlacementStrategy>,
    profiler: Option<&'a RefCell<dyn Profiler + 'a>>,
    external_context: Option<&'a dyn Any>,
    enable_profiling: bool,
    state: InterpreterState,
    tables: Option<Tables>,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter that owns an arena over `buffer`.
    pub fn new(
        graph: &'a ModelGraph<Validated>,
        resolver: &dyn OpResolver,
        buffer: &'a mut [u8],
    ) -> Result<Self, RuntimeError> {
        let allocator: SharedAllocator<'a> = Rc::new(RefCell::new(Arena::new(buffer)));
        Self::with_allocator(graph, resolver, allocator)
    }

    /// Creates an interpreter on an allocator that other interpreters may
    /// share.
    ///
    /// Resolves one kernel per operator. If any operator cannot be resolved,
    /// the kernels created so far are freed and an error is returned.
    pub fn with_allocator(
        graph: &'a ModelGraph<Validated>,
        resolver: &dyn OpResolver,
        allocator: SharedAllocator<'a>,
    ) -> Result<Self, RuntimeError> {
        let mut kernels: Vec<Box<dyn Kernel>> = Vec::with_capacity(graph.num_operators());
        for op in graph.iter_operators() {
            match resolve(op, resolver) {
                Ok(kernel) => kernels.push(kernel),
                Err(e) => {
                    kernels.iter_mut().for_each(|k| k.free());
                    return Err(e);
                }
            }
        }
        tracing::info!(
            "interpreter created for '{}' ({} operators, {} tensors)",
            graph.name,
            kernels.len(),
            graph.num_tensors(),
        );
        Ok(Self {
            graph,
            allocator,
            kernels,
            strategy: Box::new(GreedyFirstFit::new()),
            profiler: None,
            external_context: None,
            enable_profiling: true,
            state: InterpreterState::Created,
            tables: None,
        })
    }

    /// Applies the placement strategy and profiling switch from `config`.
    pub fn with_config(mut self, config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        self.strategy = config.create_strategy()?;
        self.enable_profiling = config.enable_profiling;
        Ok(self)
    }

    pub fn with_strategy(mut self, strategy: Box<dyn PlacementStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Attaches a profiler that brackets every operator invocation.
    pub fn with_profiler(mut self, profiler: &'a RefCell<dyn Profiler + 'a>) -> Self {
        self.profiler = Some(profiler);
        self
    }

    pub fn state(&self) -> InterpreterState {
        self.state
    }

    pub fn graph(&self) -> &'a ModelGraph<Validated> {
        self.graph
    }

    /// Stores `context` for kernels to read. Only the first call succeeds.
    pub fn set_external_context(&mut self, context: &'a dyn Any) -> Result<(), AlreadySet> {
        if self.external_context.is_some() {
            tracing::warn!("external context for '{}' is already set", self.graph.name);
            return Err(AlreadySet);
        }
        self.external_context = Some(context);
        Ok(())
    }

    /// The external context, or `None` if it was never set.
    pub fn external_context(&self) -> Option<&'a dyn Any> {
        self.external_context
    }

    /// Plans and commits every buffer the graph needs.
    ///
    /// A no-op once allocated. On failure the interpreter becomes
    /// [`InterpreterState::Failed`]; tail bytes reserved by the failed pass
    /// stay consumed, and other tenants of the arena are unaffected.
    pub fn allocate_tensors(&mut self) -> Result<(), AllocationError> {
        match self.state {
            InterpreterState::Allocated => return Ok(()),
            InterpreterState::Failed => return Err(AllocationError::Failed),
            InterpreterState::Created => {}
        }

        let allocator = Rc::clone(&self.allocator);
        let mut arena = allocator
            .try_borrow_mut()
            .map_err(|_| AllocationError::AllocatorBusy)?;

        match self.commit(&mut *arena) {
            Ok(tables) => {
                self.tables = Some(tables);
                self.state = InterpreterState::Allocated;
                tracing::info!(
                    "'{}' allocated: {} of {} arena bytes used (head {}, tail {})",
                    self.graph.name,
                    arena.used_bytes(),
                    arena.capacity(),
                    arena.head_used_bytes(),
                    arena.tail_used_bytes(),
                );
                Ok(())
            }
            Err(e) => {
                self.state = InterpreterState::Failed;
                tracing::error!("allocation for '{}' failed: {e}", self.graph.name);
                Err(e)
            }
        }
    }

    fn commit(&mut self, arena: &mut dyn ArenaAllocator) -> Result<Tables, AllocationError> {
        let graph = self.graph;
        arena.reset_head();

        let ops = allocate_table::<OpRecord>(
            arena,
            graph.num_operators(),
            AllocationCategory::AllocatorInternal,
        )?;

        // Prepare: kernels reserve persistent data and declare scratch.
        let mut op_records = Vec::with_capacity(graph.num_operators());
        let mut scratch: Vec<LifetimeInterval> = Vec::new();
        for (index, (op, kernel)) in graph
            .iter_operators()
            .zip(self.kernels.iter_mut())
            .enumerate()
        {
            let mut ctx = PrepareContext::new(graph, op, &mut *arena);
            kernel.prepare(&mut ctx).map_err(|e| match e {
                KernelError::Memory(source) => AllocationError::Arena {
                    category: AllocationCategory::OpData,
                    source,
                },
                source => AllocationError::Prepare {
                    operator: op.name.clone(),
                    source,
                },
            })?;
            let (sizes, user_data) = ctx.finish();
            let user_data = match user_data {
                Some((offset, len)) => Span::new(offset, len)?,
                None => Span::UNPLACED,
            };
            op_records.push(OpRecord {
                user_data,
                scratch_first: scratch.len() as u32,
                scratch_count: sizes.as_slice().len() as u32,
            });
            scratch.extend(
                sizes
                    .as_slice()
                    .iter()
                    .enumerate()
                    .map(|(i, &size)| LifetimeInterval::scratch(index, i, size)),
            );
        }

        let tensors = allocate_table::<Span>(
            arena,
            graph.num_tensors(),
            AllocationCategory::EvalTensorData,
        )?;
        let mut spans = vec![Span::UNPLACED; graph.num_tensors()];

        // Variables never share bytes and start zeroed.
        for (id, def) in graph.tensors.iter().enumerate().filter(|(_, t)| t.is_variable) {
            let size = def.size_bytes();
            let offset = tail(arena, size, AllocationCategory::VariableBufferData)?;
            if let Some(bytes) = arena.buffer_mut().get_mut(offset..offset + size) {
                bytes.fill(0);
            }
            spans[id] = Span::new(offset, size)?;
        }

        let intervals = tensor_intervals(graph);
        let plan = self.strategy.place(&intervals, ARENA_ALIGNMENT, available(arena))?;
        let base = if plan.peak_bytes > 0 {
            tail(arena, plan.peak_bytes, AllocationCategory::EvalTensorData)?
        } else {
            0
        };
        for p in &plan.placements {
            if let BufferId::Tensor(id) = p.interval.buffer {
                spans[id] = Span::new(base + p.offset, p.interval.size)?;
            }
        }
        tracing::debug!("'{}' activations: {}", graph.name, plan.summary());

        let scratch_table = if scratch.is_empty() {
            0
        } else {
            let category = AllocationCategory::ScratchBufferRequests;
            let table = allocate_table::<Span>(arena, scratch.len(), category)?;
            // The head was rewound, so scratch may reuse an earlier tenant's bytes.
            let plan = self.strategy.place(&scratch, ARENA_ALIGNMENT, head_room(arena))?;
            let base = arena
                .allocate_head(plan.peak_bytes, ARENA_ALIGNMENT, category)
                .map_err(|source| AllocationError::Arena { category, source })?;
            let rows = plan
                .placements
                .iter()
                .map(|p| Span::new(base + p.offset, p.interval.size))
                .collect::<Result<Vec<_>, _>>()?;
            write_table(arena.buffer_mut(), table, &rows).map_err(internal)?;
            tracing::debug!("'{}' scratch: {}", graph.name, plan.summary());
            table
        };

        write_table(arena.buffer_mut(), ops, &op_records).map_err(internal)?;
        write_table(arena.buffer_mut(), tensors, &spans).map_err(internal)?;

        Ok(Tables {
            ops,
            tensors,
            scratch: scratch_table,
        })
    }

    /// Runs every operator once, in graph order.
    ///
    /// Allocates first if needed. Stops at the first failing operator and
    /// moves to [`InterpreterState::Failed`]; outputs already written stay
    /// as they are.
    pub fn invoke(&mut self) -> Result<(), ExecutionError> {
        match self.state {
            InterpreterState::Created => self.allocate_tensors()?,
            InterpreterState::Failed => return Err(ExecutionError::Failed),
            InterpreterState::Allocated => {}
        }
        let tables = self.tables.ok_or(ExecutionError::Failed)?;
        let graph = self.graph;
        let external_context = self.external_context;
        #[cfg(feature = "profiling")]
        let profiler = self.profiler.filter(|_| self.enable_profiling);

        let allocator = Rc::clone(&self.allocator);
        let mut arena = allocator
            .try_borrow_mut()
            .map_err(|_| ExecutionError::AllocatorBusy)?;
        let buffer = arena.buffer_mut();

        for (index, (op, kernel)) in graph
            .iter_operators()
            .zip(self.kernels.iter_mut())
            .enumerate()
        {
            let record: OpRecord = read_row(buffer, tables.ops, index)?;
            let mut ctx = bind(graph, op, tables, record, &mut *buffer, external_context)?;

            #[cfg(feature = "profiling")]
            let event = begin_event(profiler, &op.name);

            let outcome = kernel.invoke(&mut ctx);

            #[cfg(feature = "profiling")]
            end_event(profiler, event);

            if let Err(source) = outcome {
                self.state = InterpreterState::Failed;
                tracing::error!("'{}' operator {index} '{}' failed: {source}", graph.name, op.name);
                return Err(ExecutionError::Kernel {
                    index,
                    operator: op.name.clone(),
                    source,
                });
            }
        }
        Ok(())
    }

    pub fn inputs_size(&self) -> usize {
        self.graph.inputs.len()
    }

    pub fn outputs_size(&self) -> usize {
        self.graph.outputs.len()
    }

    pub fn tensors_size(&self) -> usize {
        self.graph.num_tensors()
    }

    /// Graph input `i`.
    pub fn input(&self, i: usize) -> Result<TensorRef<'_>, RuntimeError> {
        self.tensor(lookup("input", &self.graph.inputs, i)?)
    }

    /// Writable handle to graph input `i`, for filling it before invoke.
    pub fn input_mut(&self, i: usize) -> Result<TensorMut<'_>, RuntimeError> {
        self.tensor_mut(lookup("input", &self.graph.inputs, i)?)
    }

    /// Graph output `i`.
    pub fn output(&self, i: usize) -> Result<TensorRef<'_>, RuntimeError> {
        self.tensor(lookup("output", &self.graph.outputs, i)?)
    }

    /// Any tensor by graph index. Constants read their graph data.
    ///
    /// Still readable after a kernel failure, holding whatever the
    /// operators left behind. The handle borrows the arena; drop it before the next invoke.
    pub fn tensor(&self, id: usize) -> Result<TensorRef<'_>, RuntimeError> {
        let (def, span) = self.locate(id, false)?;
        let span = match (def.data.as_ref(), span) {
            (Some(data), _) => {
                return Ok(TensorRef {
                    def,
                    data: TensorBytes::Constant(data.as_bytes()),
                })
            }
            (None, Some(span)) => span,
            (None, None) => return Err(RuntimeError::NoBuffer(id)),
        };
        let arena = self
            .allocator
            .try_borrow()
            .map_err(|_| RuntimeError::AllocatorBusy)?;
        let range = span.range();
        let err = out_of_bounds(span, arena.capacity());
        let data = Ref::filter_map(arena, |a| a.buffer().get(range.offset..range.end()))
            .map_err(|_| err)?;
        Ok(TensorRef {
            def,
            data: TensorBytes::Arena(data),
        })
    }

    /// Writable handle to a non-constant tensor.
    pub fn tensor_mut(&self, id: usize) -> Result<TensorMut<'_>, RuntimeError> {
        let (def, span) = self.locate(id, true)?;
        if def.is_constant() {
            return Err(RuntimeError::ReadOnly(id));
        }
        let span = span.ok_or(RuntimeError::NoBuffer(id))?;
        let arena = self
            .allocator
            .try_borrow_mut()
            .map_err(|_| RuntimeError::AllocatorBusy)?;
        let range = span.range();
        let err = out_of_bounds(span, arena.capacity());
        let data = RefMut::filter_map(arena, |a| a.buffer_mut().get_mut(range.offset..range.end()))
            .map_err(|_| err)?;
        Ok(TensorMut { def, data })
    }

    /// Bytes in use across the whole arena, including other tenants.
    ///
    /// `memory_manager::required_buffer_size` turns this into a buffer
    /// length that fits the same allocation at any base alignment.
    pub fn arena_used_bytes(&self) -> Result<usize, RuntimeError> {
        let arena = self
            .allocator
            .try_borrow()
            .map_err(|_| RuntimeError::AllocatorBusy)?;
        Ok(arena.used_bytes())
    }

    /// A failed invocation leaves its buffers readable but not writable.
    fn locate(
        &self,
        id: usize,
        writable: bool,
    ) -> Result<(&'a TensorDef, Option<Span>), RuntimeError> {
        let tables = match (self.state, self.tables) {
            (InterpreterState::Allocated, Some(tables)) => tables,
            (InterpreterState::Failed, Some(tables)) if !writable => tables,
            _ => return Err(RuntimeError::NotAllocated(self.state)),
        };
        let def = self.graph.tensor(id).ok_or(RuntimeError::IndexOutOfRange {
            kind: "tensor",
            index: id,
            count: self.graph.num_tensors(),
        })?;
        let arena = self
            .allocator
            .try_borrow()
            .map_err(|_| RuntimeError::AllocatorBusy)?;
        let span: Span = read_row(arena.buffer(), tables.tensors, id)?;
        Ok((def, span.is_placed().then_some(span)))
    }
}

impl Drop for Interpreter<'_> {
    fn drop(&mut self) {
        for kernel in &mut self.kernels {
            kernel.free();
        }
        tracing::debug!("interpreter for '{}' dropped ({})", self.graph.name, self.state);
    }
}

impl fmt::Debug for Interpreter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("graph", &self.graph.name)
            .field("state", &self.state)
            .field("strategy", &self.strategy.name())
            .field("kernels", &self.kernels.len())
            .field("profiler", &self.profiler.is_some())
            .field("enable_profiling", &self.enable_profiling)
            .finish()
    }
}

fn resolve(op: &OperatorDef, resolver: &dyn OpResolver) -> Result<Box<dyn Kernel>, RuntimeError> {
    let count = op.inputs.len().max(op.outputs.len());
    if count > MAX_OPERANDS {
        return Err(RuntimeError::TooManyOperands {
            operator: op.name.clone(),
            count,
            max: MAX_OPERANDS,
        });
    }
    resolver
        .create_kernel(&op.code)
        .ok_or_else(|| RuntimeError::UnresolvedOperator {
            operator: op.name.clone(),
            code: op.code.to_string(),
        })
}

fn lookup(kind: &'static str, ids: &[usize], index: usize) -> Result<usize, RuntimeError> {
    ids.get(index).copied().ok_or(RuntimeError::IndexOutOfRange {
        kind,
        index,
        count: ids.len(),
    })
}

fn tail(
    arena: &mut dyn ArenaAllocator,
    size: usize,
    category: AllocationCategory,
) -> Result<usize, AllocationError> {
    arena
        .allocate_tail(size, ARENA_ALIGNMENT, category)
        .map_err(|source| AllocationError::Arena { category, source })
}

fn available(arena: &dyn ArenaAllocator) -> usize {
    arena.capacity().saturating_sub(arena.used_bytes())
}

fn head_room(arena: &dyn ArenaAllocator) -> usize {
    arena.capacity().saturating_sub(arena.tail_used_bytes())
}

fn internal(source: MemoryError) -> AllocationError {
    AllocationError::Arena {
        category: AllocationCategory::AllocatorInternal,
        source,
    }
}

fn out_of_bounds(span: Span, capacity: usize) -> RuntimeError {
    RuntimeError::Memory(MemoryError::OutOfBounds {
        offset: span.range().offset,
        len: span.range().len,
        capacity,
    })
}

#[cfg(feature = "profiling")]
fn begin_event(
    profiler: Option<&RefCell<dyn Profiler + '_>>,
    tag: &str,
) -> Option<crate::EventHandle> {
    let mut profiler = match profiler?.try_borrow_mut() {
        Ok(p) => p,
        Err(_) => {
            tracing::warn!("profiler busy, '{tag}' not profiled");
            return None;
        }
    };
    profiler
        .begin_event(tag)
        .map_err(|e| tracing::warn!("profiler begin for '{tag}' failed: {e}"))
        .ok()
}

#[cfg(feature = "profiling")]
fn end_event(profiler: Option<&RefCell<dyn Profiler + '_>>, event: Option<crate::EventHandle>) {
    let (Some(profiler), Some(handle)) = (profiler, event) else {
        return;
    };
    match profiler.try_borrow_mut() {
        Ok(mut p) => {
            if let Err(e) = p.end_event(handle) {
                tracing::warn!("profiler end failed: {e}");
            }
        }
        Err(_) => tracing::warn!("profiler busy, event {} not closed", handle.0),
    }
}

enum TensorBytes<'i> {
    Arena(Ref<'i, [u8]>),
    Constant(&'i [u8]),
}

/// Read handle to a tensor's buffer.
pub struct TensorRef<'i> {
    def: &'i TensorDef,
    data: TensorBytes<'i>,
}

impl<'i> TensorRef<'i> {
    pub fn def(&self) -> &'i TensorDef {
        self.def
    }

    pub fn dtype(&self) -> DType {
        self.def.dtype
    }

    pub fn shape(&self) -> &'i Shape {
        &self.def.shape
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            TensorBytes::Arena(data) => &data[..],
            TensorBytes::Constant(data) => &data[..],
        }
    }

    pub fn as_slice<T: Element>(&self) -> Result<&[T], TensorError> {
        cast_elements(self.def.dtype, self.as_bytes())
    }

    pub fn view(&self) -> Result<TensorView<'_>, TensorError> {
        TensorView::new(&self.def.shape, self.def.dtype, self.as_bytes())
    }
}

impl fmt::Debug for TensorRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorRef")
            .field("tensor", &self.def.name)
            .field("bytes", &self.as_bytes().len())
            .finish()
    }
}

/// Write handle to a tensor's arena buffer.
pub struct TensorMut<'i> {
    def: &'i TensorDef,
    data: RefMut<'i, [u8]>,
}

impl<'i> TensorMut<'i> {
    pub fn def(&self) -> &'i TensorDef {
        self.def
    }

    pub fn dtype(&self) -> DType {
        self.def.dtype
    }

    pub fn shape(&self) -> &'i Shape {
        &self.def.shape
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn as_slice<T: Element>(&self) -> Result<&[T], TensorError> {
        cast_elements(self.def.dtype, &self.data)
    }

    pub fn as_slice_mut<T: Element>(&mut self) -> Result<&mut [T], TensorError> {
        cast_elements_mut(self.def.dtype, &mut self.data)
    }

    pub fn view_mut(&mut self) -> Result<TensorViewMut<'_>, TensorError> {
        TensorViewMut::new(&self.def.shape, self.def.dtype, &mut self.data)
    }
}

impl fmt::Debug for TensorMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorMut")
            .field("tensor", &self.def.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}
