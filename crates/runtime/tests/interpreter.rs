// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: interpreter lifecycle over real arenas.
//!
//! Buffers, graphs and profilers are declared before the interpreters that
//! borrow them, so the interpreters drop first.

use memory_manager::{
    align_up, required_buffer_size, AllocationCategory, ArenaAllocator, RecordingArena,
    SharedAllocator, ARENA_ALIGNMENT,
};
use model_ir::graph::Validated;
use model_ir::{ModelGraph, OpCode, OperatorDef, TensorDef};
use runtime::testing::{self, kernels, models, FreeTracker};
use runtime::{
    AllocationError, AlreadySet, CountingProfiler, ExecutionError, Interpreter,
    InterpreterState, InvokeContext, Kernel, KernelError, MutableOpResolver, RuntimeConfig,
    RuntimeError,
};
use std::cell::RefCell;
use std::rc::Rc;
use tensor_core::{AlignedBytes, DType, Shape};

// ── Helpers ────────────────────────────────────────────────────

fn recording(buf: &mut [u8]) -> Rc<RefCell<RecordingArena<'_>>> {
    Rc::new(RefCell::new(RecordingArena::create(buf).unwrap()))
}

fn set_i32(interpreter: &Interpreter<'_>, input: usize, value: i32) {
    interpreter.input_mut(input).unwrap().as_slice_mut::<i32>().unwrap()[0] = value;
}

fn output_i32(interpreter: &Interpreter<'_>, output: usize) -> i32 {
    interpreter.output(output).unwrap().as_slice::<i32>().unwrap()[0]
}

/// Head bytes `graph` needs with an arena to itself.
fn head_bytes_alone(graph: &ModelGraph<Validated>, resolver: &MutableOpResolver) -> usize {
    let mut buf = vec![0u8; 16 * 1024];
    let arena = recording(&mut buf);
    let mut interpreter = Interpreter::with_allocator(graph, resolver, arena.clone()).unwrap();
    interpreter.allocate_tensors().unwrap();
    drop(interpreter);
    let head = arena.borrow().head_used_bytes();
    head
}

/// Writes the external context, an `i32`, to output 0.
struct ContextReader;

impl Kernel for ContextReader {
    fn invoke(&mut self, ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        let value = ctx
            .external_context()
            .and_then(|c| c.downcast_ref::<i32>())
            .copied()
            .ok_or(KernelError::Failed("no external context".into()))?;
        ctx.outputs.get_mut(0)?.as_slice_mut::<i32>()?[0] = value;
        Ok(())
    }
}

struct Failing;

/// Writes 7 to output 0, then fails.
struct WriteThenFail;

impl Kernel for WriteThenFail {
    fn invoke(&mut self, ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        ctx.outputs.get_mut(0)?.as_slice_mut::<i32>()?[0] = 7;
        Err(KernelError::Failed("after write".into()))
    }
}

impl Kernel for Failing {
    fn invoke(&mut self, _ctx: &mut InvokeContext<'_>) -> Result<(), KernelError> {
        Err(KernelError::Failed("boom".into()))
    }
}

fn resolver_with(factory: fn() -> Box<dyn Kernel>) -> MutableOpResolver {
    let mut resolver = MutableOpResolver::new();
    resolver.add(OpCode::custom(kernels::MOCK_CUSTOM), factory);
    resolver
}

// ── Lifecycle ──────────────────────────────────────────────────

#[test]
fn test_basic_interpreter() {
    let graph = models::simple_model().unwrap();
    let tracker = FreeTracker::new();
    let resolver = testing::tracked_resolver(&tracker);
    let mut arena = vec![0u8; 2048];

    {
        let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();
        assert_eq!(interpreter.state(), InterpreterState::Created);
        interpreter.allocate_tensors().unwrap();
        assert_eq!(interpreter.state(), InterpreterState::Allocated);

        assert_eq!(interpreter.inputs_size(), 1);
        assert_eq!(interpreter.outputs_size(), 2);
        assert_eq!(interpreter.tensors_size(), 4);

        let input = interpreter.input(0).unwrap();
        assert_eq!(input.dtype(), DType::I32);
        assert_eq!(input.shape(), &Shape::vector(1));
        assert_eq!(input.as_bytes().len(), 4);
        drop(input);

        set_i32(&interpreter, 0, 21);
        interpreter.invoke().unwrap();
        assert_eq!(output_i32(&interpreter, 0), 42);
        assert_eq!(output_i32(&interpreter, 1), 42);

        let weight = interpreter.tensor(1).unwrap();
        assert_eq!(weight.as_slice::<i32>().unwrap(), &[21]);
        drop(weight);
        assert!(matches!(interpreter.tensor_mut(1), Err(RuntimeError::ReadOnly(1))));

        assert!(interpreter.arena_used_bytes().unwrap() <= 1028);
        assert_eq!(tracker.count(), 0);
    }
    assert_eq!(tracker.count(), 1);
}

#[test]
fn test_index_out_of_range() {
    let graph = models::simple_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut arena = vec![0u8; 2048];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();
    interpreter.allocate_tensors().unwrap();

    assert!(matches!(
        interpreter.input(1),
        Err(RuntimeError::IndexOutOfRange { kind: "input", index: 1, count: 1 })
    ));
    assert!(matches!(
        interpreter.tensor(9),
        Err(RuntimeError::IndexOutOfRange { kind: "tensor", .. })
    ));
}

#[test]
fn test_no_allocation_until_invoke() {
    let graph = models::complex_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut buf = vec![0u8; 8192];
    let arena = recording(&mut buf);
    let shared: SharedAllocator<'_> = arena.clone();

    let mut interpreter = Interpreter::with_allocator(&graph, &resolver, shared).unwrap();
    assert!(matches!(
        interpreter.input(0),
        Err(RuntimeError::NotAllocated(InterpreterState::Created))
    ));
    for category in [
        AllocationCategory::EvalTensorData,
        AllocationCategory::VariableBufferData,
        AllocationCategory::OpData,
        AllocationCategory::ScratchBufferRequests,
    ] {
        assert_eq!(arena.borrow().recorded(category).count, 0);
    }
    assert_eq!(
        arena.borrow().tail_used_bytes(),
        align_up(RecordingArena::BOOKKEEPING_BYTES, ARENA_ALIGNMENT)
    );

    interpreter.invoke().unwrap();
    assert_eq!(interpreter.state(), InterpreterState::Allocated);
    assert!(arena.borrow().recorded(AllocationCategory::EvalTensorData).used_bytes > 0);
}

#[test]
fn test_complex_model_allocations() {
    let graph = models::complex_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut buf = vec![0u8; 8192];
    let arena = recording(&mut buf);

    let mut interpreter = Interpreter::with_allocator(&graph, &resolver, arena.clone()).unwrap();
    interpreter.allocate_tensors().unwrap();
    set_i32(&interpreter, 0, 5);
    interpreter.invoke().unwrap();
    assert_eq!(output_i32(&interpreter, 0), 5);

    for state in [1, 3, 5] {
        assert_eq!(interpreter.tensor(state).unwrap().as_slice::<i32>().unwrap(), &[0]);
    }

    let recorder = arena.borrow();
    assert!(recorder.head_used_bytes() > 0);
    assert!(recorder.recorded(AllocationCategory::EvalTensorData).used_bytes > 0);
    let variables = recorder.recorded(AllocationCategory::VariableBufferData);
    assert_eq!(variables.count, 3);
    assert_eq!(variables.requested_bytes, 12);
    assert_eq!(recorder.recorded(AllocationCategory::OpData).count, 0);
    assert_eq!(recorder.failed_requests(), 0);
}

#[test]
fn test_allocate_twice_is_noop() {
    let graph = models::simple_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut arena = vec![0u8; 2048];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();

    interpreter.allocate_tensors().unwrap();
    let used = interpreter.arena_used_bytes().unwrap();
    interpreter.allocate_tensors().unwrap();
    assert_eq!(interpreter.arena_used_bytes().unwrap(), used);
}

#[test]
fn test_multi_tenant_interpreter() {
    let simple = models::simple_model().unwrap();
    let complex = models::complex_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut buf = vec![0u8; 8192];
    let arena = recording(&mut buf);

    let mut first = Interpreter::with_allocator(&simple, &resolver, arena.clone()).unwrap();
    first.allocate_tensors().unwrap();
    let used_first = first.arena_used_bytes().unwrap();
    let head_first = arena.borrow().head_used_bytes();

    let mut second = Interpreter::with_allocator(&complex, &resolver, arena.clone()).unwrap();
    second.allocate_tensors().unwrap();
    let used_second = second.arena_used_bytes().unwrap();
    assert!(used_second > used_first);

    let mut third = Interpreter::with_allocator(&simple, &resolver, arena.clone()).unwrap();
    third.allocate_tensors().unwrap();
    // Scratch is shared through the head, so only the tail grows.
    assert_eq!(arena.borrow().head_used_bytes(), head_first);
    assert!(third.arena_used_bytes().unwrap() > used_second);

    set_i32(&first, 0, 1);
    set_i32(&second, 0, 2);
    set_i32(&third, 0, 3);
    first.invoke().unwrap();
    second.invoke().unwrap();
    third.invoke().unwrap();
    assert_eq!(output_i32(&first, 0), 22);
    assert_eq!(output_i32(&second, 0), 2);
    assert_eq!(output_i32(&third, 0), 24);
}

#[test]
fn test_multi_tenant_head_bounded_by_largest_tenant() {
    let stateful = models::stateful_model().unwrap();
    let simple = models::simple_model().unwrap();
    let complex = models::complex_model().unwrap();
    let large = models::stateful_model_with_len(1000).unwrap();
    let resolver = testing::mock_resolver();

    let graphs = [&stateful, &simple, &large, &complex];
    let alone: Vec<usize> = graphs
        .iter()
        .map(|&g| head_bytes_alone(g, &resolver))
        .collect();
    let largest = alone.iter().copied().max().unwrap();
    let total: usize = alone.iter().sum();
    assert!(largest >= 1000);

    for order in [graphs, [&complex, &large, &simple, &stateful]] {
        let mut buf = vec![0u8; 16 * 1024];
        let arena = recording(&mut buf);
        let mut tenants: Vec<Interpreter<'_>> = order
            .iter()
            .map(|&g| {
                let mut tenant = Interpreter::with_allocator(g, &resolver, arena.clone()).unwrap();
                tenant.allocate_tensors().unwrap();
                tenant
            })
            .collect();

        assert_eq!(arena.borrow().head_used_bytes(), largest);
        assert!(arena.borrow().head_used_bytes() < total);

        for tenant in &mut tenants {
            tenant.invoke().unwrap();
        }
        assert_eq!(arena.borrow().head_used_bytes(), largest);
    }
}

#[test]
fn test_later_tenant_reuses_rewound_head() {
    let large = models::stateful_model_with_len(1024).unwrap();
    let small = models::stateful_model_with_len(512).unwrap();
    let resolver = testing::mock_resolver();

    // Tail bytes the small tenant consumes on its own.
    let small_tail = {
        let mut buf = vec![0u8; 8192];
        let arena = recording(&mut buf);
        let before = arena.borrow().tail_used_bytes();
        let mut alone = Interpreter::with_allocator(&small, &resolver, arena.clone()).unwrap();
        alone.allocate_tensors().unwrap();
        drop(alone);
        let after = arena.borrow().tail_used_bytes();
        after - before
    };

    let mut buf = vec![0u8; 8192];
    let arena = recording(&mut buf);
    let mut first = Interpreter::with_allocator(&large, &resolver, arena.clone()).unwrap();
    first.allocate_tensors().unwrap();
    assert_eq!(arena.borrow().head_used_bytes(), 1024);

    // Leave room for the small tenant's tail plus 64 bytes, far less than
    // its 512 bytes of scratch.
    {
        let mut recorder = arena.borrow_mut();
        let gap = recorder.capacity() - recorder.used_bytes();
        let fill = gap - (small_tail + 64);
        recorder
            .allocate_tail(fill, ARENA_ALIGNMENT, AllocationCategory::OpData)
            .unwrap();
    }

    let mut second = Interpreter::with_allocator(&small, &resolver, arena.clone()).unwrap();
    second.allocate_tensors().unwrap();
    {
        let recorder = arena.borrow();
        assert_eq!(recorder.head_used_bytes(), 1024);
        assert_eq!(recorder.capacity() - recorder.used_bytes(), 64);
        assert_eq!(recorder.failed_requests(), 0);
    }

    second.input_mut(0).unwrap().as_bytes_mut().fill(5);
    second.invoke().unwrap();
    assert_eq!(second.output(0).unwrap().as_slice::<u8>().unwrap(), &[5]);
    first.invoke().unwrap();
}

#[test]
fn test_allocator_busy() {
    let graph = models::simple_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut buf = vec![0u8; 2048];
    let arena = recording(&mut buf);
    let mut interpreter = Interpreter::with_allocator(&graph, &resolver, arena.clone()).unwrap();

    let guard = arena.borrow_mut();
    assert!(matches!(
        interpreter.allocate_tensors(),
        Err(AllocationError::AllocatorBusy)
    ));
    drop(guard);
    assert_eq!(interpreter.state(), InterpreterState::Created);
    interpreter.allocate_tensors().unwrap();
}

#[test]
fn test_kernels_freed_once_in_any_state() {
    let graph = models::complex_model().unwrap();
    let tracker = FreeTracker::new();
    let resolver = testing::tracked_resolver(&tracker);

    // Created, never allocated.
    let mut arena = vec![0u8; 8192];
    drop(Interpreter::new(&graph, &resolver, &mut arena).unwrap());
    assert_eq!(tracker.count(), 3);

    // Failed during allocation.
    let mut tiny = vec![0u8; 32];
    let mut failed = Interpreter::new(&graph, &resolver, &mut tiny).unwrap();
    assert!(failed.allocate_tensors().is_err());
    assert_eq!(failed.state(), InterpreterState::Failed);
    drop(failed);
    assert_eq!(tracker.count(), 6);

    // Allocated and invoked.
    let mut invoked = Interpreter::new(&graph, &resolver, &mut arena).unwrap();
    invoked.invoke().unwrap();
    drop(invoked);
    assert_eq!(tracker.count(), 9);
}

// ── Kernels ────────────────────────────────────────────────────

#[test]
fn test_kernel_memory_planning() {
    let graph = models::stateful_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut buf = vec![0u8; 4096];
    let arena = recording(&mut buf);

    let mut interpreter = Interpreter::with_allocator(&graph, &resolver, arena.clone()).unwrap();
    interpreter.allocate_tensors().unwrap();
    interpreter
        .input_mut(0)
        .unwrap()
        .as_slice_mut::<u8>()
        .unwrap()
        .copy_from_slice(&[2, 3, 1]);

    for count in 1..=3 {
        interpreter.invoke().unwrap();
        assert_eq!(interpreter.output(0).unwrap().as_slice::<u8>().unwrap(), &[2]);
        assert_eq!(output_i32(&interpreter, 1), count);
    }

    let recorder = arena.borrow();
    let op_data = recorder.recorded(AllocationCategory::OpData);
    assert_eq!(op_data.count, 1);
    assert_eq!(op_data.requested_bytes, 4);
    assert!(recorder.head_used_bytes() >= 3);
}

#[test]
fn test_multiple_inputs() {
    let graph = models::multiple_inputs_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut arena = vec![0u8; 2048];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();
    interpreter.allocate_tensors().unwrap();

    assert_eq!(interpreter.inputs_size(), 3);
    set_i32(&interpreter, 0, 21);
    interpreter.input_mut(1).unwrap().as_slice_mut::<i8>().unwrap()[0] = 21;
    set_i32(&interpreter, 2, 24);
    interpreter.invoke().unwrap();
    assert_eq!(output_i32(&interpreter, 0), 66);
}

#[test]
fn test_null_inputs_and_outputs() {
    let graph = models::null_io_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut arena = vec![0u8; 2000];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();
    interpreter.allocate_tensors().unwrap();

    set_i32(&interpreter, 0, 7);
    interpreter.invoke().unwrap();
    assert_eq!(output_i32(&interpreter, 0), 7);
}

#[test]
fn test_accumulator_keeps_state() {
    let graph = models::accumulator_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut arena = vec![0u8; 2048];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();

    for expected in 1..=3 {
        interpreter.invoke().unwrap();
        assert_eq!(output_i32(&interpreter, 0), expected);
    }
    assert_eq!(interpreter.tensor(0).unwrap().as_slice::<i32>().unwrap(), &[3]);
}

#[test]
fn test_builtin_add() {
    let graph = models::add_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut arena = vec![0u8; 2048];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();
    interpreter.allocate_tensors().unwrap();

    set_i32(&interpreter, 0, 21);
    interpreter.invoke().unwrap();
    assert_eq!(output_i32(&interpreter, 0), 42);
}

#[test]
fn test_large_tensor_broadcast_mul() {
    let graph = models::model_with_256x256_tensor().unwrap();
    let resolver = testing::mock_resolver();
    let mut arena = vec![0u8; 200_000];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();
    interpreter.allocate_tensors().unwrap();

    interpreter.input_mut(0).unwrap().as_bytes_mut().fill(3);
    interpreter.invoke().unwrap();
    let output = interpreter.output(0).unwrap();
    assert_eq!(output.as_bytes().len(), 256 * 256);
    assert!(output.as_bytes().iter().all(|&v| v == 3));
}

#[test]
fn test_external_context() {
    let graph = models::simple_model().unwrap();
    let resolver = resolver_with(|| Box::new(ContextReader));
    let value = 1234i32;
    let other = 5i32;
    let mut arena = vec![0u8; 2048];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();

    assert!(interpreter.external_context().is_none());
    interpreter.set_external_context(&value).unwrap();
    assert_eq!(interpreter.set_external_context(&other), Err(AlreadySet));
    assert_eq!(
        interpreter.external_context().and_then(|c| c.downcast_ref::<i32>()),
        Some(&1234)
    );

    interpreter.invoke().unwrap();
    assert_eq!(output_i32(&interpreter, 0), 1234);
}

#[test]
fn test_kernel_failure_is_terminal() {
    let graph = models::simple_model().unwrap();
    let resolver = resolver_with(|| Box::new(Failing));
    let mut arena = vec![0u8; 2048];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();

    let err = interpreter.invoke().unwrap_err();
    assert!(matches!(err, ExecutionError::Kernel { index: 0, .. }));
    assert_eq!(interpreter.state(), InterpreterState::Failed);
    assert!(matches!(interpreter.invoke(), Err(ExecutionError::Failed)));
    assert!(matches!(
        interpreter.allocate_tensors(),
        Err(AllocationError::Failed)
    ));
    assert!(matches!(
        interpreter.input_mut(0),
        Err(RuntimeError::NotAllocated(InterpreterState::Failed))
    ));
}

#[test]
fn test_partial_outputs_readable_after_kernel_failure() {
    let graph = models::simple_model().unwrap();
    let resolver = resolver_with(|| Box::new(WriteThenFail));
    let mut arena = vec![0u8; 2048];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena).unwrap();

    assert!(interpreter.invoke().is_err());
    assert_eq!(interpreter.state(), InterpreterState::Failed);
    assert_eq!(output_i32(&interpreter, 0), 7);
    assert_eq!(interpreter.tensor(1).unwrap().as_slice::<i32>().unwrap(), &[21]);
    assert!(matches!(
        interpreter.tensor_mut(2),
        Err(RuntimeError::NotAllocated(InterpreterState::Failed))
    ));
}

// ── Failure paths ──────────────────────────────────────────────

#[test]
fn test_small_arena_fails_allocation() {
    let graph = models::complex_model().unwrap();
    let resolver = testing::mock_resolver();
    let mut buf = vec![0u8; align_up(RecordingArena::BOOKKEEPING_BYTES, ARENA_ALIGNMENT) + 32];
    let arena = recording(&mut buf);

    let mut interpreter = Interpreter::with_allocator(&graph, &resolver, arena.clone()).unwrap();
    let err = interpreter.invoke().unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::Allocation(AllocationError::Arena {
            category: AllocationCategory::AllocatorInternal,
            ..
        })
    ));
    assert_eq!(interpreter.state(), InterpreterState::Failed);

    let recorder = arena.borrow();
    for category in [
        AllocationCategory::EvalTensorData,
        AllocationCategory::VariableBufferData,
        AllocationCategory::OpData,
    ] {
        assert_eq!(recorder.recorded(category).used_bytes, 0);
    }
    assert_eq!(recorder.failed_requests(), 1);
}

#[test]
fn test_unresolved_operator_frees_created_kernels() {
    let tensors = vec![
        TensorDef::activation("input", DType::I32, Shape::vector(1)),
        TensorDef::constant(
            "bias",
            DType::I32,
            Shape::vector(1),
            AlignedBytes::from_elements(&[1i32]),
        ),
        TensorDef::activation("sum", DType::I32, Shape::vector(1)),
        TensorDef::activation("output", DType::I32, Shape::vector(1)),
    ];
    let ops = vec![
        OperatorDef::new("add", OpCode::Add, vec![Some(0), Some(1)], vec![Some(2)]),
        OperatorDef::new(
            "conv",
            OpCode::custom("conv_2d"),
            vec![Some(2)],
            vec![Some(3)],
        ),
    ];
    let graph = ModelGraph::new("unresolved", tensors, ops, vec![0], vec![3])
        .validate()
        .unwrap();
    let tracker = FreeTracker::new();
    let resolver = testing::tracked_resolver(&tracker);
    let mut arena = vec![0u8; 2048];

    let err = Interpreter::new(&graph, &resolver, &mut arena).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::UnresolvedOperator { ref operator, ref code }
            if operator == "conv" && code == "conv_2d"
    ));
    assert_eq!(tracker.count(), 1);
}

// ── Arena sizing ───────────────────────────────────────────────

#[test]
fn test_arena_used_bytes_is_sufficient() {
    let graph = models::simple_model().unwrap();
    let resolver = testing::mock_resolver();

    let mut big = vec![0u8; 256 * 1024];
    let used = {
        let mut interpreter = Interpreter::new(&graph, &resolver, &mut big).unwrap();
        interpreter.allocate_tensors().unwrap();
        interpreter.arena_used_bytes().unwrap()
    };
    assert!(used > 0);

    let mut exact = vec![0u8; required_buffer_size(used)];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut exact).unwrap();
    interpreter.allocate_tensors().unwrap();
    set_i32(&interpreter, 0, 1);
    interpreter.invoke().unwrap();
    assert_eq!(output_i32(&interpreter, 0), 22);
    assert_eq!(interpreter.arena_used_bytes().unwrap(), used);
}

#[test]
fn test_linear_placement_uses_more_arena() {
    let graph = models::complex_model().unwrap();
    let resolver = testing::mock_resolver();
    let linear = RuntimeConfig {
        placement: "linear".into(),
        ..RuntimeConfig::default()
    };

    let mut greedy_buf = vec![0u8; 8192];
    let mut greedy = Interpreter::new(&graph, &resolver, &mut greedy_buf).unwrap();
    greedy.allocate_tensors().unwrap();

    let mut linear_buf = vec![0u8; 8192];
    let mut linear = Interpreter::new(&graph, &resolver, &mut linear_buf)
        .unwrap()
        .with_config(&linear)
        .unwrap();
    linear.allocate_tensors().unwrap();
    set_i32(&linear, 0, 9);
    linear.invoke().unwrap();
    assert_eq!(output_i32(&linear, 0), 9);

    assert!(linear.arena_used_bytes().unwrap() > greedy.arena_used_bytes().unwrap());
}

#[test]
fn test_unknown_placement_in_config() {
    let graph = models::simple_model().unwrap();
    let resolver = testing::mock_resolver();
    let config = RuntimeConfig {
        placement: "best-fit".into(),
        ..RuntimeConfig::default()
    };
    let mut arena = vec![0u8; 2048];
    let result = Interpreter::new(&graph, &resolver, &mut arena)
        .unwrap()
        .with_config(&config);
    assert!(matches!(result, Err(RuntimeError::ConfigError(_))));
}

// ── Profiling ──────────────────────────────────────────────────

#[test]
fn test_profiler_hooks() {
    let graph = models::complex_model().unwrap();
    let resolver = testing::mock_resolver();
    let profiler = RefCell::new(CountingProfiler::new());
    let mut arena = vec![0u8; 4096];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena)
        .unwrap()
        .with_profiler(&profiler);

    interpreter.invoke().unwrap();
    let expected = if cfg!(feature = "profiling") { 3 } else { 0 };
    assert_eq!(profiler.borrow().event_starts(), expected);
    assert_eq!(profiler.borrow().event_ends(), expected);
}

#[test]
fn test_profiling_disabled_by_config() {
    let graph = models::complex_model().unwrap();
    let resolver = testing::mock_resolver();
    let profiler = RefCell::new(CountingProfiler::new());
    let config = RuntimeConfig {
        enable_profiling: false,
        ..RuntimeConfig::default()
    };
    let mut arena = vec![0u8; 4096];
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut arena)
        .unwrap()
        .with_config(&config)
        .unwrap()
        .with_profiler(&profiler);

    interpreter.invoke().unwrap();
    assert_eq!(profiler.borrow().event_starts(), 0);
}
