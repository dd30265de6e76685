// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `micro-rt run` command: invoke a graph with the mock kernels.
//!
//! ```text
//! Interpreter: Created → allocate_tensors → Allocated → invoke × N
//! ```

use super::{load_model, truncate};
use runtime::{testing, Interpreter, RuntimeConfig, TensorMut, TensorRef, TimingProfiler};
use std::cell::RefCell;
use std::path::PathBuf;
use std::time::Instant;
use tensor_core::{DType, TensorError};

/// Elements printed per output.
const PREVIEW_LEN: usize = 8;

pub fn execute(
    model: PathBuf,
    config: RuntimeConfig,
    input: Vec<f64>,
    iterations: usize,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              micro-rt · Graph Runner                 ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let graph = load_model(&model)?;
    let size = config.parse_arena_size()?;

    println!("  Config:");
    println!("   Model:      {}", model.display());
    println!("   Arena:      {size}");
    println!("   Placement:  {}", config.placement);
    println!("   Profiling:  {}", config.enable_profiling);
    println!("   Iterations: {iterations}");
    println!();

    let resolver = testing::mock_resolver();
    let profiler = RefCell::new(TimingProfiler::new(graph.num_operators() * iterations.max(1)));
    let mut buffer = size.allocate_buffer();
    let mut interpreter = Interpreter::new(&graph, &resolver, &mut buffer)?
        .with_config(&config)?
        .with_profiler(&profiler);

    // ── Allocate ───────────────────────────────────────────────
    println!("  [1/3] Allocating tensors...");
    interpreter.allocate_tensors()?;
    let used = interpreter.arena_used_bytes()?;
    println!("        {used} of {} bytes used.", size.as_bytes());
    println!();

    // ── Inputs ─────────────────────────────────────────────────
    println!("  [2/3] Filling {} inputs...", interpreter.inputs_size());
    for i in 0..interpreter.inputs_size() {
        let value = input.get(i).or(input.last()).copied().unwrap_or(0.0);
        let mut tensor = interpreter.input_mut(i)?;
        fill(&mut tensor, value)?;
        println!("        {} = {value}", truncate(&tensor.def().name, 32));
    }
    println!();

    // ── Invoke ─────────────────────────────────────────────────
    println!("  [3/3] Invoking...");
    let start = Instant::now();
    for _ in 0..iterations {
        interpreter.invoke()?;
    }
    let total = start.elapsed();

    let mut metrics = profiler
        .try_borrow_mut()
        .map_err(|_| anyhow::anyhow!("profiler is still borrowed"))?
        .take_metrics();
    metrics.finalise(total, used, iterations);
    println!();

    // ── Results ────────────────────────────────────────────────
    println!("  Outputs:");
    for i in 0..interpreter.outputs_size() {
        let tensor = interpreter.output(i)?;
        println!(
            "   {:<24} {}{} = {}",
            truncate(&tensor.def().name, 24),
            tensor.dtype(),
            tensor.shape(),
            preview(&tensor)?,
        );
    }
    println!();
    println!("  Metrics:");
    println!("   {}", metrics.summary());
    println!();
    Ok(())
}

/// Sets every element of `tensor` to `value`, converted to its dtype.
fn fill(tensor: &mut TensorMut<'_>, value: f64) -> Result<(), TensorError> {
    match tensor.dtype() {
        DType::F32 => tensor.as_slice_mut::<f32>()?.fill(value as f32),
        DType::I64 => tensor.as_slice_mut::<i64>()?.fill(value as i64),
        DType::I32 => tensor.as_slice_mut::<i32>()?.fill(value as i32),
        DType::I16 => tensor.as_slice_mut::<i16>()?.fill(value as i16),
        DType::I8 => tensor.as_slice_mut::<i8>()?.fill(value as i8),
        DType::U8 => tensor.as_slice_mut::<u8>()?.fill(value as u8),
    }
    Ok(())
}

/// Formats the first few elements of `tensor`.
fn preview(tensor: &TensorRef<'_>) -> Result<String, TensorError> {
    fn list<T: std::fmt::Display>(values: &[T]) -> String {
        let shown: Vec<String> = values.iter().take(PREVIEW_LEN).map(T::to_string).collect();
        let more = if values.len() > PREVIEW_LEN { ", ..." } else { "" };
        format!("[{}{more}]", shown.join(", "))
    }
    Ok(match tensor.dtype() {
        DType::F32 => list(tensor.as_slice::<f32>()?),
        DType::I64 => list(tensor.as_slice::<i64>()?),
        DType::I32 => list(tensor.as_slice::<i32>()?),
        DType::I16 => list(tensor.as_slice::<i16>()?),
        DType::I8 => list(tensor.as_slice::<i8>()?),
        DType::U8 => list(tensor.as_slice::<u8>()?),
    })
}
