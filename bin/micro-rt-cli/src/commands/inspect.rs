// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `micro-rt inspect` command: display graph structure and buffer lifetimes.
//!
//! Needs no arena. Placement is computed with an unbounded capacity so both
//! strategies can be compared against the live-bytes lower bound.

use super::{load_model, truncate};
use memory_manager::ARENA_ALIGNMENT;
use memory_planner::{peak_live_bytes, tensor_intervals, GreedyFirstFit, Linear, PlacementStrategy};
use std::path::PathBuf;

pub fn execute(model: PathBuf) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              micro-rt · Graph Inspector              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let graph = load_model(&model)?;

    // ── Summary ────────────────────────────────────────────────
    println!("  {}", graph.summary());
    println!();

    // ── Tensors ────────────────────────────────────────────────
    println!(
        "  {:<4} {:<24} {:<10} {:<6} {:<14} {:>10}",
        "Idx", "Name", "Kind", "DType", "Shape", "Bytes",
    );
    println!("  {}", "-".repeat(74));
    for (i, t) in graph.tensors.iter().enumerate() {
        println!(
            "  {:<4} {:<24} {:<10} {:<6} {:<14} {:>10}",
            format!("t{i}"),
            truncate(&t.name, 24),
            t.kind().as_str(),
            t.dtype.as_str(),
            t.shape.to_string(),
            t.size_bytes(),
        );
    }
    println!();

    // ── Operators ──────────────────────────────────────────────
    println!("  Operators:");
    for (i, op) in graph.iter_operators().enumerate() {
        println!("   {i:>3}  {}", op.summary());
    }
    println!();

    // ── Lifetimes ──────────────────────────────────────────────
    let intervals = tensor_intervals(&graph);
    let num_ops = graph.num_operators();
    println!("  Activation lifetimes:");
    for iv in &intervals {
        let bar: String = (0..num_ops)
            .map(|op| if iv.is_alive_at(op) { '█' } else { '·' })
            .collect();
        println!(
            "   {:<6} {:>8} B  ops {:>3}..={:<3} {}",
            iv.buffer.to_string(),
            iv.size,
            iv.first_op,
            iv.last_op,
            bar,
        );
    }
    println!();

    // ── Strategy Comparison ────────────────────────────────────
    println!(
        "  Lower bound (peak live bytes): {} B",
        peak_live_bytes(&intervals, ARENA_ALIGNMENT),
    );
    let strategies: Vec<Box<dyn PlacementStrategy>> =
        vec![Box::new(GreedyFirstFit::new()), Box::new(Linear::new())];
    for strategy in &strategies {
        match strategy.place(&intervals, ARENA_ALIGNMENT, usize::MAX) {
            Ok(plan) => println!("   {:<20} {}", strategy.name(), plan.summary()),
            Err(e) => println!("   {:<20} failed: {e}", strategy.name()),
        }
    }
    println!();
    Ok(())
}
