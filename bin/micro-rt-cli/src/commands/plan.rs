// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `micro-rt plan` command: allocate a graph and report arena usage.
//!
//! Runs the full allocation pass (prepare, tables, variables, activations,
//! scratch) against a [`RecordingArena`] so every byte is attributed to a
//! category.

use super::load_model;
use memory_manager::{required_buffer_size, AllocationCategory, RecordingArena, ARENA_ALIGNMENT};
use memory_planner::{plan_tensors, BufferId};
use runtime::{testing, Interpreter, RuntimeConfig};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

pub fn execute(model: PathBuf, config: RuntimeConfig, json: bool) -> anyhow::Result<()> {
    let graph = load_model(&model)?;
    let size = config.parse_arena_size()?;
    let strategy = config.create_strategy()?;
    let offsets = plan_tensors(&graph, strategy.as_ref(), ARENA_ALIGNMENT, size.as_bytes())?;

    let resolver = testing::mock_resolver();
    let mut buffer = size.allocate_buffer();
    let arena = Rc::new(RefCell::new(RecordingArena::create(&mut buffer)?));
    let mut interpreter =
        Interpreter::with_allocator(&graph, &resolver, arena.clone())?.with_config(&config)?;

    let allocated = interpreter.allocate_tensors();
    let used = interpreter.arena_used_bytes()?;
    let recorder = arena
        .try_borrow()
        .map_err(|_| anyhow::anyhow!("arena is still borrowed"))?;

    if json {
        let categories: serde_json::Map<String, serde_json::Value> = AllocationCategory::ALL
            .iter()
            .map(|&c| {
                serde_json::to_value(recorder.recorded(c)).map(|v| (c.as_str().to_string(), v))
            })
            .collect::<Result<_, _>>()?;
        let report = serde_json::json!({
            "model": graph.name,
            "state": interpreter.state().to_string(),
            "arena_bytes": size.as_bytes(),
            "used_bytes": used,
            "required_buffer_size": required_buffer_size(used),
            "failed_requests": recorder.failed_requests(),
            "categories": categories,
            "activations": offsets,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║              micro-rt · Arena Planner                ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!();
        println!("  Model:     {}", graph.name);
        println!("  Arena:     {size}");
        println!("  Placement: {}", config.placement);
        println!("  State:     {}", interpreter.state());
        println!();

        println!("  Activation offsets ({}):", offsets.summary());
        for p in &offsets.placements {
            let name = match p.interval.buffer {
                BufferId::Tensor(id) => graph.tensor(id).map_or("?", |t| t.name.as_str()),
                BufferId::Scratch { .. } => "scratch",
            };
            println!(
                "   {:<6} {:<24} [{:>8}, {:>8})",
                p.interval.buffer.to_string(),
                name,
                p.offset,
                p.end(),
            );
        }
        println!();

        for line in recorder.summary().lines() {
            println!("  {line}");
        }
        println!();
        println!(
            "  Smallest buffer for this allocation at any base address: {} B",
            required_buffer_size(used),
        );
        println!();
    }
    recorder.print_allocations();

    allocated.map_err(|e| anyhow::anyhow!("allocation failed: {e}"))
}
