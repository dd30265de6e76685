// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-planner
//!
//! Assigns arena offsets to buffers from their lifetimes, so that buffers
//! which are never alive at the same operator share bytes.
//!
//! # Strategies
//!
//! | Strategy | Reuse | Peak bytes |
//! |---|---|---|
//! | [`GreedyFirstFit`] | Yes | Close to the live-bytes lower bound |
//! | [`Linear`] | None | Sum of all buffers |
//!
//! # Trait-Based Extensibility
//!
//! All strategies implement [`PlacementStrategy`], so the runtime can take
//! any of them without changes:
//!
//! ```ignore
//! struct MyStrategy;
//! impl PlacementStrategy for MyStrategy {
//!     fn name(&self) -> &str { "mine" }
//!     fn place(&self, intervals: &[LifetimeInterval], alignment: usize, capacity: usize)
//!         -> Result<OffsetPlan, PlannerError> { /* ... */ }
//! }
//! ```
//!
//! # Example
//! ```
//! use memory_planner::{BufferId, GreedyFirstFit, LifetimeInterval, PlacementStrategy};
//!
//! let intervals = [
//!     LifetimeInterval::new(BufferId::Tensor(0), 0, 0, 64),
//!     LifetimeInterval::new(BufferId::Tensor(1), 1, 1, 64),
//! ];
//! let plan = GreedyFirstFit::new().place(&intervals, 16, 1024).unwrap();
//! assert_eq!(plan.peak_bytes, 64);
//! ```

mod error;
pub mod interval;
mod plan;
pub mod strategy;

pub use error::PlannerError;
pub use interval::{tensor_intervals, BufferId, LifetimeInterval};
pub use plan::{peak_live_bytes, OffsetPlan, Placement};
pub use strategy::greedy::GreedyFirstFit;
pub use strategy::linear::Linear;
pub use strategy::{strategy_by_name, PlacementStrategy};

/// Plans the activation tensors of `graph` with `strategy`.
pub fn plan_tensors(
    graph: &model_ir::ModelGraph<model_ir::graph::Validated>,
    strategy: &dyn PlacementStrategy,
    alignment: usize,
    capacity: usize,
) -> Result<OffsetPlan, PlannerError> {
    let intervals = tensor_intervals(graph);
    let plan = strategy.place(&intervals, alignment, capacity)?;
    tracing::info!(
        "planned {} activation tensors of '{}' with {}: {} bytes",
        plan.num_buffers(),
        graph.name,
        strategy.name(),
        plan.peak_bytes,
    );
    Ok(plan)
}
