// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Linear placement: every buffer gets its own bytes.
//!
//! No lifetime analysis at all; buffers are laid out back to back in input
//! order. Useful as a reference point for the greedy strategy and for
//! debugging kernels that might write outside their outputs.

use crate::strategy::{check_capacity, check_inputs, PlacementStrategy};
use crate::{LifetimeInterval, OffsetPlan, Placement, PlannerError};
use memory_manager::align_up;

/// Linear: no reuse.
#[derive(Debug, Clone, Default)]
pub struct Linear;

impl Linear {
    pub fn new() -> Self {
        Self
    }
}

impl PlacementStrategy for Linear {
    fn name(&self) -> &str {
        "linear"
    }

    fn place(
        &self,
        intervals: &[LifetimeInterval],
        alignment: usize,
        capacity: usize,
    ) -> Result<OffsetPlan, PlannerError> {
        check_inputs(intervals, alignment)?;

        let mut cursor: usize = 0;
        let placements = intervals
            .iter()
            .map(|&interval| {
                let offset = cursor;
                cursor = cursor.saturating_add(align_up(interval.size, alignment));
                Placement { interval, offset }
            })
            .collect();

        check_capacity(self.name(), cursor, capacity)?;

        Ok(OffsetPlan {
            strategy_name: self.name().to_string(),
            placements,
            peak_bytes: cursor,
        })
    }
}
