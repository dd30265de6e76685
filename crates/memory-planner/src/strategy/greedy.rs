// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Greedy first-fit placement.
//!
//! Buffers are placed largest first. Each one goes to the lowest offset
//! where it does not collide with an already placed buffer whose lifetime
//! overlaps its own; buffers with disjoint lifetimes are ignored, which is
//! where reuse comes from.
//!
//! # Ordering
//!
//! Size descending, then first operator ascending, then buffer id. The
//! order is total, so the same intervals always give the same offsets.
//!
//! # Cost
//!
//! O(n²) in the number of buffers, which is fine for the graphs this
//! runtime targets and keeps planning allocation-light.

use crate::strategy::{check_capacity, check_inputs, PlacementStrategy};
use crate::{LifetimeInterval, OffsetPlan, Placement, PlannerError};
use memory_manager::align_up;
use std::cmp::Reverse;

/// Greedy first-fit: reuse offsets between buffers whose lifetimes don't overlap.
#[derive(Debug, Clone, Default)]
pub struct GreedyFirstFit;

impl GreedyFirstFit {
    pub fn new() -> Self {
        Self
    }
}

impl PlacementStrategy for GreedyFirstFit {
    fn name(&self) -> &str {
        "greedy-first-fit"
    }

    fn place(
        &self,
        intervals: &[LifetimeInterval],
        alignment: usize,
        capacity: usize,
    ) -> Result<OffsetPlan, PlannerError> {
        check_inputs(intervals, alignment)?;

        let mut order: Vec<usize> = (0..intervals.len()).collect();
        order.sort_by_key(|&i| {
            let iv = &intervals[i];
            (Reverse(iv.size), iv.first_op, iv.buffer)
        });

        // (interval index, offset, reserved end), kept sorted by offset.
        let mut placed: Vec<(usize, usize, usize)> = Vec::with_capacity(intervals.len());
        let mut offsets = vec![0usize; intervals.len()];
        let mut peak = 0;

        for &i in &order {
            let iv = &intervals[i];
            let reserved = align_up(iv.size, alignment);

            let mut offset: usize = 0;
            if reserved > 0 {
                for &(j, start, end) in &placed {
                    if !intervals[j].overlaps(iv) || end == start {
                        continue;
                    }
                    if offset.saturating_add(reserved) <= start {
                        break;
                    }
                    offset = offset.max(end);
                }
            }

            offsets[i] = offset;
            let end = offset.saturating_add(reserved);
            peak = peak.max(end);
            let at = placed.partition_point(|&(_, start, _)| start <= offset);
            placed.insert(at, (i, offset, end));
        }

        check_capacity(self.name(), peak, capacity)?;

        let plan = OffsetPlan {
            strategy_name: self.name().to_string(),
            placements: intervals
                .iter()
                .zip(offsets)
                .map(|(&interval, offset)| Placement { interval, offset })
                .collect(),
            peak_bytes: peak,
        };
        tracing::debug!("{}", plan.summary());
        Ok(plan)
    }
}
