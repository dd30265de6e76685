// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Offset plan: the output of a placement strategy.
//!
//! Every buffer gets a byte offset inside one contiguous block of
//! [`OffsetPlan::peak_bytes`]. The runtime reserves that block once and adds
//! its base to each offset.

use crate::{BufferId, LifetimeInterval, PlannerError};
use memory_manager::align_up;

/// Where one buffer lives inside the planned block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Placement {
    pub interval: LifetimeInterval,
    /// Byte offset from the start of the block.
    pub offset: usize,
}

impl Placement {
    /// One past the last byte of the buffer.
    pub fn end(&self) -> usize {
        self.offset + self.interval.size
    }
}

/// The complete placement produced by a [`crate::PlacementStrategy`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct OffsetPlan {
    /// Strategy name that produced this plan.
    pub strategy_name: String,
    /// One placement per input interval, in input order.
    pub placements: Vec<Placement>,
    /// Size of the block that holds every placement.
    pub peak_bytes: usize,
}

impl OffsetPlan {
    pub fn num_buffers(&self) -> usize {
        self.placements.len()
    }

    /// Offset of `buffer`, if it was planned.
    pub fn offset_of(&self, buffer: BufferId) -> Option<usize> {
        self.placements
            .iter()
            .find(|p| p.interval.buffer == buffer)
            .map(|p| p.offset)
    }

    /// Sum of all buffer sizes, i.e. the block size without any reuse.
    pub fn total_buffer_bytes(&self) -> usize {
        self.placements.iter().map(|p| p.interval.size).sum()
    }

    /// Checks that no two simultaneously alive buffers share bytes and that
    /// every buffer fits inside the block.
    pub fn validate(&self) -> Result<(), PlannerError> {
        for (i, a) in self.placements.iter().enumerate() {
            if a.interval.size > 0 && a.end() > self.peak_bytes {
                return Err(PlannerError::ExceedsCapacity {
                    strategy: self.strategy_name.clone(),
                    required_bytes: a.end(),
                    capacity_bytes: self.peak_bytes,
                });
            }
            for b in &self.placements[i + 1..] {
                let disjoint_bytes = a.end() <= b.offset || b.end() <= a.offset;
                if a.interval.size > 0
                    && b.interval.size > 0
                    && a.interval.overlaps(&b.interval)
                    && !disjoint_bytes
                {
                    return Err(PlannerError::Overlap {
                        strategy: self.strategy_name.clone(),
                        first: a.interval.buffer.to_string(),
                        second: b.interval.buffer.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns a human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let total = self.total_buffer_bytes();
        let saved = if total == 0 {
            0.0
        } else {
            100.0 * (1.0 - self.peak_bytes as f64 / total as f64)
        };
        format!(
            "Plan '{}': {} buffers, peak {} B for {} B of buffers ({:.0}% saved by reuse)",
            self.strategy_name,
            self.num_buffers(),
            self.peak_bytes,
            total,
            saved.max(0.0),
        )
    }
}

/// Largest number of bytes alive at any single operator, each buffer
/// rounded up to `alignment`.
///
/// No placement can use less than this; it is the reference the greedy
/// strategy is measured against.
pub fn peak_live_bytes(intervals: &[LifetimeInterval], alignment: usize) -> usize {
    let last = intervals.iter().map(|i| i.last_op).max().unwrap_or(0);
    (0..=last)
        .map(|op| {
            intervals
                .iter()
                .filter(|i| i.is_alive_at(op))
                .map(|i| align_up(i.size, alignment))
                .sum::<usize>()
        })
        .max()
        .unwrap_or(0)
}
