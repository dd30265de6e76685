// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`PlacementStrategy`] trait and strategy implementations.

pub mod greedy;
pub mod linear;

use crate::{LifetimeInterval, OffsetPlan, PlannerError};

/// Trait for placement strategies.
///
/// A strategy assigns every interval an offset inside one block so that
/// buffers alive at the same operator never share bytes.
///
/// Strategies are pure functions over their inputs (no graph, no arena),
/// which keeps them property-testable on generated interval sets.
pub trait PlacementStrategy: Send + Sync {
    /// Human-readable name of this strategy.
    fn name(&self) -> &str;

    /// Places `intervals` with every offset a multiple of `alignment`.
    ///
    /// Fails with [`PlannerError::ExceedsCapacity`] if the block would be
    /// larger than `capacity`.
    fn place(
        &self,
        intervals: &[LifetimeInterval],
        alignment: usize,
        capacity: usize,
    ) -> Result<OffsetPlan, PlannerError>;
}

/// Returns the strategy registered under `name`.
///
/// Accepted names: `"greedy-first-fit"` (or `"greedy"`) and `"linear"`.
pub fn strategy_by_name(name: &str) -> Result<Box<dyn PlacementStrategy>, PlannerError> {
    match name.to_lowercase().as_str() {
        "greedy-first-fit" | "greedy" => Ok(Box::new(greedy::GreedyFirstFit::new())),
        "linear" => Ok(Box::new(linear::Linear::new())),
        _ => Err(PlannerError::UnknownStrategy(name.to_string())),
    }
}

/// Checks the inputs every strategy shares.
pub(crate) fn check_inputs(
    intervals: &[LifetimeInterval],
    alignment: usize,
) -> Result<(), PlannerError> {
    if alignment == 0 || !alignment.is_power_of_two() {
        return Err(PlannerError::InvalidAlignment(alignment));
    }
    for i in intervals {
        if i.first_op > i.last_op {
            return Err(PlannerError::InvalidInterval {
                buffer: i.buffer.to_string(),
                first_op: i.first_op,
                last_op: i.last_op,
            });
        }
    }
    Ok(())
}

/// Fails if `peak` does not fit in `capacity`.
pub(crate) fn check_capacity(
    strategy: &str,
    peak: usize,
    capacity: usize,
) -> Result<(), PlannerError> {
    if peak > capacity {
        return Err(PlannerError::ExceedsCapacity {
            strategy: strategy.to_string(),
            required_bytes: peak,
            capacity_bytes: capacity,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_by_name() {
        assert_eq!(strategy_by_name("greedy").unwrap().name(), "greedy-first-fit");
        assert_eq!(strategy_by_name("Linear").unwrap().name(), "linear");
        assert!(matches!(
            strategy_by_name("optimal"),
            Err(PlannerError::UnknownStrategy(_))
        ));
    }
}
