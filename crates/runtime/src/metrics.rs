// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Invocation profiling metrics.
//!
//! [`InvocationMetrics`] collects per-operator timings from a
//! [`crate::TimingProfiler`] plus the arena footprint of the run.

use std::time::Duration;

/// Timing of a single operator execution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OperatorMetrics {
    /// Profiler tag, the operator name.
    pub tag: String,
    /// Time spent inside the kernel.
    pub duration: Duration,
}

/// Aggregate metrics for one or more invocations.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct InvocationMetrics {
    /// Total wall-clock time for the invocations.
    pub total_duration: Duration,
    /// Sum of all operator durations.
    pub total_operator_duration: Duration,
    /// Arena bytes in use after allocation.
    pub arena_used_bytes: usize,
    /// Per-operator metrics, in execution order.
    pub operator_metrics: Vec<OperatorMetrics>,
    /// Number of invocations these metrics cover.
    pub invocations: usize,
}

impl InvocationMetrics {
    /// Creates an empty metrics container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one operator execution.
    pub fn record_operator(&mut self, tag: String, duration: Duration) {
        self.total_operator_duration += duration;
        self.operator_metrics.push(OperatorMetrics { tag, duration });
    }

    /// Finalises metrics with the wall-clock time, arena footprint and
    /// number of invocations.
    pub fn finalise(&mut self, total: Duration, arena_used_bytes: usize, invocations: usize) {
        self.total_duration = total;
        self.arena_used_bytes = arena_used_bytes;
        self.invocations = invocations;
    }

    /// The operator with the longest single execution.
    pub fn slowest(&self) -> Option<&OperatorMetrics> {
        self.operator_metrics.iter().max_by_key(|m| m.duration)
    }

    /// Mean wall-clock time per invocation.
    pub fn mean_invocation(&self) -> Duration {
        if self.invocations == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.invocations as u32
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let kernel_pct = if self.total_duration.as_secs_f64() > 0.0 {
            (self.total_operator_duration.as_secs_f64() / self.total_duration.as_secs_f64())
                * 100.0
        } else {
            0.0
        };
        let slowest = self
            .slowest()
            .map(|m| format!(", slowest '{}' {:.3}ms", m.tag, m.duration.as_secs_f64() * 1000.0))
            .unwrap_or_default();

        format!(
            "Invoke: {:.3}ms total over {} invocations ({:.3}ms each), \
             {} operator runs, {:.3}ms in kernels ({:.0}%), arena {} B{}",
            self.total_duration.as_secs_f64() * 1000.0,
            self.invocations,
            self.mean_invocation().as_secs_f64() * 1000.0,
            self.operator_metrics.len(),
            self.total_operator_duration.as_secs_f64() * 1000.0,
            kernel_pct,
            self.arena_used_bytes,
            slowest,
        )
    }
}
