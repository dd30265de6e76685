// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-operator profiling hooks.
//!
//! The interpreter calls [`Profiler::begin_event`] right before each
//! operator runs and [`Profiler::end_event`] right after. Hook errors are
//! logged and never abort an invocation. With the `profiling` feature
//! disabled the hooks are compiled out of `Interpreter::invoke`.

use crate::{InvocationMetrics, ProfilerError};
use std::time::Instant;

/// Identifies one begun event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHandle(pub u32);

pub trait Profiler {
    fn begin_event(&mut self, tag: &str) -> Result<EventHandle, ProfilerError>;

    fn end_event(&mut self, handle: EventHandle) -> Result<(), ProfilerError>;
}

/// Counts hook calls.
#[derive(Debug, Default)]
pub struct CountingProfiler {
    begins: usize,
    ends: usize,
}

impl CountingProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_starts(&self) -> usize {
        self.begins
    }

    pub fn event_ends(&self) -> usize {
        self.ends
    }
}

impl Profiler for CountingProfiler {
    fn begin_event(&mut self, _tag: &str) -> Result<EventHandle, ProfilerError> {
        self.begins += 1;
        Ok(EventHandle(self.begins as u32 - 1))
    }

    fn end_event(&mut self, _handle: EventHandle) -> Result<(), ProfilerError> {
        self.ends += 1;
        Ok(())
    }
}

/// Times every operator into [`InvocationMetrics`].
///
/// Holds at most `max_events` events; later begins fail with
/// [`ProfilerError::TooManyEvents`] until the metrics are taken.
#[derive(Debug)]
pub struct TimingProfiler {
    open: Vec<(String, Instant)>,
    max_events: usize,
    metrics: InvocationMetrics,
}

impl TimingProfiler {
    pub fn new(max_events: usize) -> Self {
        Self {
            open: Vec::with_capacity(max_events),
            max_events,
            metrics: InvocationMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &InvocationMetrics {
        &self.metrics
    }

    /// Returns the metrics collected so far and starts over.
    pub fn take_metrics(&mut self) -> InvocationMetrics {
        self.open.clear();
        std::mem::take(&mut self.metrics)
    }
}

impl Profiler for TimingProfiler {
    fn begin_event(&mut self, tag: &str) -> Result<EventHandle, ProfilerError> {
        if self.open.len() == self.max_events {
            return Err(ProfilerError::TooManyEvents(self.max_events));
        }
        self.open.push((tag.to_string(), Instant::now()));
        Ok(EventHandle(self.open.len() as u32 - 1))
    }

    fn end_event(&mut self, handle: EventHandle) -> Result<(), ProfilerError> {
        let (tag, start) = self
            .open
            .get(handle.0 as usize)
            .ok_or(ProfilerError::UnknownEvent(handle.0))?;
        self.metrics.record_operator(tag.clone(), start.elapsed());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting() {
        let mut p = CountingProfiler::new();
        let h = p.begin_event("op0").unwrap();
        p.end_event(h).unwrap();
        assert_eq!((p.event_starts(), p.event_ends()), (1, 1));
    }

    #[test]
    fn test_timing_records_operators() {
        let mut p = TimingProfiler::new(4);
        let a = p.begin_event("conv").unwrap();
        p.end_event(a).unwrap();
        let b = p.begin_event("relu").unwrap();
        p.end_event(b).unwrap();
        let m = p.take_metrics();
        assert_eq!(m.operator_metrics.len(), 2);
        assert_eq!(m.operator_metrics[1].tag, "relu");
        assert!(p.metrics().operator_metrics.is_empty());
    }

    #[test]
    fn test_timing_event_limit() {
        let mut p = TimingProfiler::new(1);
        p.begin_event("a").unwrap();
        assert_eq!(p.begin_event("b"), Err(ProfilerError::TooManyEvents(1)));
        assert_eq!(p.end_event(EventHandle(7)), Err(ProfilerError::UnknownEvent(7)));
    }
}
