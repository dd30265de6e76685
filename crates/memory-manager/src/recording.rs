// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation recording for diagnostics and tests.
//!
//! [`RecordingArena`] wraps an [`Arena`] and tallies every request by
//! [`AllocationCategory`]: how many bytes were asked for, how many the arena
//! actually consumed (alignment padding included), and how many requests
//! there were. It never changes an allocation outcome.

use crate::{ArenaAllocator, Arena, MemoryError, ARENA_ALIGNMENT};
use std::fmt;

/// What an arena allocation is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationCategory {
    /// Tensor descriptors and the activation buffer.
    EvalTensorData,
    /// Buffers of variable tensors, which persist across invocations.
    VariableBufferData,
    /// Persistent per-operator data allocated by kernels.
    OpData,
    /// Scratch buffers and their handle table.
    ScratchBufferRequests,
    /// Bookkeeping of the allocator and the interpreter themselves.
    AllocatorInternal,
}

impl AllocationCategory {
    pub const COUNT: usize = 5;

    pub const ALL: [AllocationCategory; Self::COUNT] = [
        AllocationCategory::EvalTensorData,
        AllocationCategory::VariableBufferData,
        AllocationCategory::OpData,
        AllocationCategory::ScratchBufferRequests,
        AllocationCategory::AllocatorInternal,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AllocationCategory::EvalTensorData => "eval tensor data",
            AllocationCategory::VariableBufferData => "variable buffer data",
            AllocationCategory::OpData => "op data",
            AllocationCategory::ScratchBufferRequests => "scratch buffer requests",
            AllocationCategory::AllocatorInternal => "allocator internal",
        }
    }
}

impl fmt::Display for AllocationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals for one [`AllocationCategory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RecordedAllocation {
    /// Bytes asked for by callers.
    pub requested_bytes: usize,
    /// Bytes the arena consumed, including alignment padding.
    pub used_bytes: usize,
    /// Number of successful requests.
    pub count: usize,
}

impl RecordedAllocation {
    fn record(&mut self, requested: usize, used: usize) {
        self.requested_bytes += requested;
        self.used_bytes += used;
        self.count += 1;
    }
}

/// An [`Arena`] that records every allocation by category.
///
/// # Example
/// ```
/// use memory_manager::{AllocationCategory, ArenaAllocator, RecordingArena};
///
/// let mut buf = vec![0u8; 1024];
/// let mut arena = RecordingArena::create(&mut buf).unwrap();
/// arena.allocate_tail(10, 4, AllocationCategory::OpData).unwrap();
///
/// let op_data = arena.recorded(AllocationCategory::OpData);
/// assert_eq!(op_data.requested_bytes, 10);
/// assert_eq!(op_data.count, 1);
/// ```
pub struct RecordingArena<'a> {
    arena: Arena<'a>,
    records: [RecordedAllocation; AllocationCategory::COUNT],
    failed_requests: usize,
}

impl<'a> RecordingArena<'a> {
    /// Tail bytes the recorder reserves for its own bookkeeping.
    ///
    /// The block models the footprint of the category table as if it lived
    /// in the arena, so a recorded run reports the same `used_bytes` as a
    /// deployment that keeps its recorder there. Nothing is written to it;
    /// the counters are fields of this struct.
    pub const BOOKKEEPING_BYTES: usize =
        std::mem::size_of::<[RecordedAllocation; AllocationCategory::COUNT]>();

    /// Wraps `buffer` and reserves the recorder's bookkeeping in the tail.
    ///
    /// Fails if the buffer cannot hold the bookkeeping.
    pub fn create(buffer: &'a mut [u8]) -> Result<Self, MemoryError> {
        let mut recorder = Self {
            arena: Arena::new(buffer),
            records: [RecordedAllocation::default(); AllocationCategory::COUNT],
            failed_requests: 0,
        };
        recorder.allocate_tail(
            Self::BOOKKEEPING_BYTES,
            ARENA_ALIGNMENT,
            AllocationCategory::AllocatorInternal,
        )?;
        Ok(recorder)
    }

    /// Totals recorded for `category`.
    pub fn recorded(&self, category: AllocationCategory) -> RecordedAllocation {
        self.records[category.index()]
    }

    /// Number of requests that failed.
    pub fn failed_requests(&self) -> usize {
        self.failed_requests
    }

    /// The wrapped arena.
    pub fn arena(&self) -> &Arena<'a> {
        &self.arena
    }

    /// Logs every category through `tracing`.
    pub fn print_allocations(&self) {
        tracing::info!(
            "arena: {} used ({} head, {} tail) of {} bytes",
            self.arena.used_bytes(),
            self.arena.head_used_bytes(),
            self.arena.tail_used_bytes(),
            self.arena.capacity(),
        );
        for category in AllocationCategory::ALL {
            let r = self.recorded(category);
            tracing::info!(
                "[{category}] {} bytes ({} requested) in {} allocations",
                r.used_bytes,
                r.requested_bytes,
                r.count,
            );
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Arena: {} / {} bytes used ({} head, {} tail), {} failed requests",
            self.arena.used_bytes(),
            self.arena.capacity(),
            self.arena.head_used_bytes(),
            self.arena.tail_used_bytes(),
            self.failed_requests,
        );
        for category in AllocationCategory::ALL {
            let r = self.recorded(category);
            out.push_str(&format!(
                "\n  {:<24} {:>8} used {:>8} requested {:>4} allocs",
                category.as_str(),
                r.used_bytes,
                r.requested_bytes,
                r.count,
            ));
        }
        out
    }

    fn note<T>(
        &mut self,
        category: AllocationCategory,
        requested: usize,
        before: usize,
        outcome: Result<T, MemoryError>,
        after: impl FnOnce(&Arena<'a>) -> usize,
    ) -> Result<T, MemoryError> {
        match outcome {
            Ok(value) => {
                let used = after(&self.arena).abs_diff(before);
                self.records[category.index()].record(requested, used);
                Ok(value)
            }
            Err(e) => {
                self.failed_requests += 1;
                tracing::debug!("[{category}] request of {requested} bytes failed: {e}");
                Err(e)
            }
        }
    }
}

impl ArenaAllocator for RecordingArena<'_> {
    fn allocate_head(
        &mut self,
        size: usize,
        align: usize,
        category: AllocationCategory,
    ) -> Result<usize, MemoryError> {
        let before = self.arena.head_offset();
        let outcome = self.arena.allocate_head(size, align);
        self.note(category, size, before, outcome, Arena::head_offset)
    }

    fn allocate_tail(
        &mut self,
        size: usize,
        align: usize,
        category: AllocationCategory,
    ) -> Result<usize, MemoryError> {
        let before = self.arena.tail_offset();
        let outcome = self.arena.allocate_tail(size, align);
        self.note(category, size, before, outcome, Arena::tail_offset)
    }

    fn reset_head(&mut self) {
        self.arena.reset_head();
    }

    fn head_used_bytes(&self) -> usize {
        self.arena.head_used_bytes()
    }

    fn tail_used_bytes(&self) -> usize {
        self.arena.tail_used_bytes()
    }

    fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    fn buffer(&self) -> &[u8] {
        self.arena.buffer()
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        self.arena.buffer_mut()
    }
}

impl fmt::Debug for RecordingArena<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingArena")
            .field("arena", &self.arena)
            .field("records", &self.records)
            .field("failed_requests", &self.failed_requests)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_reserves_bookkeeping() {
        let mut buf = vec![0u8; 512];
        let arena = RecordingArena::create(&mut buf).unwrap();
        let internal = arena.recorded(AllocationCategory::AllocatorInternal);
        assert_eq!(internal.count, 1);
        assert_eq!(internal.requested_bytes, RecordingArena::BOOKKEEPING_BYTES);
        assert!(internal.used_bytes >= RecordingArena::BOOKKEEPING_BYTES);
        assert_eq!(arena.tail_used_bytes(), internal.used_bytes);
    }

    #[test]
    fn test_create_fails_on_tiny_buffer() {
        let mut buf = vec![0u8; 32];
        assert!(RecordingArena::create(&mut buf).is_err());
    }

    #[test]
    fn test_used_bytes_include_padding() {
        let mut buf = vec![0u8; 512];
        let mut arena = RecordingArena::create(&mut buf).unwrap();
        arena
            .allocate_head(3, 1, AllocationCategory::ScratchBufferRequests)
            .unwrap();
        arena
            .allocate_head(4, 16, AllocationCategory::ScratchBufferRequests)
            .unwrap();
        let scratch = arena.recorded(AllocationCategory::ScratchBufferRequests);
        assert_eq!(scratch.requested_bytes, 7);
        assert_eq!(scratch.used_bytes, 20);
        assert_eq!(scratch.count, 2);
    }

    #[test]
    fn test_same_outcomes_as_plain_arena() {
        let requests = [(100, 4), (7, 1), (300, 16), (64, 8), (90, 2)];
        let mut buf = vec![0u8; 1024];
        let (a, b) = buf.split_at_mut(512);
        let mut plain = Arena::new(a);
        let mut recording = RecordingArena::create(b).unwrap();
        // Match the recorder's reserved tail.
        plain
            .allocate_tail(RecordingArena::BOOKKEEPING_BYTES, ARENA_ALIGNMENT)
            .unwrap();
        for (size, align) in requests {
            let p = plain.allocate_tail(size, align).is_ok();
            let r = recording
                .allocate_tail(size, align, AllocationCategory::EvalTensorData)
                .is_ok();
            assert_eq!(p, r);
        }
        assert_eq!(plain.used_bytes(), recording.used_bytes());
    }

    #[test]
    fn test_failures_not_recorded_as_usage() {
        let mut buf = vec![0u8; 256];
        let mut arena = RecordingArena::create(&mut buf).unwrap();
        assert!(arena
            .allocate_tail(4096, 4, AllocationCategory::VariableBufferData)
            .is_err());
        assert_eq!(
            arena.recorded(AllocationCategory::VariableBufferData),
            RecordedAllocation::default()
        );
        assert_eq!(arena.failed_requests(), 1);
    }

    #[test]
    fn test_summary() {
        let mut buf = vec![0u8; 512];
        let mut arena = RecordingArena::create(&mut buf).unwrap();
        arena
            .allocate_tail(12, 4, AllocationCategory::OpData)
            .unwrap();
        let summary = arena.summary();
        assert!(summary.contains("op data"));
        assert!(summary.contains("0 failed requests"));
    }
}
