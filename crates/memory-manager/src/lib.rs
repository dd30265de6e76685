// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! A two-ended bump arena for inference graphs that must run out of a single
//! fixed-size, caller-supplied buffer.
//!
//! # Key Components
//!
//! - [`Arena`]: a head region growing forward (transient,
//!   rewindable) and a tail region growing backward (permanent).
//! - [`ArenaAllocator`]: the interface the runtime allocates through, with
//!   every request tagged by an [`AllocationCategory`].
//! - [`RecordingArena`]: an `Arena` that tallies requested and used bytes
//!   per category, for diagnostics and tests.
//! - [`ArenaSize`]: human-readable size parsing (`"16K"`, `"2M"`).
//! - [`split_disjoint`]: hands out several non-overlapping `&mut [u8]`
//!   ranges of the arena at once.
//!
//! # Layout
//!
//! ```text
//! ┌──────────── head ────────────┬───── free ─────┬──────── tail ────────┐
//! │ scratch buffers (per pass)   │                │ tensors, state, meta │
//! └──────────────────────────────┴────────────────┴──────────────────────┘
//! ```
//!
//! Nothing is freed individually. The head is rewound before each planning
//! pass; the tail lives as long as the buffer.
//!
//! # Example
//! ```
//! use memory_manager::{AllocationCategory, ArenaAllocator, RecordingArena};
//!
//! let mut buf = vec![0u8; 4096];
//! let mut arena = RecordingArena::create(&mut buf).unwrap();
//!
//! let state = arena.allocate_tail(64, 16, AllocationCategory::VariableBufferData).unwrap();
//! let scratch = arena.allocate_head(128, 16, AllocationCategory::ScratchBufferRequests).unwrap();
//! assert!(scratch + 128 <= state);
//! assert_eq!(arena.recorded(AllocationCategory::VariableBufferData).used_bytes, 64);
//! ```

mod allocator;
mod arena;
mod error;
mod recording;
mod regions;
mod size;

pub use allocator::{ArenaAllocator, SharedAllocator};
pub use arena::{align_down, align_up, required_buffer_size, Arena, Region, ARENA_ALIGNMENT};
pub use error::MemoryError;
pub use recording::{AllocationCategory, RecordedAllocation, RecordingArena};
pub use regions::{split_disjoint, ByteRange, MAX_SPLIT_REGIONS};
pub use size::ArenaSize;
