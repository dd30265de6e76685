// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for arena management.

use crate::Region;

/// Errors that can occur during arena allocation and access.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The requested allocation would cross into the opposite region.
    #[error("out of memory in {region}: requested {requested_bytes} bytes, but only {available_bytes} available")]
    OutOfMemory {
        region: Region,
        requested_bytes: usize,
        available_bytes: usize,
    },

    /// The alignment is zero, not a power of two, or larger than the arena alignment.
    #[error("invalid alignment {align}: must be a power of two no larger than {max}")]
    InvalidAlignment { align: usize, max: usize },

    /// A byte range does not fit inside the arena.
    #[error("range {offset}..{offset}+{len} is out of bounds for arena of {capacity} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    /// Two byte ranges that must be disjoint overlap.
    #[error("regions overlap at offset {offset}")]
    OverlappingRegions { offset: usize },

    /// More regions were requested than can be split at once.
    #[error("cannot split {requested} regions, at most {max} supported")]
    TooManyRegions { requested: usize, max: usize },

    /// A human-readable arena size could not be parsed.
    #[error("invalid arena size: {0}")]
    InvalidSize(String),
}
