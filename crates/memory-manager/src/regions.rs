// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Carving disjoint mutable slices out of one arena buffer.
//!
//! An operator needs its inputs, outputs and scratch buffers at the same
//! time, and they all live in the same `&mut [u8]`. [`split_disjoint`] walks
//! the requested ranges in offset order and hands each one out through
//! `split_at_mut`, so no `unsafe` is needed and overlaps are reported
//! instead of aliased. It uses only stack storage.

use crate::MemoryError;

/// Upper bound on the number of ranges one [`split_disjoint`] call accepts.
pub const MAX_SPLIT_REGIONS: usize = 64;

/// A byte range inside an arena buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteRange {
    pub offset: usize,
    pub len: usize,
}

impl ByteRange {
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Fills `out[i]` with the bytes of `ranges[i]`.
///
/// Empty ranges get an empty slice and never conflict with anything.
/// Non-empty ranges must be pairwise disjoint and inside `buffer`.
pub fn split_disjoint<'b>(
    buffer: &'b mut [u8],
    ranges: &[ByteRange],
    out: &mut [&'b mut [u8]],
) -> Result<(), MemoryError> {
    let n = ranges.len();
    if n > MAX_SPLIT_REGIONS || out.len() < n {
        return Err(MemoryError::TooManyRegions {
            requested: n,
            max: MAX_SPLIT_REGIONS.min(out.len()),
        });
    }

    let capacity = buffer.len();
    let mut order = [0usize; MAX_SPLIT_REGIONS];
    let mut count = 0;
    for (i, r) in ranges.iter().enumerate() {
        if r.offset.checked_add(r.len).map_or(true, |end| end > capacity) {
            return Err(MemoryError::OutOfBounds {
                offset: r.offset,
                len: r.len,
                capacity,
            });
        }
        out[i] = Default::default();
        if r.len == 0 {
            continue;
        }
        // Insertion sort by offset.
        let mut j = count;
        while j > 0 && ranges[order[j - 1]].offset > r.offset {
            order[j] = order[j - 1];
            j -= 1;
        }
        order[j] = i;
        count += 1;
    }

    let mut rest = buffer;
    let mut cursor = 0;
    for &i in &order[..count] {
        let r = ranges[i];
        if r.offset < cursor {
            return Err(MemoryError::OverlappingRegions { offset: r.offset });
        }
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(r.offset - cursor);
        let (piece, after) = tail.split_at_mut(r.len);
        out[i] = piece;
        rest = after;
        cursor = r.end();
    }
    Ok(())
}
