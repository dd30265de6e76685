// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Two-ended bump allocator over a caller-supplied buffer.
//!
//! ```text
//!  0                                                        capacity
//!  ├── head ──────►│                 free                 │◄──── tail ──┤
//!                  head                              tail
//! ```
//!
//! The head grows forward and can be rewound with [`Arena::reset_head`]; the
//! tail grows backward and is never released. The head high-water mark
//! survives a rewind, and the tail may never grow into it: a previous
//! planning pass may still rely on the bytes below the mark.

use crate::MemoryError;
use std::fmt;

/// Alignment of the arena base, and the largest alignment a request may ask for.
pub const ARENA_ALIGNMENT: usize = 16;

/// One of the two growth regions of an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Head,
    Tail,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Head => f.write_str("head"),
            Region::Tail => f.write_str("tail"),
        }
    }
}

/// Rounds `value` up to a multiple of `align` (a power of two).
pub const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Rounds `value` down to a multiple of `align` (a power of two).
pub const fn align_down(value: usize, align: usize) -> usize {
    value & !(align - 1)
}

/// Buffer size that is guaranteed to hold an arena whose
/// [`used_bytes`](Arena::used_bytes) was `used`, whatever the buffer's base
/// address.
pub const fn required_buffer_size(used: usize) -> usize {
    align_up(used, ARENA_ALIGNMENT) + ARENA_ALIGNMENT
}

fn check_alignment(align: usize) -> Result<(), MemoryError> {
    if align == 0 || !align.is_power_of_two() || align > ARENA_ALIGNMENT {
        return Err(MemoryError::InvalidAlignment {
            align,
            max: ARENA_ALIGNMENT,
        });
    }
    Ok(())
}

/// A two-ended bump allocator.
///
/// All offsets are relative to the aligned base of the buffer. The arena never
/// zeroes memory and never moves an allocation.
///
/// # Example
/// ```
/// use memory_manager::Arena;
///
/// let mut buf = vec![0u8; 256];
/// let mut arena = Arena::new(&mut buf);
///
/// let scratch = arena.allocate_head(40, 4).unwrap();
/// let state = arena.allocate_tail(8, 8).unwrap();
/// assert!(scratch + 40 <= state);
///
/// arena.reset_head();
/// assert_eq!(arena.allocate_head(8, 4).unwrap(), 0);
/// assert_eq!(arena.head_used_bytes(), 40);
/// ```
pub struct Arena<'a> {
    buffer: &'a mut [u8],
    head: usize,
    head_watermark: usize,
    tail: usize,
}

impl<'a> Arena<'a> {
    /// Wraps `buffer`, skipping leading bytes until the base is aligned to
    /// [`ARENA_ALIGNMENT`] and trimming the capacity to a multiple of it.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        let misalignment = buffer.as_ptr() as usize % ARENA_ALIGNMENT;
        let skip = ((ARENA_ALIGNMENT - misalignment) % ARENA_ALIGNMENT).min(buffer.len());
        let (_, rest) = buffer.split_at_mut(skip);
        let capacity = align_down(rest.len(), ARENA_ALIGNMENT);
        let (buffer, _) = rest.split_at_mut(capacity);
        Self {
            buffer,
            head: 0,
            head_watermark: 0,
            tail: capacity,
        }
    }

    /// Bumps the head forward and returns the offset of the new block.
    pub fn allocate_head(&mut self, size: usize, align: usize) -> Result<usize, MemoryError> {
        check_alignment(align)?;
        let start = align_up(self.head, align);
        let end = start
            .checked_add(size)
            .filter(|&end| end <= self.tail)
            .ok_or(MemoryError::OutOfMemory {
                region: Region::Head,
                requested_bytes: size,
                available_bytes: self.tail.saturating_sub(start),
            })?;
        self.head = end;
        self.head_watermark = self.head_watermark.max(end);
        Ok(start)
    }

    /// Bumps the tail backward and returns the offset of the new block.
    pub fn allocate_tail(&mut self, size: usize, align: usize) -> Result<usize, MemoryError> {
        check_alignment(align)?;
        let start = self
            .tail
            .checked_sub(size)
            .map(|start| align_down(start, align))
            .filter(|&start| start >= self.head_watermark)
            .ok_or(MemoryError::OutOfMemory {
                region: Region::Tail,
                requested_bytes: size,
                available_bytes: self.tail - self.head_watermark,
            })?;
        self.tail = start;
        Ok(start)
    }

    /// Rewinds the head to the start of the arena. Head allocations made
    /// before the rewind are invalidated; the high-water mark is kept.
    pub fn reset_head(&mut self) {
        self.head = 0;
    }

    /// Current head position.
    pub fn head_offset(&self) -> usize {
        self.head
    }

    /// Current tail position (lowest byte owned by the tail).
    pub fn tail_offset(&self) -> usize {
        self.tail
    }

    /// High-water mark of the head region.
    pub fn head_used_bytes(&self) -> usize {
        self.head_watermark
    }

    pub fn tail_used_bytes(&self) -> usize {
        self.capacity() - self.tail
    }

    /// Bytes that a buffer must provide to replay the same allocations.
    pub fn used_bytes(&self) -> usize {
        self.head_used_bytes() + self.tail_used_bytes()
    }

    /// Bytes still free between the head high-water mark and the tail.
    pub fn available_bytes(&self) -> usize {
        self.tail - self.head_watermark
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &[u8] {
        self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        self.buffer
    }

    /// Returns `len` bytes at `offset`, bounds-checked.
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&[u8], MemoryError> {
        let capacity = self.capacity();
        offset
            .checked_add(len)
            .and_then(|end| self.buffer.get(offset..end))
            .ok_or(MemoryError::OutOfBounds {
                offset,
                len,
                capacity,
            })
    }

    /// Mutable counterpart of [`Arena::bytes`].
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8], MemoryError> {
        let capacity = self.capacity();
        offset
            .checked_add(len)
            .and_then(|end| self.buffer.get_mut(offset..end))
            .ok_or(MemoryError::OutOfBounds {
                offset,
                len,
                capacity,
            })
    }
}

impl fmt::Debug for Arena<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("head", &self.head)
            .field("head_watermark", &self.head_watermark)
            .field("tail", &self.tail)
            .finish()
    }
}
