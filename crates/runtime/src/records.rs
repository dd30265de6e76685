// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Record tables that live inside the arena tail.
//!
//! An allocated interpreter keeps only table offsets; the per-tensor and
//! per-operator descriptors themselves are plain-old-data rows in the
//! arena, addressed by offset and read by copy.

use crate::AllocationError;
use bytemuck::{Pod, Zeroable};
use memory_manager::{AllocationCategory, ArenaAllocator, ByteRange, MemoryError, ARENA_ALIGNMENT};
use std::mem::size_of;

/// Byte range of one buffer inside the arena.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub(crate) struct Span {
    pub offset: u32,
    pub len: u32,
}

impl Span {
    /// Marks a tensor without an arena buffer.
    pub const UNPLACED: Span = Span {
        offset: u32::MAX,
        len: 0,
    };

    pub fn new(offset: usize, len: usize) -> Result<Self, AllocationError> {
        let end = offset
            .checked_add(len)
            .ok_or(AllocationError::TableOverflow(offset))?;
        u32::try_from(end).map_err(|_| AllocationError::TableOverflow(end))?;
        Ok(Self {
            offset: offset as u32,
            len: len as u32,
        })
    }

    pub fn is_placed(&self) -> bool {
        self.offset != u32::MAX
    }

    pub fn range(&self) -> ByteRange {
        ByteRange::new(self.offset as usize, self.len as usize)
    }
}

/// What an operator acquired during prepare.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub(crate) struct OpRecord {
    pub user_data: Span,
    /// First row of this operator's scratch buffers in the scratch table.
    pub scratch_first: u32,
    pub scratch_count: u32,
}

/// Offsets of the committed tables.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tables {
    pub ops: usize,
    pub tensors: usize,
    pub scratch: usize,
}

/// Reserves a tail table of `rows` records of type `T`.
pub(crate) fn allocate_table<T: Pod>(
    allocator: &mut dyn ArenaAllocator,
    rows: usize,
    category: AllocationCategory,
) -> Result<usize, AllocationError> {
    allocator
        .allocate_tail(rows * size_of::<T>(), ARENA_ALIGNMENT, category)
        .map_err(|source| AllocationError::Arena { category, source })
}

/// Writes `rows` into the table at `table`.
pub(crate) fn write_table<T: Pod>(
    buffer: &mut [u8],
    table: usize,
    rows: &[T],
) -> Result<(), MemoryError> {
    let bytes: &[u8] = bytemuck::cast_slice(rows);
    let capacity = buffer.len();
    buffer
        .get_mut(table..table + bytes.len())
        .ok_or(MemoryError::OutOfBounds {
            offset: table,
            len: bytes.len(),
            capacity,
        })?
        .copy_from_slice(bytes);
    Ok(())
}

/// Reads row `index` of the table at `table`.
pub(crate) fn read_row<T: Pod>(buffer: &[u8], table: usize, index: usize) -> Result<T, MemoryError> {
    let start = table + index * size_of::<T>();
    buffer
        .get(start..start + size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .ok_or(MemoryError::OutOfBounds {
            offset: start,
            len: size_of::<T>(),
            capacity: buffer.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_roundtrip_in_place() {
        let mut buf = vec![0u8; 64];
        let rows = [
            Span::new(16, 4).unwrap(),
            Span::UNPLACED,
            Span::new(32, 0).unwrap(),
        ];
        write_table(&mut buf, 8, &rows).unwrap();
        assert_eq!(read_row::<Span>(&buf, 8, 0).unwrap(), rows[0]);
        assert!(!read_row::<Span>(&buf, 8, 1).unwrap().is_placed());
        assert_eq!(read_row::<Span>(&buf, 8, 2).unwrap().range(), ByteRange::new(32, 0));
    }

    #[test]
    fn test_out_of_bounds_rows() {
        let mut buf = vec![0u8; 16];
        assert!(write_table(&mut buf, 12, &[Span::UNPLACED]).is_err());
        assert!(read_row::<OpRecord>(&buf, 0, 1).is_err());
    }

    #[test]
    fn test_span_overflow() {
        assert!(matches!(
            Span::new(u32::MAX as usize, 1),
            Err(AllocationError::TableOverflow(_))
        ));
    }
}
