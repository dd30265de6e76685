// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The allocator interface shared by the plain and the recording arena.

use crate::{AllocationCategory, Arena, MemoryError};
use std::cell::RefCell;
use std::rc::Rc;

/// A two-ended arena allocator whose requests are tagged with a category.
///
/// Implementations must give identical success/failure outcomes for the
/// same sequence of requests regardless of how they treat the category.
pub trait ArenaAllocator {
    fn allocate_head(
        &mut self,
        size: usize,
        align: usize,
        category: AllocationCategory,
    ) -> Result<usize, MemoryError>;

    fn allocate_tail(
        &mut self,
        size: usize,
        align: usize,
        category: AllocationCategory,
    ) -> Result<usize, MemoryError>;

    fn reset_head(&mut self);

    fn head_used_bytes(&self) -> usize;

    fn tail_used_bytes(&self) -> usize;

    fn used_bytes(&self) -> usize {
        self.head_used_bytes() + self.tail_used_bytes()
    }

    fn capacity(&self) -> usize;

    fn buffer(&self) -> &[u8];

    fn buffer_mut(&mut self) -> &mut [u8];
}

/// An allocator shared sequentially by several interpreters.
///
/// Single-threaded by construction: the runtime never plans two graphs
/// against the same arena at the same time.
pub type SharedAllocator<'a> = Rc<RefCell<dyn ArenaAllocator + 'a>>;

impl ArenaAllocator for Arena<'_> {
    fn allocate_head(
        &mut self,
        size: usize,
        align: usize,
        _category: AllocationCategory,
    ) -> Result<usize, MemoryError> {
        Arena::allocate_head(self, size, align)
    }

    fn allocate_tail(
        &mut self,
        size: usize,
        align: usize,
        _category: AllocationCategory,
    ) -> Result<usize, MemoryError> {
        Arena::allocate_tail(self, size, align)
    }

    fn reset_head(&mut self) {
        Arena::reset_head(self);
    }

    fn head_used_bytes(&self) -> usize {
        Arena::head_used_bytes(self)
    }

    fn tail_used_bytes(&self) -> usize {
        Arena::tail_used_bytes(self)
    }

    fn capacity(&self) -> usize {
        Arena::capacity(self)
    }

    fn buffer(&self) -> &[u8] {
        Arena::buffer(self)
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        Arena::buffer_mut(self)
    }
}
