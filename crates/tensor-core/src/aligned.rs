// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Owned byte storage with 8-byte alignment, for constant tensor data.

use crate::Element;
use std::fmt;

/// A byte buffer whose start is aligned for any [`Element`] type.
///
/// Constant tensors keep their data in the graph rather than the arena;
/// a plain `Vec<u8>` would not guarantee that an `i32` or `f32` view of it
/// is aligned, so the bytes are stored in `u64` words.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<u8>", into = "Vec<u8>")]
pub struct AlignedBytes {
    words: Vec<u64>,
    len: usize,
}

impl AlignedBytes {
    /// Copies `bytes` into aligned storage.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut words = vec![0u64; bytes.len().div_ceil(8)];
        bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);
        Self {
            words,
            len: bytes.len(),
        }
    }

    /// Copies a slice of elements into aligned storage.
    pub fn from_elements<T: Element>(values: &[T]) -> Self {
        Self::from_slice(bytemuck::cast_slice(values))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl From<Vec<u8>> for AlignedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_slice(&bytes)
    }
}

impl From<AlignedBytes> for Vec<u8> {
    fn from(bytes: AlignedBytes) -> Self {
        bytes.as_bytes().to_vec()
    }
}

impl fmt::Debug for AlignedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBytes").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        let b = AlignedBytes::from_slice(&[1, 2, 3]);
        assert_eq!(b.as_bytes(), &[1, 2, 3]);
        assert_eq!(b.as_bytes().as_ptr() as usize % 8, 0);
    }

    #[test]
    fn test_from_elements() {
        let b = AlignedBytes::from_elements(&[21i32]);
        assert_eq!(b.len(), 4);
        assert_eq!(b.as_bytes(), &21i32.to_ne_bytes());
    }

    #[test]
    fn test_empty() {
        let b = AlignedBytes::from_slice(&[]);
        assert!(b.is_empty());
        assert!(b.as_bytes().is_empty());
    }

    #[test]
    fn test_serde_as_byte_list() {
        let b = AlignedBytes::from_slice(&[5, 6]);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[5,6]");
        let back: AlignedBytes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
