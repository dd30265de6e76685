// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use std::fmt;

/// Describes the dimensionality of a tensor buffer.
///
/// Shapes are fixed once a graph is loaded; the runtime never resizes a
/// tensor after its buffer has been placed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{DType, Shape};
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.num_elements(), 24);
    /// assert_eq!(s.checked_size_bytes(DType::I32), Some(96));
    /// assert_eq!(Shape::new(vec![usize::MAX, 2]).checked_num_elements(), None);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape (matrix).
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Element count, or `None` if the product overflows `usize`.
    /// A rank-0 shape holds one element.
    pub fn checked_num_elements(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Byte footprint for `dtype`, or `None` on overflow.
    pub fn checked_size_bytes(&self, dtype: super::DType) -> Option<usize> {
        self.checked_num_elements()?.checked_mul(dtype.size_bytes())
    }

    /// Element count, saturating at `usize::MAX`.
    ///
    /// Validated graphs never saturate; use
    /// [`checked_num_elements`](Self::checked_num_elements) on untrusted
    /// shapes.
    pub fn num_elements(&self) -> usize {
        self.checked_num_elements().unwrap_or(usize::MAX)
    }

    /// Byte footprint for `dtype`, saturating at `usize::MAX`.
    pub fn size_bytes(&self, dtype: super::DType) -> usize {
        self.checked_size_bytes(dtype).unwrap_or(usize::MAX)
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![2, 3])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}
