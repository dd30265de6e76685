// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed views over tensor bytes that live somewhere else.
//!
//! Tensor data never lives in this crate: it sits in the caller's arena
//! (activations, variables) or in the graph (constants). A view pairs a
//! borrowed byte slice with the shape and dtype needed to read it, and
//! [`Element`] maps Rust scalar types to their [`DType`] so that typed access
//! is checked instead of transmuted.

use crate::{DType, Shape, TensorError};

/// A Rust scalar type that can back a tensor element.
pub trait Element: bytemuck::Pod {
    /// The dtype whose buffers hold this element type.
    const DTYPE: DType;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
}
impl Element for i64 {
    const DTYPE: DType = DType::I64;
}
impl Element for i32 {
    const DTYPE: DType = DType::I32;
}
impl Element for i16 {
    const DTYPE: DType = DType::I16;
}
impl Element for i8 {
    const DTYPE: DType = DType::I8;
}
impl Element for u8 {
    const DTYPE: DType = DType::U8;
}

/// Reinterprets `bytes` as a slice of `T`, checking the dtype and alignment.
pub fn cast_elements<T: Element>(dtype: DType, bytes: &[u8]) -> Result<&[T], TensorError> {
    if dtype != T::DTYPE {
        return Err(TensorError::DTypeMismatch {
            expected: T::DTYPE,
            actual: dtype,
        });
    }
    bytemuck::try_cast_slice(bytes).map_err(|e| TensorError::Misaligned {
        dtype,
        len: bytes.len(),
        detail: e.to_string(),
    })
}

/// Mutable counterpart of [`cast_elements`].
pub fn cast_elements_mut<T: Element>(
    dtype: DType,
    bytes: &mut [u8],
) -> Result<&mut [T], TensorError> {
    if dtype != T::DTYPE {
        return Err(TensorError::DTypeMismatch {
            expected: T::DTYPE,
            actual: dtype,
        });
    }
    let len = bytes.len();
    bytemuck::try_cast_slice_mut(bytes).map_err(|e| TensorError::Misaligned {
        dtype,
        len,
        detail: e.to_string(),
    })
}

fn check_len(shape: &Shape, dtype: DType, actual: usize) -> Result<(), TensorError> {
    let expected = shape.size_bytes(dtype);
    if expected != actual {
        return Err(TensorError::BufferSizeMismatch { expected, actual });
    }
    Ok(())
}

/// A read-only view of one tensor's bytes.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    shape: &'a Shape,
    dtype: DType,
    data: &'a [u8],
}

impl<'a> TensorView<'a> {
    /// Creates a view, checking that `data` is exactly `shape × dtype` bytes.
    pub fn new(shape: &'a Shape, dtype: DType, data: &'a [u8]) -> Result<Self, TensorError> {
        check_len(shape, dtype, data.len())?;
        Ok(Self { shape, dtype, data })
    }

    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Interprets the bytes as elements of type `T`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{AlignedBytes, DType, Shape, TensorView};
    /// let shape = Shape::vector(2);
    /// let data = AlignedBytes::from_elements(&[3i32, 4]);
    /// let view = TensorView::new(&shape, DType::I32, data.as_bytes()).unwrap();
    /// assert_eq!(view.as_slice::<i32>().unwrap(), &[3, 4]);
    /// assert!(view.as_slice::<f32>().is_err());
    /// ```
    pub fn as_slice<T: Element>(&self) -> Result<&'a [T], TensorError> {
        cast_elements(self.dtype, self.data)
    }
}

/// A writable view of one tensor's bytes.
#[derive(Debug)]
pub struct TensorViewMut<'a> {
    shape: &'a Shape,
    dtype: DType,
    data: &'a mut [u8],
}

impl<'a> TensorViewMut<'a> {
    /// Creates a view, checking that `data` is exactly `shape × dtype` bytes.
    pub fn new(shape: &'a Shape, dtype: DType, data: &'a mut [u8]) -> Result<Self, TensorError> {
        check_len(shape, dtype, data.len())?;
        Ok(Self { shape, dtype, data })
    }

    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.data
    }

    pub fn as_slice<T: Element>(&self) -> Result<&[T], TensorError> {
        cast_elements(self.dtype, self.data)
    }

    pub fn as_slice_mut<T: Element>(&mut self) -> Result<&mut [T], TensorError> {
        cast_elements_mut(self.dtype, self.data)
    }

    /// Downgrades to a read-only view for the same lifetime.
    pub fn into_view(self) -> TensorView<'a> {
        TensorView {
            shape: self.shape,
            dtype: self.dtype,
            data: self.data,
        }
    }
}
