// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Element types, shapes and typed views for tensors whose bytes live in a
//! caller-supplied arena.
//!
//! This crate provides:
//! - [`DType`]: supported element data types.
//! - [`Shape`]: ordered dimensions and byte-size computation.
//! - [`TensorView`] / [`TensorViewMut`]: borrowed, dtype-checked views over
//!   raw bytes; typed access goes through [`Element`] and `bytemuck`.
//! - [`AlignedBytes`]: aligned owned storage for constant tensor data.
//!
//! # Design Goals
//! - Tensors never own arena memory: views borrow it.
//! - No `unsafe`: typed reinterpretation is checked by `bytemuck`.
//! - Clean error types via `thiserror`.

mod aligned;
mod dtype;
mod error;
mod shape;
mod view;

pub use aligned::AlignedBytes;
pub use dtype::DType;
pub use error::TensorError;
pub use shape::Shape;
pub use view::{cast_elements, cast_elements_mut, Element, TensorView, TensorViewMut};
