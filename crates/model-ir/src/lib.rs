// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! The in-memory graph the runtime plans and executes.
//!
//! - [`TensorDef`]: a tensor's dtype, shape, and whether it is an
//!   activation, a constant (data inline), or a variable (state).
//! - [`OperatorDef`] / [`OpCode`]: one operator and the tensors it reads
//!   and writes, with `None` for omitted optional operands.
//! - [`ModelGraph`]: tensors plus operators in execution order, with a
//!   **type-state pattern** (`Loaded` → `Validated`).
//! - [`ModelLoader`] / [`ModelManifest`]: build graphs from JSON.
//!
//! # Example
//! ```no_run
//! use model_ir::ModelLoader;
//! use std::path::Path;
//!
//! let graph = ModelLoader::load(Path::new("./models/add21.json")).unwrap();
//! println!("{}", graph.summary());
//! for op in graph.iter_operators() {
//!     println!("  {}", op.summary());
//! }
//! ```

mod error;
pub mod graph;
mod loader;
mod manifest;
mod operator;
mod tensor;

pub use error::ModelError;
pub use graph::ModelGraph;
pub use loader::ModelLoader;
pub use manifest::{ManifestOperator, ManifestTensor, ModelManifest};
pub use operator::{OpCode, OperatorDef};
pub use tensor::{TensorDef, TensorKind};
