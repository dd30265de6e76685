// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Maps operator codes to kernel implementations.

use crate::Kernel;
use model_ir::OpCode;
use std::collections::HashMap;
use std::fmt;

/// Creates a fresh kernel for an operator code.
pub trait OpResolver {
    /// Returns `None` if no kernel is registered for `code`.
    fn create_kernel(&self, code: &OpCode) -> Option<Box<dyn Kernel>>;
}

type KernelFactory = Box<dyn Fn() -> Box<dyn Kernel>>;

/// A resolver that kernels are registered into at runtime.
///
/// # Example
/// ```
/// use runtime::{MutableOpResolver, OpResolver};
/// use runtime::testing::kernels::NoOp;
/// use model_ir::OpCode;
///
/// let mut resolver = MutableOpResolver::new();
/// resolver.add(OpCode::custom("no_op"), || Box::new(NoOp::default()));
/// assert!(resolver.create_kernel(&OpCode::custom("no_op")).is_some());
/// assert!(resolver.create_kernel(&OpCode::Add).is_none());
/// ```
#[derive(Default)]
pub struct MutableOpResolver {
    factories: HashMap<OpCode, KernelFactory>,
}

impl MutableOpResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for `code`, replacing any earlier registration.
    pub fn add<F>(&mut self, code: OpCode, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Kernel> + 'static,
    {
        if self.factories.insert(code.clone(), Box::new(factory)).is_some() {
            tracing::debug!("kernel for '{code}' replaced");
        }
        self
    }

    pub fn contains(&self, code: &OpCode) -> bool {
        self.factories.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl OpResolver for MutableOpResolver {
    fn create_kernel(&self, code: &OpCode) -> Option<Box<dyn Kernel>> {
        self.factories.get(code).map(|factory| factory())
    }
}

impl fmt::Debug for MutableOpResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<&str> = self.factories.keys().map(OpCode::as_str).collect();
        codes.sort_unstable();
        f.debug_struct("MutableOpResolver").field("codes", &codes).finish()
    }
}
