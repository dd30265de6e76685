// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Mock kernels and graphs for tests, benches and the CLI.
//!
//! Every kernel can report its teardown through a [`FreeTracker`], so tests
//! can check that an interpreter frees each kernel exactly once without any
//! process-wide state.

pub mod kernels;
pub mod models;

use crate::MutableOpResolver;
use kernels::{Accumulate, Elementwise, MockCustom, MultipleInputs, NoOp, SimpleStatefulOp};
use model_ir::OpCode;
use std::cell::Cell;
use std::rc::Rc;

/// Counts kernel `free` calls. Clones share the count.
#[derive(Debug, Clone, Default)]
pub struct FreeTracker(Rc<Cell<usize>>);

impl FreeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `free` calls seen so far.
    pub fn count(&self) -> usize {
        self.0.get()
    }

    pub(crate) fn record(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Resolver with every mock kernel registered.
pub fn mock_resolver() -> MutableOpResolver {
    tracked_resolver(&FreeTracker::new())
}

/// Like [`mock_resolver`], with every kernel reporting to `tracker`.
pub fn tracked_resolver(tracker: &FreeTracker) -> MutableOpResolver {
    let mut resolver = MutableOpResolver::new();

    let t = tracker.clone();
    resolver.add(OpCode::custom(kernels::MOCK_CUSTOM), move || {
        Box::new(MockCustom::new(t.clone()))
    });
    let t = tracker.clone();
    resolver.add(OpCode::custom(kernels::SIMPLE_STATEFUL_OP), move || {
        Box::new(SimpleStatefulOp::new(t.clone()))
    });
    let t = tracker.clone();
    resolver.add(OpCode::custom(kernels::MULTIPLE_INPUTS_OP), move || {
        Box::new(MultipleInputs::new(t.clone()))
    });
    let t = tracker.clone();
    resolver.add(OpCode::custom(kernels::NO_OP), move || {
        Box::new(NoOp::new(t.clone()))
    });
    let t = tracker.clone();
    resolver.add(OpCode::custom(kernels::ACCUMULATE), move || {
        Box::new(Accumulate::new(t.clone()))
    });
    let t = tracker.clone();
    resolver.add(OpCode::Add, move || Box::new(Elementwise::add(t.clone())));
    let t = tracker.clone();
    resolver.add(OpCode::Mul, move || Box::new(Elementwise::mul(t.clone())));

    resolver
}
