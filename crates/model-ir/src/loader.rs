// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model loading from a JSON manifest.
//!
//! A model is either a single `.json` file or a directory containing
//! `model.json`. Constant data is read together with the graph; nothing is
//! loaded lazily.

use crate::{graph, ModelError, ModelGraph, ModelManifest};
use std::path::Path;

/// Default manifest filename inside a model directory.
const MANIFEST_FILE: &str = "model.json";

/// Loads a model from disk into a validated [`ModelGraph`].
///
/// # Example
/// ```no_run
/// use model_ir::ModelLoader;
/// use std::path::Path;
///
/// let graph = ModelLoader::load(Path::new("./models/add21.json")).unwrap();
/// println!("{}", graph.summary());
/// ```
pub struct ModelLoader;

impl ModelLoader {
    /// Loads and validates a model from a manifest file or model directory.
    pub fn load(path: &Path) -> Result<ModelGraph<graph::Validated>, ModelError> {
        let manifest_path = if path.is_dir() {
            path.join(MANIFEST_FILE)
        } else {
            path.to_path_buf()
        };
        tracing::debug!("loading model manifest from {}", manifest_path.display());
        let manifest = ModelManifest::from_file(&manifest_path)?;
        Self::from_manifest(manifest)
    }

    /// Loads and validates a model from a JSON string.
    pub fn from_json(json: &str) -> Result<ModelGraph<graph::Validated>, ModelError> {
        Self::from_manifest(ModelManifest::from_json(json)?)
    }

    /// Converts and validates an already parsed manifest.
    pub fn from_manifest(
        manifest: ModelManifest,
    ) -> Result<ModelGraph<graph::Validated>, ModelError> {
        let graph = manifest.into_graph()?.validate()?;
        tracing::info!("{}", graph.summary());
        Ok(graph)
    }
}
