// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

pub mod inspect;
pub mod plan;
pub mod run;

use model_ir::{graph::Validated, ModelGraph, ModelLoader};
use runtime::RuntimeConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber. `RUST_LOG` wins over the `-v` count.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Reads the config file if one was given, then applies CLI overrides.
pub fn load_config(
    path: Option<&Path>,
    arena_size: Option<String>,
    placement: Option<String>,
) -> anyhow::Result<RuntimeConfig> {
    let mut config = match path {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(size) = arena_size {
        config.arena_size = size;
    }
    if let Some(placement) = placement {
        config.placement = placement;
    }
    tracing::debug!("effective config:\n{}", config.to_toml()?);
    Ok(config)
}

pub fn load_model(path: &Path) -> anyhow::Result<ModelGraph<Validated>> {
    ModelLoader::load(path)
        .map_err(|e| anyhow::anyhow!("failed to load model from '{}': {e}", path.display()))
}

/// Truncates a string to `max_len` with ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
