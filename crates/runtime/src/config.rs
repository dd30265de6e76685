// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! arena_size = "16K"
//! placement = "greedy-first-fit"
//! enable_profiling = true
//! ```

use memory_manager::ArenaSize;
use memory_planner::{strategy_by_name, PlacementStrategy};
use std::path::Path;

/// Configuration for an interpreter.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Arena size (human-readable, e.g. `"16K"`).
    pub arena_size: String,
    /// Placement strategy name: `"greedy-first-fit"` or `"linear"`.
    #[serde(default = "default_placement")]
    pub placement: String,
    /// Whether the profiler hooks run (needs the `profiling` feature).
    #[serde(default = "default_true")]
    pub enable_profiling: bool,
}

fn default_placement() -> String {
    "greedy-first-fit".to_string()
}

fn default_true() -> bool {
    true
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML parse error: {e}"))
        })
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML serialise error: {e}"))
        })
    }

    /// Parses the arena size string into an [`ArenaSize`].
    pub fn parse_arena_size(&self) -> Result<ArenaSize, super::RuntimeError> {
        ArenaSize::parse(&self.arena_size)
            .map_err(|e| super::RuntimeError::ConfigError(format!("invalid arena size: {e}")))
    }

    /// Creates the placement strategy specified by this config.
    pub fn create_strategy(&self) -> Result<Box<dyn PlacementStrategy>, super::RuntimeError> {
        strategy_by_name(&self.placement)
            .map_err(|e| super::RuntimeError::ConfigError(e.to_string()))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            arena_size: "16K".to_string(),
            placement: default_placement(),
            enable_profiling: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = RuntimeConfig::default();
        assert_eq!(c.arena_size, "16K");
        assert_eq!(c.placement, "greedy-first-fit");
        assert!(c.enable_profiling);
    }

    #[test]
    fn test_parse_arena_size() {
        let c = RuntimeConfig {
            arena_size: "2K".into(),
            ..Default::default()
        };
        assert_eq!(c.parse_arena_size().unwrap().as_bytes(), 2048);

        let bad = RuntimeConfig {
            arena_size: "lots".into(),
            ..Default::default()
        };
        assert!(bad.parse_arena_size().is_err());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
arena_size = "256K"
placement = "linear"
enable_profiling = false
"#;
        let c = RuntimeConfig::from_toml(toml).unwrap();
        assert_eq!(c.arena_size, "256K");
        assert_eq!(c.placement, "linear");
        assert!(!c.enable_profiling);
    }

    #[test]
    fn test_from_toml_defaults() {
        let c = RuntimeConfig::from_toml("arena_size = \"4K\"").unwrap();
        assert_eq!(c.placement, "greedy-first-fit");
        assert!(c.enable_profiling);
        assert!(RuntimeConfig::from_toml("placement = \"linear\"").is_err());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = RuntimeConfig::default();
        let toml = c.to_toml().unwrap();
        let back = RuntimeConfig::from_toml(&toml).unwrap();
        assert_eq!(back.placement, c.placement);
        assert_eq!(back.arena_size, c.arena_size);
    }

    #[test]
    fn test_create_strategy() {
        let c = RuntimeConfig {
            placement: "linear".into(),
            ..Default::default()
        };
        assert_eq!(c.create_strategy().unwrap().name(), "linear");
        assert_eq!(
            RuntimeConfig::default().create_strategy().unwrap().name(),
            "greedy-first-fit"
        );
    }

    #[test]
    fn test_create_strategy_unknown() {
        let c = RuntimeConfig {
            placement: "bogus".into(),
            ..Default::default()
        };
        assert!(matches!(
            c.create_strategy(),
            Err(super::super::RuntimeError::ConfigError(_))
        ));
    }
}
