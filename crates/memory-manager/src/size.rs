// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arena size configuration and parsing.
//!
//! An [`ArenaSize`] is the number of bytes a caller sets aside for the arena.
//! It supports human-readable string parsing for configuration files and the
//! CLI.

use crate::MemoryError;
use std::fmt;

/// The size of a caller-supplied arena buffer.
///
/// # Parsing
/// Supports human-readable strings with binary suffixes:
/// - `"16K"` or `"16KB"` → 16 × 1024 bytes
/// - `"2M"` or `"2MB"` → 2 × 1024² bytes
/// - `"4096"` or `"4096B"` → raw byte count
///
/// # Examples
/// ```
/// use memory_manager::ArenaSize;
///
/// let s = ArenaSize::from_kb(16);
/// assert_eq!(s.as_bytes(), 16 * 1024);
///
/// let s = ArenaSize::parse("2M").unwrap();
/// assert_eq!(s.as_kb(), 2048);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArenaSize {
    bytes: usize,
}

impl ArenaSize {
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    pub fn from_kb(kb: usize) -> Self {
        Self { bytes: kb * 1024 }
    }

    pub fn from_mb(mb: usize) -> Self {
        Self {
            bytes: mb * 1024 * 1024,
        }
    }

    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the size in kilobytes (truncated).
    pub fn as_kb(&self) -> usize {
        self.bytes / 1024
    }

    /// Parses a human-readable size string.
    ///
    /// Accepted formats: `"16K"`, `"16KB"`, `"2M"`, `"2MB"`, `"4096B"`, or a
    /// plain byte count. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        let s = s.trim();
        let s_upper = s.to_uppercase();

        let (num_str, multiplier) = if s_upper.ends_with("MB") {
            (&s[..s.len() - 2], 1024 * 1024)
        } else if s_upper.ends_with('M') {
            (&s[..s.len() - 1], 1024 * 1024)
        } else if s_upper.ends_with("KB") {
            (&s[..s.len() - 2], 1024)
        } else if s_upper.ends_with('K') {
            (&s[..s.len() - 1], 1024)
        } else if s_upper.ends_with('B') {
            (&s[..s.len() - 1], 1)
        } else {
            (s, 1)
        };

        let value: usize = num_str.trim().parse().map_err(|_| {
            MemoryError::InvalidSize(format!(
                "'{s}': expected a number followed by an optional suffix (K, M)"
            ))
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| MemoryError::InvalidSize(format!("'{s}' overflows")))?;

        if bytes == 0 {
            return Err(MemoryError::InvalidSize(format!("'{s}' is zero")));
        }

        Ok(Self { bytes })
    }

    /// Allocates a zeroed buffer of this size, for callers that own their arena.
    pub fn allocate_buffer(&self) -> Vec<u8> {
        vec![0u8; self.bytes]
    }
}

impl fmt::Display for ArenaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= 1024 * 1024 && self.bytes % (1024 * 1024) == 0 {
            write!(f, "{} MB", self.bytes / (1024 * 1024))
        } else if self.bytes >= 1024 && self.bytes % 1024 == 0 {
            write!(f, "{} KB", self.bytes / 1024)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}
