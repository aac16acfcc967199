// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout configuration (target ABI sizes and parser limits).
//!
//! Most scalar codes have a fixed size in the encoding grammar. Pointer-like
//! codes (`*`, `@`, `#`, `:`, `^...`) and `long double` (`D`) depend on the
//! target ABI, so they are read from a [`LayoutConfig`]. The default is the
//! host ABI.
//!
//! # Example
//!
//! ```rust
//! use valuebox::{LayoutConfig, TypeDescriptor};
//!
//! // Describe data produced by a 32-bit peer
//! let config = LayoutConfig {
//!     pointer_size: 4,
//!     pointer_align: 4,
//!     ..LayoutConfig::default()
//! };
//! let desc = TypeDescriptor::parse_with("{node=i^v}", &config).unwrap();
//! assert_eq!(desc.size(), 8);
//! ```

use crate::error::{Error, Result};

#[cfg(target_os = "windows")]
pub const LONG_DOUBLE_SIZE: usize = 8;
#[cfg(all(target_os = "macos", target_arch = "aarch64"))]
pub const LONG_DOUBLE_SIZE: usize = 8;
#[cfg(not(any(target_os = "windows", all(target_os = "macos", target_arch = "aarch64"))))]
pub const LONG_DOUBLE_SIZE: usize = 16;

#[cfg(target_os = "windows")]
pub const LONG_DOUBLE_ALIGN: usize = 8;
#[cfg(all(target_os = "macos", target_arch = "aarch64"))]
pub const LONG_DOUBLE_ALIGN: usize = 8;
#[cfg(not(any(target_os = "windows", all(target_os = "macos", target_arch = "aarch64"))))]
pub const LONG_DOUBLE_ALIGN: usize = 16;

/// Default maximum nesting depth of arrays, records and pointees.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Target ABI knobs used when computing scalar sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Size of pointer-like scalars in bytes
    pub pointer_size: usize,
    /// Alignment of pointer-like scalars in bytes
    pub pointer_align: usize,
    /// Size of `long double` (`D`) in bytes
    pub long_double_size: usize,
    /// Alignment of `long double` (`D`) in bytes
    pub long_double_align: usize,
    /// Maximum nesting depth accepted by the parser
    pub max_depth: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::host()
    }
}

impl LayoutConfig {
    /// Configuration matching the ABI this crate was compiled for.
    pub fn host() -> Self {
        Self {
            pointer_size: std::mem::size_of::<usize>(),
            pointer_align: std::mem::align_of::<usize>(),
            long_double_size: LONG_DOUBLE_SIZE,
            long_double_align: LONG_DOUBLE_ALIGN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Checks that sizes are non-zero and alignments are powers of two.
    pub fn validate(&self) -> Result<()> {
        if self.pointer_size == 0 {
            return Err(Error::Config("pointer_size must be > 0".into()));
        }
        if self.long_double_size == 0 {
            return Err(Error::Config("long_double_size must be > 0".into()));
        }
        for (name, align) in [
            ("pointer_align", self.pointer_align),
            ("long_double_align", self.long_double_align),
        ] {
            if !align.is_power_of_two() {
                return Err(Error::Config(format!(
                    "{} must be a power of two, got {}",
                    name, align
                )));
            }
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be > 0".into()));
        }
        Ok(())
    }

    /// Parses and validates a configuration from a YAML document.
    ///
    /// Missing keys fall back to the host defaults.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("YAML parse error: {}", e)))?;
        config.validate()?;
        log::debug!("[CONFIG] Loaded layout config: {:?}", config);
        Ok(config)
    }

    /// Loads a configuration from a YAML file.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }
}
