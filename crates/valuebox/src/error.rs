// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for encoding parsing and typed value access.

use thiserror::Error;

/// Errors raised while parsing encodings or accessing typed values.
///
/// Every variant is a local, deterministic validation failure. None of them
/// leave a partially built descriptor or a partially written buffer behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Encoding string violates the grammar.
    #[error("Malformed encoding '{encoding}' at position {position}: {reason}")]
    MalformedEncoding {
        encoding: String,
        position: usize,
        reason: String,
    },

    /// Supplied byte buffer is too short, or a size disagrees with the descriptor.
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Caller's expected type does not match the stored descriptor.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Array element or record field index beyond bounds.
    #[error("Index out of range: {index} >= {count}")]
    IndexOutOfRange { index: usize, count: usize },

    /// No record field carries the requested name.
    #[error("Key not found: '{key}'")]
    KeyNotFound { key: String },

    /// A section is too long for the archive's `u32` length prefix.
    #[error("Archive {section} of {len} bytes exceeds the u32 length prefix")]
    ArchiveTooLarge { section: &'static str, len: usize },

    /// Archived representation failed re-validation.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Layout configuration is invalid or could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(encoding: &str, position: usize, reason: impl Into<String>) -> Self {
        Self::MalformedEncoding {
            encoding: encoding.to_string(),
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
