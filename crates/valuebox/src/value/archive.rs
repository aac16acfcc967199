// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary archive of a typed value (descriptor + raw bytes).
//!
//! # Layout
//!
//! All integers are little-endian:
//!
//! ```text
//! +--------+------------------+----------+-----------------+---------+-------+
//! | "TVAL" | u32 encoding_len | encoding | u32 payload_len | payload | crc32 |
//! +--------+------------------+----------+-----------------+---------+-------+
//! ```
//!
//! The CRC-32 covers `encoding || payload`. The payload is the value's raw
//! native-endian bytes, so archives only round-trip between hosts sharing an
//! ABI (or decoded with a matching [`LayoutConfig`]).

use crate::config::LayoutConfig;
use crate::encoding::TypeDescriptor;
use crate::error::{Error, Result};
use crate::value::{MutableTypedValue, TypedValue};
use std::sync::Arc;

const MAGIC: &[u8; 4] = b"TVAL";

/// Magic, two length prefixes and the checksum.
const FRAME_OVERHEAD: usize = 4 + 4 + 4 + 4;

fn checksum(encoding: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(encoding);
    hasher.update(payload);
    hasher.finalize()
}

fn len_prefix(section: &'static str, len: usize) -> Result<[u8; 4]> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| Error::ArchiveTooLarge { section, len })
}

/// Bounds-checked reader over an archive buffer.
struct Reader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| {
                Error::Decoding(format!(
                    "truncated archive: need {} bytes at offset {}, have {}",
                    len,
                    self.offset,
                    self.remaining()
                ))
            })?;
        let bytes = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    fn read_len_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32_le()? as usize;
        self.take(len)
    }

    fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }
}

fn decode(bytes: &[u8], config: &LayoutConfig) -> Result<TypedValue> {
    let mut reader = Reader::new(bytes);
    if reader.take(MAGIC.len())? != MAGIC {
        return Err(Error::Decoding("bad magic, expected \"TVAL\"".into()));
    }
    let encoding = reader.read_len_prefixed()?;
    let payload = reader.read_len_prefixed()?;
    let stored = reader.read_u32_le()?;
    if reader.remaining() != 0 {
        return Err(Error::Decoding(format!(
            "{} trailing bytes after archive",
            reader.remaining()
        )));
    }

    let computed = checksum(encoding, payload);
    if computed != stored {
        return Err(Error::Decoding(format!(
            "checksum mismatch: stored {:#010x}, computed {:#010x}",
            stored, computed
        )));
    }

    let encoding = std::str::from_utf8(encoding)
        .map_err(|e| Error::Decoding(format!("encoding is not valid UTF-8: {}", e)))?;
    let descriptor = TypeDescriptor::parse_with(encoding, config)
        .map_err(|e| Error::Decoding(format!("archived encoding rejected: {}", e)))?;
    if payload.len() != descriptor.size() {
        return Err(Error::Decoding(format!(
            "payload is {} bytes but '{}' describes {}",
            payload.len(),
            descriptor.encoding(),
            descriptor.size()
        )));
    }

    Ok(TypedValue {
        descriptor: Arc::new(descriptor),
        storage: payload.into(),
    })
}

impl TypedValue {
    /// Serializes the encoding and raw bytes into a self-checking archive.
    ///
    /// Fails with `ArchiveTooLarge` only when the encoding or payload is
    /// longer than `u32::MAX` bytes.
    ///
    /// ```rust
    /// use valuebox::TypedValue;
    ///
    /// let value = TypedValue::from_scalar([3u8, 1, 4]).unwrap();
    /// let archive = value.to_archive().unwrap();
    /// assert_eq!(&archive[..4], b"TVAL");
    /// assert_eq!(TypedValue::from_archive(&archive).unwrap(), value);
    /// ```
    pub fn to_archive(&self) -> Result<Vec<u8>> {
        let encoding = self.encoding().as_bytes();
        let payload = self.as_bytes();
        let mut out = Vec::with_capacity(FRAME_OVERHEAD + encoding.len() + payload.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&len_prefix("encoding", encoding.len())?);
        out.extend_from_slice(encoding);
        out.extend_from_slice(&len_prefix("payload", payload.len())?);
        out.extend_from_slice(payload);
        out.extend_from_slice(&checksum(encoding, payload).to_le_bytes());
        log::trace!("[ARCHIVE] Encoded '{}' into {} bytes", self.encoding(), out.len());
        Ok(out)
    }

    /// Decodes an archive produced by [`to_archive`](Self::to_archive),
    /// re-parsing its encoding with the host layout.
    pub fn from_archive(bytes: &[u8]) -> Result<Self> {
        Self::from_archive_with(bytes, &LayoutConfig::host())
    }

    /// Decodes an archive, parsing its encoding under `config`.
    ///
    /// Every failure is reported as `Error::Decoding`.
    pub fn from_archive_with(bytes: &[u8], config: &LayoutConfig) -> Result<Self> {
        decode(bytes, config).map_err(|e| {
            log::debug!("[ARCHIVE] Rejected {} byte archive: {}", bytes.len(), e);
            e
        })
    }
}

impl MutableTypedValue {
    pub fn from_archive(bytes: &[u8]) -> Result<Self> {
        TypedValue::from_archive(bytes).map(Self::from)
    }

    pub fn from_archive_with(bytes: &[u8], config: &LayoutConfig) -> Result<Self> {
        TypedValue::from_archive_with(bytes, config).map(Self::from)
    }
}
