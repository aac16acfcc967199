// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent cache of descriptors for host types.
//!
//! Parsing `T::encoding()` happens once per `TypeId`. Subsequent lookups are
//! served from a sharded `dashmap` and hand out clones of the same
//! `Arc<TypeDescriptor>`.

use super::Encode;
use crate::encoding::TypeDescriptor;
use crate::error::{Error, Result};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

static GLOBAL_CACHE: OnceLock<DescriptorCache> = OnceLock::new();

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub last_miss_ns: u64,
}

/// Descriptor cache keyed by Rust `TypeId`.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: DashMap<TypeId, Arc<TypeDescriptor>>,
    stats: RwLock<CacheStats>,
}

impl DescriptorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by [`descriptor`](super::descriptor).
    pub fn global() -> &'static Self {
        GLOBAL_CACHE.get_or_init(Self::new)
    }

    /// Returns the descriptor for `T`, parsing and checking it on a miss.
    ///
    /// Failures are not cached.
    pub fn get_or_insert<T: Encode>(&self) -> Result<Arc<TypeDescriptor>> {
        let key = TypeId::of::<T>();
        if let Some(hit) = self.entries.get(&key) {
            self.stats.write().hits += 1;
            return Ok(Arc::clone(hit.value()));
        }

        let start = Instant::now();
        let encoding = T::encoding();
        let desc = TypeDescriptor::parse(&encoding)?;
        let native = std::mem::size_of::<T>();
        if desc.size() != native {
            log::debug!(
                "[CACHE] '{}' describes {} bytes but {} is {} bytes",
                desc.encoding(),
                desc.size(),
                std::any::type_name::<T>(),
                native
            );
            return Err(Error::SizeMismatch {
                expected: native,
                actual: desc.size(),
            });
        }

        // A concurrent miss may have inserted first; keep that entry
        let desc = Arc::clone(
            self.entries
                .entry(key)
                .or_insert_with(|| Arc::new(desc))
                .value(),
        );
        self.record_miss(start);
        log::debug!(
            "[CACHE] Registered {} as '{}'",
            std::any::type_name::<T>(),
            desc.encoding()
        );
        Ok(desc)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached descriptor. Values holding one keep it alive.
    pub fn clear(&self) {
        self.entries.clear();
        *self.stats.write() = CacheStats::default();
    }

    fn record_miss(&self, start: Instant) {
        let mut stats = self.stats.write();
        stats.misses += 1;
        stats.last_miss_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
    }
}
