// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for record descriptors.

use crate::config::LayoutConfig;
use crate::encoding::{Pointee, ScalarKind, TypeDescriptor};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Builder for record [`TypeDescriptor`]s.
///
/// The result is identical to parsing its encoding string:
///
/// ```rust
/// use valuebox::{ScalarKind, TypeDescriptor, TypeDescriptorBuilder};
///
/// let point = TypeDescriptorBuilder::record("point")
///     .scalar_field("x", ScalarKind::Float)
///     .scalar_field("y", ScalarKind::Float)
///     .build()
///     .unwrap();
/// assert_eq!(point.encoding(), "{point=\"x\"f\"y\"f}");
/// assert_eq!(point, TypeDescriptor::parse(point.encoding()).unwrap());
/// ```
///
/// The first construction error is kept and reported by [`build`](Self::build).
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: Option<String>,
    fields: Vec<(Option<String>, Arc<TypeDescriptor>)>,
    config: LayoutConfig,
    error: Option<Error>,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a named record.
    pub fn record(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            fields: Vec::new(),
            config: LayoutConfig::host(),
            error: None,
        }
    }

    /// Create a new builder for an anonymous record (`{?=...}`).
    pub fn anonymous() -> Self {
        Self {
            name: None,
            ..Self::record("")
        }
    }

    /// Use `config` for the scalar fields added afterwards.
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    fn push(mut self, name: Option<String>, ty: Result<TypeDescriptor>) -> Self {
        match ty {
            Ok(ty) => self.fields.push((name, Arc::new(ty))),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Add a named scalar field.
    pub fn scalar_field(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        let ty = TypeDescriptor::scalar_with(kind, &self.config);
        self.push(Some(name.into()), ty)
    }

    /// Add a scalar field without a name (addressable by index only).
    pub fn unnamed_field(self, kind: ScalarKind) -> Self {
        let ty = TypeDescriptor::scalar_with(kind, &self.config);
        self.push(None, ty)
    }

    /// Add a field with a type descriptor.
    pub fn field(mut self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        self.fields.push((Some(name.into()), ty));
        self
    }

    /// Add a fixed-length array field of scalars.
    pub fn array_field(self, name: impl Into<String>, kind: ScalarKind, count: usize) -> Self {
        let ty = TypeDescriptor::scalar_with(kind, &self.config)
            .and_then(|element| TypeDescriptor::array(Arc::new(element), count));
        self.push(Some(name.into()), ty)
    }

    /// Add a pointer field.
    pub fn pointer_field(self, name: impl Into<String>, pointee: Pointee) -> Self {
        let ty = TypeDescriptor::scalar_with(ScalarKind::Pointer(pointee), &self.config);
        self.push(Some(name.into()), ty)
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> Result<TypeDescriptor> {
        if let Some(e) = self.error {
            return Err(e);
        }
        TypeDescriptor::record(self.name, self.fields)
    }
}
