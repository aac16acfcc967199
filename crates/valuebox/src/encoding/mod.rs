// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type encodings
//!
//! Parses C-ABI type-encoding strings into structured [`TypeDescriptor`]s
//! and renders descriptors back to their normalized string form.
//!
//! # Grammar
//!
//! - **Scalars**: `c C s S i I l L q Q t T f d D B v * # :`
//! - **Objects**: `@`, `@"ClassName"`, blocks `@?`
//! - **Pointers**: `^?`, `^{opaque}`, `^type`
//! - **Arrays**: `[N type]` with `N >= 1`
//! - **Records**: `{name=type...}`, optionally `{name="field"type...}`
//!
//! Method qualifiers (`r n N o O R V`) are accepted before any type and
//! dropped from the normalized encoding.
//!
//! # Example
//!
//! ```rust
//! use valuebox::{ScalarKind, TypeDescriptor, TypeKind};
//!
//! let rect = TypeDescriptor::parse("{rect=\"origin\"{point=dd}\"size\"{size=dd}}").unwrap();
//! assert_eq!(rect.size(), 32);
//! assert_eq!(rect.count(), 2);
//!
//! let size = rect.field("size").unwrap();
//! assert_eq!(size.offset, 16);
//!
//! let array = TypeDescriptor::parse("[4rS]").unwrap();
//! assert_eq!(array.encoding(), "[4S]");
//! match array.kind() {
//!     TypeKind::Array(a) => assert_eq!(a.element.as_scalar(), Some(&ScalarKind::UShort)),
//!     _ => unreachable!(),
//! }
//! ```

mod builder;
mod descriptor;
pub(crate) mod parser;
mod scalar;

pub use builder::TypeDescriptorBuilder;
pub use descriptor::{
    ArrayDescriptor, FieldDescriptor, RecordDescriptor, Region, TypeDescriptor, TypeKind,
    MAX_SIZE,
};
pub use scalar::{Pointee, ScalarKind};
