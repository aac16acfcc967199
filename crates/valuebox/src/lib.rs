// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # valuebox - typed value containers driven by C-ABI type encodings
//!
//! Stores an arbitrary pointer-free value (primitive, record, fixed-size
//! array) next to a machine-readable description of its layout, and gives
//! type-checked read/write access to the whole value or to any element or
//! field inside it.
//!
//! ## Quick Start
//!
//! ```rust
//! use valuebox::{MutableTypedValue, Result, TypeDescriptor};
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let point = Arc::new(TypeDescriptor::parse("{point=ff}")?);
//!
//!     let mut value = MutableTypedValue::zeroed(point);
//!     value.set_at(0, 1.0f32)?;
//!     value.set_at(1, 2.0f32)?;
//!
//!     assert_eq!(value.at(0)?.get::<f32>()?, 1.0);
//!     assert_eq!(value.get_at::<f32>(1)?, 2.0);
//!     assert!(value.at(2).is_err());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |   TypedValue / MutableTypedValue   (value)                          |
//! |   get / set / at / at_key | archive | serde                         |
//! +---------------------------------------------------------------------+
//! |   Encode trait + descriptor cache  (encode)                         |
//! +---------------------------------------------------------------------+
//! |   TypeDescriptor: parser, layout, regions  (encoding)               |
//! +---------------------------------------------------------------------+
//! |   LayoutConfig (config)  |  Error (error)                           |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Parsed encoding: scalar, array or record with computed layout |
//! | [`TypedValue`] | Owned bytes plus descriptor, type-checked reads |
//! | [`MutableTypedValue`] | Adds type-checked writes |
//! | [`Encode`] | Bridges Rust types to encodings and bytes |
//! | [`LayoutConfig`] | Target ABI sizes (pointer width, `long double`) and parser limits |
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade with
//! `[ENCODING]`, `[VALUE]`, `[ARCHIVE]`, `[CACHE]` and `[CONFIG]` tags and
//! never installs a logger itself.
//!
//! ## Features
//!
//! - `serde` (default): `Serialize`/`Deserialize` for values and `LayoutConfig`
//! - `yaml`: `LayoutConfig::from_yaml_file` and `LayoutConfig::from_yaml_str`

pub mod config;
pub mod encode;
pub mod encoding;
pub mod error;
pub mod value;

pub use config::LayoutConfig;
pub use encode::Encode;
pub use encoding::{
    ArrayDescriptor, FieldDescriptor, Pointee, RecordDescriptor, Region, ScalarKind,
    TypeDescriptor, TypeDescriptorBuilder, TypeKind,
};
pub use error::{Error, Result};
pub use value::{MutableTypedValue, TypedValue};
