// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed values
//!
//! A [`TypedValue`] owns a byte buffer together with the
//! [`TypeDescriptor`](crate::TypeDescriptor) that describes its layout.
//! Reads and writes name the type they expect, and the access is refused
//! unless that type is compatible with the stored (or addressed) region.
//!
//! # Features
//!
//! - **TypedValue**: immutable container with whole, indexed and keyed reads
//! - **MutableTypedValue**: adds type-checked writes, derefs to `TypedValue`
//! - **Archive**: self-checking binary form (`"TVAL"` frame with CRC-32)
//! - **serde**: `{ encoding, bytes }` representation (feature `serde`)
//!
//! # Example
//!
//! ```rust
//! use valuebox::{MutableTypedValue, TypeDescriptor};
//! use std::sync::Arc;
//!
//! let sample = Arc::new(TypeDescriptor::parse("{sample=\"id\"I\"reading\"d}").unwrap());
//!
//! let mut value = MutableTypedValue::zeroed(sample);
//! value.set_for_key("id", 42u32).unwrap();
//! value.set_for_key("reading", 23.5f64).unwrap();
//!
//! assert_eq!(value.get_for_key::<u32>("id").unwrap(), 42);
//! assert_eq!(value.at(1).unwrap().get::<f64>().unwrap(), 23.5);
//! assert!(value.get_for_key::<f32>("reading").is_err());
//! ```

mod archive;
mod mutable;
#[cfg(feature = "serde")]
mod serde_impl;
mod typed_value;

pub use mutable::MutableTypedValue;
pub use typed_value::TypedValue;
