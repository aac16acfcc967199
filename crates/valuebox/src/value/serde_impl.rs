// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! serde support: values travel as `{ encoding, bytes }`.
//!
//! Deserialization re-runs the same validation as construction: the
//! encoding must parse under the host layout and `bytes` must be exactly
//! the described size.

use crate::encoding::TypeDescriptor;
use crate::value::{MutableTypedValue, TypedValue};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

#[derive(Serialize)]
struct ValueRef<'a> {
    encoding: &'a str,
    bytes: &'a [u8],
}

#[derive(Deserialize)]
struct ValueRepr {
    encoding: String,
    bytes: Vec<u8>,
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ValueRef {
            encoding: self.encoding(),
            bytes: self.as_bytes(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TypedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = ValueRepr::deserialize(deserializer)?;
        let descriptor = TypeDescriptor::parse(&repr.encoding).map_err(D::Error::custom)?;
        if repr.bytes.len() != descriptor.size() {
            return Err(D::Error::custom(format!(
                "'{}' describes {} bytes, got {}",
                descriptor.encoding(),
                descriptor.size(),
                repr.bytes.len()
            )));
        }
        Ok(TypedValue {
            descriptor: Arc::new(descriptor),
            storage: repr.bytes.into_boxed_slice(),
        })
    }
}

impl Serialize for MutableTypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (**self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MutableTypedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TypedValue::deserialize(deserializer).map(Self::from)
    }
}
