// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Writable handle over a [`TypedValue`].

use crate::encode::{self, Encode};
use crate::encoding::TypeDescriptor;
use crate::error::{Error, Result};
use crate::value::typed_value::{check_compatible, rejected, Slot};
use crate::value::TypedValue;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A [`TypedValue`] that also accepts type-checked writes.
///
/// All read operations come from the wrapped value through `Deref`. Writes
/// validate the caller's type against the addressed region first and leave
/// storage untouched on any failure.
///
/// ```rust
/// use valuebox::{MutableTypedValue, TypedValue};
///
/// let mut value = MutableTypedValue::from_scalar([1i32, 2, 3]).unwrap();
/// value.set_at(1, 99i32).unwrap();
/// assert_eq!(value.at(1).unwrap().get::<i32>().unwrap(), 99);
///
/// let frozen: TypedValue = value.freeze();
/// assert_eq!(frozen.size(), 12);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct MutableTypedValue {
    inner: TypedValue,
}

impl MutableTypedValue {
    pub fn from_bytes(bytes: &[u8], descriptor: Arc<TypeDescriptor>) -> Result<Self> {
        TypedValue::from_bytes(bytes, descriptor).map(Self::from)
    }

    pub fn from_bytes_with_encoding(bytes: &[u8], encoding: &str) -> Result<Self> {
        TypedValue::from_bytes_with_encoding(bytes, encoding).map(Self::from)
    }

    pub fn from_scalar<T: Encode>(value: T) -> Result<Self> {
        TypedValue::from_scalar(value).map(Self::from)
    }

    /// A zero-filled value of `descriptor`, ready to be populated.
    pub fn zeroed(descriptor: Arc<TypeDescriptor>) -> Self {
        Self::from(TypedValue::zeroed(descriptor))
    }

    /// Overwrites the whole value with `bytes` when `expected` is compatible.
    ///
    /// Fails with `TypeMismatch` or with `SizeMismatch` when `bytes` is
    /// shorter than the value. Only the first `size` bytes are read.
    pub fn set_from(&mut self, expected: &TypeDescriptor, bytes: &[u8]) -> Result<()> {
        self.write(Slot::Whole, expected, bytes)
            .map_err(|e| rejected("set_from", e))
    }

    /// Parses `encoding`, then behaves like [`set_from`](Self::set_from).
    pub fn set_from_encoding(&mut self, encoding: &str, bytes: &[u8]) -> Result<()> {
        let expected = TypeDescriptor::parse(encoding)?;
        self.set_from(&expected, bytes)
    }

    /// Overwrites the `index`th element or field.
    pub fn set_from_at(
        &mut self,
        expected: &TypeDescriptor,
        index: usize,
        bytes: &[u8],
    ) -> Result<()> {
        self.write(Slot::Index(index), expected, bytes)
            .map_err(|e| rejected("set_from_at", e))
    }

    /// Overwrites the first field named `key`.
    pub fn set_from_for_key(
        &mut self,
        expected: &TypeDescriptor,
        key: &str,
        bytes: &[u8],
    ) -> Result<()> {
        self.write(Slot::Key(key), expected, bytes)
            .map_err(|e| rejected("set_from_for_key", e))
    }

    pub fn set<T: Encode>(&mut self, value: T) -> Result<()> {
        self.write_typed(Slot::Whole, &value)
            .map_err(|e| rejected("set", e))
    }

    pub fn set_at<T: Encode>(&mut self, index: usize, value: T) -> Result<()> {
        self.write_typed(Slot::Index(index), &value)
            .map_err(|e| rejected("set_at", e))
    }

    pub fn set_for_key<T: Encode>(&mut self, key: &str, value: T) -> Result<()> {
        self.write_typed(Slot::Key(key), &value)
            .map_err(|e| rejected("set_for_key", e))
    }

    /// Writes a boxed value into the `index`th slot.
    pub fn set_value_at(&mut self, index: usize, value: &TypedValue) -> Result<()> {
        self.write(Slot::Index(index), value.descriptor(), value.as_bytes())
            .map_err(|e| rejected("set_value_at", e))
    }

    /// Writes a boxed value into the field named `key`.
    pub fn set_value_for_key(&mut self, key: &str, value: &TypedValue) -> Result<()> {
        self.write(Slot::Key(key), value.descriptor(), value.as_bytes())
            .map_err(|e| rejected("set_value_for_key", e))
    }

    /// Converts into an immutable value. No bytes are copied.
    pub fn freeze(self) -> TypedValue {
        self.inner
    }

    fn write_typed<T: Encode>(&mut self, slot: Slot<'_>, value: &T) -> Result<()> {
        let expected = encode::descriptor::<T>()?;
        // Zeroed first so padding inside records stays deterministic
        let mut scratch = vec![0u8; expected.size()];
        value.write_bytes(&mut scratch);
        self.write(slot, &expected, &scratch)
    }

    fn write(&mut self, slot: Slot<'_>, expected: &TypeDescriptor, bytes: &[u8]) -> Result<()> {
        let TypedValue {
            descriptor,
            storage,
        } = &mut self.inner;
        let region = slot.locate(descriptor)?;
        check_compatible(expected, region.descriptor)?;
        let size = region.descriptor.size();
        let src = bytes.get(..size).ok_or(Error::SizeMismatch {
            expected: size,
            actual: bytes.len(),
        })?;
        storage[region.range()].copy_from_slice(src);
        log::trace!(
            "[VALUE] Wrote {} bytes at offset {} of '{}'",
            size,
            region.offset,
            descriptor.encoding()
        );
        Ok(())
    }
}

impl Deref for MutableTypedValue {
    type Target = TypedValue;

    fn deref(&self) -> &TypedValue {
        &self.inner
    }
}

impl From<TypedValue> for MutableTypedValue {
    fn from(inner: TypedValue) -> Self {
        Self { inner }
    }
}

impl From<MutableTypedValue> for TypedValue {
    fn from(value: MutableTypedValue) -> Self {
        value.freeze()
    }
}

impl PartialEq<TypedValue> for MutableTypedValue {
    fn eq(&self, other: &TypedValue) -> bool {
        self.inner == *other
    }
}

impl fmt::Debug for MutableTypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableTypedValue")
            .field("encoding", &self.encoding())
            .field("bytes", &self.as_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptor::parse("{rect=\"origin\"{point=\"x\"d\"y\"d}\"size\"{size=\"w\"d\"h\"d}}")
                .unwrap(),
        )
    }

    #[test]
    fn test_set_from_whole_value() {
        let mut value = MutableTypedValue::zeroed(Arc::new(TypeDescriptor::parse("I").unwrap()));
        value.set_from_encoding("I", &7u32.to_ne_bytes()).unwrap();
        assert_eq!(value.get::<u32>().unwrap(), 7);

        let err = value.set_from_encoding("i", &8i32.to_ne_bytes()).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(value.get::<u32>().unwrap(), 7);
    }

    #[test]
    fn test_short_source_leaves_storage() {
        let mut value = MutableTypedValue::from_scalar(0x1122_3344_5566_7788u64).unwrap();
        let before = value.as_bytes().to_vec();
        let desc = value.descriptor().clone();
        assert_eq!(
            value.set_from(&desc, &[0u8; 7]),
            Err(Error::SizeMismatch {
                expected: 8,
                actual: 7
            })
        );
        assert_eq!(value.as_bytes(), &before[..]);
    }

    #[test]
    fn test_nested_keyed_writes() {
        let mut value = MutableTypedValue::zeroed(rect());
        let mut size = value.at_key("size").unwrap().mutable_copy();
        size.set_for_key("w", 3.0f64).unwrap();
        size.set_for_key("h", 4.0f64).unwrap();
        value.set_value_for_key("size", &size).unwrap();

        assert_eq!(value.at_key("size").unwrap().get_for_key::<f64>("h").unwrap(), 4.0);
        assert_eq!(value.at_key("origin").unwrap().get_at::<f64>(0).unwrap(), 0.0);

        // A point is not a size even though both are {..=dd} shaped
        let origin = value.at_key("origin").unwrap();
        assert!(matches!(
            value.set_value_for_key("size", &origin),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_set_value_at_index() {
        let mut value = MutableTypedValue::from_scalar([0u16; 4]).unwrap();
        let item = TypedValue::from_scalar(9u16).unwrap();
        value.set_value_at(3, &item).unwrap();
        assert_eq!(value.get::<[u16; 4]>().unwrap(), [0, 0, 0, 9]);
        assert!(matches!(
            value.set_value_at(4, &item),
            Err(Error::IndexOutOfRange { index: 4, count: 4 })
        ));
    }

    #[test]
    fn test_set_for_missing_key() {
        let mut value = MutableTypedValue::zeroed(rect());
        assert!(matches!(
            value.set_for_key("depth", 1.0f64),
            Err(Error::KeyNotFound { .. })
        ));
        assert!(value.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_freeze_and_compare() {
        let mut value = MutableTypedValue::from_scalar(true).unwrap();
        value.set(false).unwrap();
        let frozen = value.clone().freeze();
        assert_eq!(value, frozen);
        assert!(!frozen.get::<bool>().unwrap());
    }
}
