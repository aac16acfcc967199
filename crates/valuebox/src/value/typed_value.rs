// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Immutable typed value container.

use crate::encode::{self, Encode};
use crate::encoding::{Region, TypeDescriptor};
use crate::error::{Error, Result};
use crate::value::MutableTypedValue;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Addressed part of a value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Slot<'k> {
    Whole,
    Index(usize),
    Key(&'k str),
}

impl Slot<'_> {
    pub(crate) fn locate<'d>(&self, descriptor: &'d Arc<TypeDescriptor>) -> Result<Region<'d>> {
        match *self {
            Slot::Whole => Ok(Region {
                offset: 0,
                descriptor,
            }),
            Slot::Index(index) => descriptor.region_at(index),
            Slot::Key(key) => descriptor.region_for_key(key),
        }
    }
}

pub(crate) fn check_compatible(expected: &TypeDescriptor, actual: &TypeDescriptor) -> Result<()> {
    if expected.is_compatible(actual) {
        Ok(())
    } else {
        Err(Error::type_mismatch(expected.encoding(), actual.encoding()))
    }
}

pub(crate) fn rejected(op: &str, err: Error) -> Error {
    log::debug!("[VALUE] {} rejected: {}", op, err);
    err
}

/// A byte buffer paired with the descriptor of its layout.
///
/// The buffer is always exactly `descriptor.size()` bytes. Every read checks
/// the caller's expected type against the stored descriptor before copying
/// anything out. Sub-values returned by [`at`](Self::at) and
/// [`at_key`](Self::at_key) are copies and never alias this value.
///
/// ```rust
/// use valuebox::TypedValue;
///
/// let mut bytes = Vec::new();
/// bytes.extend_from_slice(&1.0f32.to_ne_bytes());
/// bytes.extend_from_slice(&2.0f32.to_ne_bytes());
///
/// let point = TypedValue::from_bytes_with_encoding(&bytes, "{point=ff}").unwrap();
/// assert_eq!(point.at(1).unwrap().get::<f32>().unwrap(), 2.0);
/// assert!(point.at(2).is_err());
/// ```
#[derive(Clone)]
pub struct TypedValue {
    pub(super) descriptor: Arc<TypeDescriptor>,
    pub(super) storage: Box<[u8]>,
}

impl TypedValue {
    /// Copies the first `descriptor.size()` bytes of `bytes`.
    ///
    /// Fails with `SizeMismatch` when `bytes` is shorter than the descriptor.
    pub fn from_bytes(bytes: &[u8], descriptor: Arc<TypeDescriptor>) -> Result<Self> {
        let size = descriptor.size();
        let Some(src) = bytes.get(..size) else {
            return Err(rejected(
                "from_bytes",
                Error::SizeMismatch {
                    expected: size,
                    actual: bytes.len(),
                },
            ));
        };
        log::trace!("[VALUE] Boxed {} bytes as '{}'", size, descriptor.encoding());
        Ok(Self {
            storage: src.into(),
            descriptor,
        })
    }

    /// Parses `encoding` with the host layout, then behaves like
    /// [`from_bytes`](Self::from_bytes).
    pub fn from_bytes_with_encoding(bytes: &[u8], encoding: &str) -> Result<Self> {
        let descriptor = TypeDescriptor::parse(encoding)?;
        Self::from_bytes(bytes, Arc::new(descriptor))
    }

    /// Copies `descriptor.size()` bytes starting at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `descriptor.size()` bytes. It may be
    /// dangling or null only when that size is zero.
    pub unsafe fn from_ptr(ptr: *const u8, descriptor: Arc<TypeDescriptor>) -> Self {
        let size = descriptor.size();
        let storage: Box<[u8]> = if size == 0 {
            Box::default()
        } else {
            // SAFETY: caller guarantees `size` readable bytes at `ptr`
            unsafe { std::slice::from_raw_parts(ptr, size) }.into()
        };
        Self {
            descriptor,
            storage,
        }
    }

    /// Boxes a host value, using the descriptor of `T`.
    ///
    /// ```rust
    /// use valuebox::TypedValue;
    ///
    /// let value = TypedValue::from_scalar([1i32, 2, 3]).unwrap();
    /// assert_eq!(value.encoding(), "[3i]");
    /// assert_eq!(value.get_at::<i32>(2).unwrap(), 3);
    /// ```
    pub fn from_scalar<T: Encode>(value: T) -> Result<Self> {
        let descriptor = encode::descriptor::<T>()?;
        let mut storage = vec![0u8; descriptor.size()].into_boxed_slice();
        value.write_bytes(&mut storage);
        Ok(Self {
            descriptor,
            storage,
        })
    }

    /// A value of `descriptor` with every byte zero.
    pub fn zeroed(descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            storage: vec![0u8; descriptor.size()].into_boxed_slice(),
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Normalized encoding string of the stored type.
    pub fn encoding(&self) -> &str {
        self.descriptor.encoding()
    }

    pub fn size(&self) -> usize {
        self.storage.len()
    }

    /// Number of elements or fields (0 for scalars).
    pub fn count(&self) -> usize {
        self.descriptor.count()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.storage
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.storage.into_vec()
    }

    /// Copies the stored bytes into `out` when `expected` is compatible.
    ///
    /// Fails with `TypeMismatch` for an incompatible descriptor and with
    /// `SizeMismatch` when `out` is shorter than the value. `out` is left
    /// untouched on failure; bytes past the value's size are never written.
    pub fn get_into(&self, expected: &TypeDescriptor, out: &mut [u8]) -> Result<()> {
        self.read_into(Slot::Whole, expected, out)
            .map_err(|e| rejected("get_into", e))
    }

    /// Parses `encoding`, then behaves like [`get_into`](Self::get_into).
    pub fn get_into_encoding(&self, encoding: &str, out: &mut [u8]) -> Result<()> {
        let expected = TypeDescriptor::parse(encoding)?;
        self.get_into(&expected, out)
    }

    /// Reads the whole value as `T`.
    pub fn get<T: Encode>(&self) -> Result<T> {
        self.decode(Slot::Whole).map_err(|e| rejected("get", e))
    }

    /// Copies out the `index`th element or field.
    pub fn at(&self, index: usize) -> Result<TypedValue> {
        self.extract(Slot::Index(index)).map_err(|e| rejected("at", e))
    }

    /// Copies out the first record field named `key`.
    pub fn at_key(&self, key: &str) -> Result<TypedValue> {
        self.extract(Slot::Key(key))
            .map_err(|e| rejected("at_key", e))
    }

    /// Reads the `index`th element or field as `T` without boxing it first.
    pub fn get_at<T: Encode>(&self, index: usize) -> Result<T> {
        self.decode(Slot::Index(index))
            .map_err(|e| rejected("get_at", e))
    }

    /// Reads the field named `key` as `T` without boxing it first.
    pub fn get_for_key<T: Encode>(&self, key: &str) -> Result<T> {
        self.decode(Slot::Key(key))
            .map_err(|e| rejected("get_for_key", e))
    }

    pub fn get_into_at(
        &self,
        expected: &TypeDescriptor,
        index: usize,
        out: &mut [u8],
    ) -> Result<()> {
        self.read_into(Slot::Index(index), expected, out)
            .map_err(|e| rejected("get_into_at", e))
    }

    pub fn get_into_for_key(
        &self,
        expected: &TypeDescriptor,
        key: &str,
        out: &mut [u8],
    ) -> Result<()> {
        self.read_into(Slot::Key(key), expected, out)
            .map_err(|e| rejected("get_into_for_key", e))
    }

    /// Deep copy. Same as `clone()`.
    pub fn copy(&self) -> TypedValue {
        self.clone()
    }

    /// Deep copy into a writable handle.
    pub fn mutable_copy(&self) -> MutableTypedValue {
        MutableTypedValue::from(self.clone())
    }

    fn bytes_of(&self, region: &Region<'_>) -> &[u8] {
        // Regions come from our own descriptor, so they lie within storage
        &self.storage[region.range()]
    }

    fn read_into(&self, slot: Slot<'_>, expected: &TypeDescriptor, out: &mut [u8]) -> Result<()> {
        let region = slot.locate(&self.descriptor)?;
        check_compatible(expected, region.descriptor)?;
        let size = region.descriptor.size();
        let out_len = out.len();
        let dst = out.get_mut(..size).ok_or(Error::SizeMismatch {
            expected: size,
            actual: out_len,
        })?;
        dst.copy_from_slice(self.bytes_of(&region));
        Ok(())
    }

    fn decode<T: Encode>(&self, slot: Slot<'_>) -> Result<T> {
        let expected = encode::descriptor::<T>()?;
        let region = slot.locate(&self.descriptor)?;
        check_compatible(&expected, region.descriptor)?;
        T::read_bytes(self.bytes_of(&region)).ok_or_else(|| {
            Error::Decoding(format!(
                "bytes are not a valid {} for '{}'",
                std::any::type_name::<T>(),
                expected.encoding()
            ))
        })
    }

    fn extract(&self, slot: Slot<'_>) -> Result<TypedValue> {
        let region = slot.locate(&self.descriptor)?;
        Ok(TypedValue {
            descriptor: Arc::clone(region.descriptor),
            storage: self.bytes_of(&region).into(),
        })
    }
}

impl Default for TypedValue {
    /// The empty `v` value.
    fn default() -> Self {
        Self {
            descriptor: Arc::new(TypeDescriptor::void()),
            storage: Box::default(),
        }
    }
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.is_compatible(&other.descriptor) && self.storage == other.storage
    }
}

impl Eq for TypedValue {}

impl Hash for TypedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.descriptor.encoding().hash(state);
        self.storage.hash(state);
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedValue")
            .field("encoding", &self.encoding())
            .field("bytes", &self.as_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_bytes(x: f32, y: f32) -> Vec<u8> {
        let mut bytes = x.to_ne_bytes().to_vec();
        bytes.extend_from_slice(&y.to_ne_bytes());
        bytes
    }

    #[test]
    fn test_from_bytes_size_check() {
        let desc = Arc::new(TypeDescriptor::parse("q").unwrap());
        let err = TypedValue::from_bytes(&[0u8; 4], desc.clone()).unwrap_err();
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 8,
                actual: 4
            }
        );

        // Longer input is truncated to the descriptor size
        let value = TypedValue::from_bytes(&[7u8; 12], desc).unwrap();
        assert_eq!(value.size(), 8);
        assert_eq!(value.as_bytes(), &[7u8; 8]);
    }

    #[test]
    fn test_get_into_never_writes_on_failure() {
        let value =
            TypedValue::from_bytes_with_encoding(&point_bytes(1.0, 2.0), "{point=ff}").unwrap();
        let wrong = TypeDescriptor::parse("[2f]").unwrap();
        let mut out = [0xAAu8; 8];
        assert!(matches!(
            value.get_into(&wrong, &mut out),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(out, [0xAA; 8]);

        let mut short = [0xAAu8; 7];
        assert!(matches!(
            value.get_into_encoding("{point=ff}", &mut short),
            Err(Error::SizeMismatch {
                expected: 8,
                actual: 7
            })
        ));
        assert_eq!(short, [0xAA; 7]);

        let mut long = [0xAAu8; 10];
        value.get_into(value.descriptor(), &mut long).unwrap();
        assert_eq!(&long[..8], value.as_bytes());
        assert_eq!(&long[8..], &[0xAA, 0xAA]);
    }

    #[test]
    fn test_at_copies_subvalue() {
        let value =
            TypedValue::from_bytes_with_encoding(&point_bytes(1.0, 2.0), "{point=ff}").unwrap();
        let y = value.at(1).unwrap();
        assert_eq!(y.encoding(), "f");
        assert_eq!(y.get::<f32>().unwrap(), 2.0);
        assert!(matches!(
            value.at(2),
            Err(Error::IndexOutOfRange { index: 2, count: 2 })
        ));
        assert!(matches!(value.at_key("x"), Err(Error::KeyNotFound { .. })));
    }

    #[test]
    fn test_typed_get_checks_type() {
        let value = TypedValue::from_scalar(42u32).unwrap();
        assert_eq!(value.get::<u32>().unwrap(), 42);
        assert!(matches!(
            value.get::<i32>(),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            value.get::<f32>(),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_bool_bytes() {
        let value = TypedValue::from_bytes_with_encoding(&[3], "B").unwrap();
        assert!(matches!(value.get::<bool>(), Err(Error::Decoding(_))));
    }

    #[test]
    fn test_from_ptr() {
        let source = [1u8, 2, 3, 4];
        let desc = Arc::new(TypeDescriptor::parse("[4C]").unwrap());
        // SAFETY: `source` holds 4 readable bytes
        let value = unsafe { TypedValue::from_ptr(source.as_ptr(), desc) };
        assert_eq!(value.get::<[u8; 4]>().unwrap(), source);

        // SAFETY: zero-sized read
        let empty =
            unsafe { TypedValue::from_ptr(std::ptr::null(), Arc::new(TypeDescriptor::void())) };
        assert_eq!(empty, TypedValue::default());
    }

    #[test]
    fn test_default_is_void() {
        let value = TypedValue::default();
        assert_eq!(value.encoding(), "v");
        assert_eq!(value.size(), 0);
        assert_eq!(value.count(), 0);
        assert_eq!(value.get::<()>(), Ok(()));
    }

    #[test]
    fn test_equality_requires_same_encoding() {
        let bytes = [1u8, 0, 0, 0, 2, 0, 0, 0];
        let array = TypedValue::from_bytes_with_encoding(&bytes, "[2i]").unwrap();
        let record = TypedValue::from_bytes_with_encoding(&bytes, "{?=ii}").unwrap();
        assert_ne!(array, record);
        assert_eq!(array, array.copy());
        assert_eq!(array.clone().into_bytes(), bytes.to_vec());
    }

    #[test]
    fn test_zeroed() {
        let desc = Arc::new(TypeDescriptor::parse("{pair=\"a\"d\"b\"c}").unwrap());
        let value = TypedValue::zeroed(desc);
        assert_eq!(value.size(), 16);
        assert!(value.as_bytes().iter().all(|b| *b == 0));
        assert_eq!(value.get_for_key::<f64>("a").unwrap(), 0.0);
        assert_eq!(value.get_for_key::<i8>("b").unwrap(), 0);
    }
}
