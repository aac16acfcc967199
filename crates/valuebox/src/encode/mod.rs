// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host type bridge
//!
//! [`Encode`] ties a Rust type to its canonical encoding string and converts
//! values to and from their raw native-endian bytes without `unsafe`.
//! Implementations exist for the primitive integers and floats, `bool`,
//! raw pointers to encodable types, fixed-size arrays and `()` (`v`).
//! Records are declared with [`encode_record!`](crate::encode_record).
//!
//! # Example
//!
//! ```rust
//! use valuebox::{encode, encode_record, Encode};
//!
//! encode_record! {
//!     #[derive(Debug, PartialEq)]
//!     pub struct Sample {
//!         pub id: u16,
//!         pub value: f64,
//!     }
//! }
//!
//! assert_eq!(Sample::encoding(), "{Sample=\"id\"S\"value\"d}");
//! let desc = encode::descriptor::<Sample>().unwrap();
//! assert_eq!(desc.size(), std::mem::size_of::<Sample>());
//! ```

mod cache;

pub use cache::{CacheStats, DescriptorCache};

use crate::encoding::TypeDescriptor;
use crate::error::Result;
use std::borrow::Cow;
use std::mem::size_of;
use std::sync::Arc;

/// A Rust type with a fixed encoding and a safe byte representation.
///
/// The encoding must describe a layout of exactly `size_of::<Self>()` bytes
/// on the host. `write_bytes` receives a zeroed slice of that length and
/// `read_bytes` a slice of at least that length.
pub trait Encode: Sized + 'static {
    /// Canonical (normalized) encoding string.
    fn encoding() -> Cow<'static, str>;

    /// Writes the native-endian representation of `self` into `out`.
    fn write_bytes(&self, out: &mut [u8]);

    /// Reads a value back, or `None` when the bytes are not a valid `Self`.
    fn read_bytes(bytes: &[u8]) -> Option<Self>;
}

/// Returns the shared descriptor for `T`, parsing its encoding on first use.
///
/// Fails with `MalformedEncoding` when `T::encoding()` does not parse and
/// with `SizeMismatch` when the parsed size differs from `size_of::<T>()`.
pub fn descriptor<T: Encode>() -> Result<Arc<TypeDescriptor>> {
    DescriptorCache::global().get_or_insert::<T>()
}

macro_rules! impl_encode_ne {
    ($($type:ty => $code:literal),* $(,)?) => {
        $(
            impl Encode for $type {
                fn encoding() -> Cow<'static, str> {
                    Cow::Borrowed($code)
                }

                fn write_bytes(&self, out: &mut [u8]) {
                    if let Some(dst) = out.get_mut(..size_of::<$type>()) {
                        dst.copy_from_slice(&self.to_ne_bytes());
                    }
                }

                fn read_bytes(bytes: &[u8]) -> Option<Self> {
                    let raw = bytes.get(..size_of::<$type>())?.try_into().ok()?;
                    Some(<$type>::from_ne_bytes(raw))
                }
            }
        )*
    };
}

impl_encode_ne!(
    i8 => "c",
    u8 => "C",
    i16 => "s",
    u16 => "S",
    i32 => "i",
    u32 => "I",
    i64 => "q",
    u64 => "Q",
    i128 => "t",
    u128 => "T",
    f32 => "f",
    f64 => "d",
);

#[cfg(target_pointer_width = "64")]
impl_encode_ne!(isize => "q", usize => "Q");
#[cfg(target_pointer_width = "32")]
impl_encode_ne!(isize => "l", usize => "L");

impl Encode for bool {
    fn encoding() -> Cow<'static, str> {
        Cow::Borrowed("B")
    }

    fn write_bytes(&self, out: &mut [u8]) {
        if let Some(dst) = out.first_mut() {
            *dst = u8::from(*self);
        }
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes.first()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

impl Encode for () {
    fn encoding() -> Cow<'static, str> {
        Cow::Borrowed("v")
    }

    fn write_bytes(&self, _out: &mut [u8]) {}

    fn read_bytes(_bytes: &[u8]) -> Option<Self> {
        Some(())
    }
}

impl<T: Encode> Encode for *const T {
    fn encoding() -> Cow<'static, str> {
        Cow::Owned(format!("^{}", T::encoding()))
    }

    fn write_bytes(&self, out: &mut [u8]) {
        (*self as usize).write_bytes(out);
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        usize::read_bytes(bytes).map(|addr| addr as *const T)
    }
}

impl<T: Encode> Encode for *mut T {
    fn encoding() -> Cow<'static, str> {
        <*const T>::encoding()
    }

    fn write_bytes(&self, out: &mut [u8]) {
        self.cast_const().write_bytes(out);
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        <*const T>::read_bytes(bytes).map(<*const T>::cast_mut)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encoding() -> Cow<'static, str> {
        Cow::Owned(format!("[{}{}]", N, T::encoding()))
    }

    fn write_bytes(&self, out: &mut [u8]) {
        let stride = size_of::<T>();
        if stride == 0 {
            return;
        }
        for (item, slot) in self.iter().zip(out.chunks_exact_mut(stride)) {
            item.write_bytes(slot);
        }
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        let stride = size_of::<T>();
        if stride == 0 || bytes.len() < stride * N {
            return None;
        }
        let items = bytes
            .chunks_exact(stride)
            .take(N)
            .map(T::read_bytes)
            .collect::<Option<Vec<T>>>()?;
        items.try_into().ok()
    }
}

/// Declares a `#[repr(C)]` struct and implements [`Encode`] for it.
///
/// The encoding is `{Name="field"type...}` in declaration order, so the
/// record layout computed from it matches the compiler's `repr(C)` layout.
/// Every field type must itself implement [`Encode`]. `Clone` and `Copy` are
/// derived by the macro.
///
/// ```rust
/// use valuebox::{encode_record, TypedValue};
///
/// encode_record! {
///     pub struct Point {
///         pub x: f32,
///         pub y: f32,
///     }
/// }
///
/// let value = TypedValue::from_scalar(Point { x: 1.0, y: 2.0 }).unwrap();
/// assert_eq!(value.encoding(), "{Point=\"x\"f\"y\"f}");
/// assert_eq!(value.get_for_key::<f32>("y").unwrap(), 2.0);
/// ```
#[macro_export]
macro_rules! encode_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Clone, Copy)]
        $vis struct $name {
            $($(#[$fmeta])* $fvis $field: $fty,)*
        }

        impl $crate::Encode for $name {
            fn encoding() -> ::std::borrow::Cow<'static, str> {
                let mut encoding = ::std::string::String::from("{");
                encoding.push_str(stringify!($name));
                encoding.push('=');
                $(
                    encoding.push('"');
                    encoding.push_str(stringify!($field));
                    encoding.push('"');
                    encoding.push_str(&<$fty as $crate::Encode>::encoding());
                )*
                encoding.push('}');
                ::std::borrow::Cow::Owned(encoding)
            }

            fn write_bytes(&self, out: &mut [u8]) {
                $(
                    let offset = ::core::mem::offset_of!($name, $field);
                    let end = offset + ::core::mem::size_of::<$fty>();
                    if let Some(slot) = out.get_mut(offset..end) {
                        <$fty as $crate::Encode>::write_bytes(&self.$field, slot);
                    }
                )*
            }

            fn read_bytes(bytes: &[u8]) -> ::core::option::Option<Self> {
                ::core::option::Option::Some(Self {
                    $(
                        $field: {
                            let offset = ::core::mem::offset_of!($name, $field);
                            let end = offset + ::core::mem::size_of::<$fty>();
                            <$fty as $crate::Encode>::read_bytes(bytes.get(offset..end)?)?
                        },
                    )*
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::encode_record! {
        #[derive(Debug, PartialEq)]
        struct Padded {
            tag: u8,
            value: f64,
            flags: [u16; 3],
        }
    }

    crate::encode_record! {
        #[derive(Debug, PartialEq)]
        struct Outer {
            inner: Padded,
            enabled: bool,
        }
    }

    fn roundtrip<T: Encode>(value: &T) -> Option<T> {
        let mut buf = vec![0u8; size_of::<T>()];
        value.write_bytes(&mut buf);
        T::read_bytes(&buf)
    }

    #[test]
    fn test_primitive_encodings() {
        assert_eq!(i8::encoding(), "c");
        assert_eq!(u32::encoding(), "I");
        assert_eq!(u128::encoding(), "T");
        assert_eq!(f64::encoding(), "d");
        assert_eq!(bool::encoding(), "B");
        assert_eq!(<()>::encoding(), "v");
        assert_eq!(<[i32; 3]>::encoding(), "[3i]");
        assert_eq!(<[[u8; 2]; 4]>::encoding(), "[4[2C]]");
        assert_eq!(<*const f32>::encoding(), "^f");
        assert_eq!(<*mut ()>::encoding(), "^v");
    }

    #[test]
    fn test_native_bytes() {
        let mut buf = [0u8; 4];
        0x0102_0304u32.write_bytes(&mut buf);
        assert_eq!(buf, 0x0102_0304u32.to_ne_bytes());
        assert_eq!(u32::read_bytes(&buf), Some(0x0102_0304));
        assert_eq!(u32::read_bytes(&buf[..3]), None);
        assert_eq!(roundtrip(&-2.5f32), Some(-2.5));
    }

    #[test]
    fn test_bool_rejects_other_bytes() {
        assert_eq!(bool::read_bytes(&[1]), Some(true));
        assert_eq!(bool::read_bytes(&[0]), Some(false));
        assert_eq!(bool::read_bytes(&[2]), None);
        assert_eq!(bool::read_bytes(&[]), None);
    }

    #[test]
    fn test_pointer_address_preserved() {
        let target = 7i32;
        let ptr: *const i32 = &target;
        assert_eq!(roundtrip(&ptr), Some(ptr));
    }

    #[test]
    fn test_record_matches_repr_c() {
        assert_eq!(Padded::encoding(), "{Padded=\"tag\"C\"value\"d\"flags\"[3S]}");

        let desc = descriptor::<Padded>().unwrap();
        assert_eq!(desc.size(), size_of::<Padded>());
        assert_eq!(desc.alignment(), std::mem::align_of::<Padded>());
        assert_eq!(
            desc.field("value").map(|f| f.offset),
            Some(std::mem::offset_of!(Padded, value))
        );
        assert_eq!(
            desc.field("flags").map(|f| f.offset),
            Some(std::mem::offset_of!(Padded, flags))
        );

        let outer = descriptor::<Outer>().unwrap();
        assert_eq!(outer.size(), size_of::<Outer>());
    }

    #[test]
    fn test_record_roundtrip_and_padding() {
        let value = Padded {
            tag: 9,
            value: 1.5,
            flags: [1, 2, 3],
        };
        let mut buf = vec![0u8; size_of::<Padded>()];
        value.write_bytes(&mut buf);
        // Padding between `tag` and `value` stays zero
        assert!(buf[1..8].iter().all(|b| *b == 0));
        assert_eq!(Padded::read_bytes(&buf), Some(value));

        let outer = Outer {
            inner: value,
            enabled: true,
        };
        assert_eq!(roundtrip(&outer), Some(outer));
    }

    #[test]
    fn test_invalid_nested_bool() {
        let mut buf = vec![0u8; size_of::<Outer>()];
        Outer {
            inner: Padded {
                tag: 0,
                value: 0.0,
                flags: [0; 3],
            },
            enabled: false,
        }
        .write_bytes(&mut buf);
        buf[std::mem::offset_of!(Outer, enabled)] = 5;
        assert_eq!(Outer::read_bytes(&buf), None);
    }

    #[test]
    fn test_zero_length_array_has_no_descriptor() {
        assert!(descriptor::<[u8; 0]>().is_err());
    }
}
