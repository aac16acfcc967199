// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: parsed, structural form of an encoding string.

use crate::config::LayoutConfig;
use crate::encoding::parser::Parser;
use crate::encoding::{Pointee, ScalarKind};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Shape variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Leaf primitive.
    Scalar(ScalarKind),
    /// Fixed length, homogeneous.
    Array(ArrayDescriptor),
    /// Heterogeneous, optionally named fields laid out with C rules.
    Record(RecordDescriptor),
}

/// A complete type descriptor.
///
/// Size, alignment and the normalized encoding string are computed once at
/// construction. Descriptors are immutable and meant to be shared behind an
/// [`Arc`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    kind: TypeKind,
    size: usize,
    alignment: usize,
    encoding: String,
}

/// Array type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayDescriptor {
    /// Element type.
    pub element: Arc<TypeDescriptor>,
    /// Fixed length (never zero).
    pub count: usize,
}

/// Record type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordDescriptor {
    /// Record tag (`None` when anonymous).
    pub name: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

/// Field of a record, with its computed offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Field name, when the encoding carries one.
    pub name: Option<String>,
    /// Field type.
    pub type_desc: Arc<TypeDescriptor>,
    /// Byte offset within the record.
    pub offset: usize,
}

impl FieldDescriptor {
    /// Returns the end offset of this field (offset + size).
    pub fn end_offset(&self) -> usize {
        self.offset + self.type_desc.size()
    }
}

/// Byte range of a sub-value inside its parent's storage.
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    /// Offset from the start of the parent value.
    pub offset: usize,
    /// Descriptor of the sub-value.
    pub descriptor: &'a Arc<TypeDescriptor>,
}

impl Region<'_> {
    /// Byte range within the parent's storage.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.descriptor.size()
    }
}

/// Rounds `offset` up to the next multiple of `align` (a power of two).
/// Largest size a descriptor may have (`isize::MAX`, the allocation limit).
pub const MAX_SIZE: usize = isize::MAX as usize;

pub(crate) fn align_up(offset: usize, align: usize) -> Option<usize> {
    let mask = align.checked_sub(1)?;
    offset.checked_add(mask).map(|v| v & !mask)
}

// Names end at these characters in the grammar, so they cannot appear inside one.
fn check_name(encoding: &str, name: &str, forbidden: &[char]) -> Result<()> {
    match name.find(|c| forbidden.contains(&c)) {
        Some(position) => Err(Error::malformed(
            encoding,
            position,
            format!("name '{}' contains a reserved character", name),
        )),
        None => Ok(()),
    }
}

impl TypeDescriptor {
    /// Parses an encoding string using the host layout.
    ///
    /// ```rust
    /// use valuebox::TypeDescriptor;
    ///
    /// let point = TypeDescriptor::parse("{point=ff}").unwrap();
    /// assert_eq!(point.size(), 8);
    /// assert_eq!(point.alignment(), 4);
    /// assert!(TypeDescriptor::parse("{unbalanced").is_err());
    /// ```
    pub fn parse(encoding: &str) -> Result<Self> {
        Self::parse_with(encoding, &LayoutConfig::host())
    }

    /// Parses an encoding string using an explicit layout configuration.
    pub fn parse_with(encoding: &str, config: &LayoutConfig) -> Result<Self> {
        config.validate()?;
        match Parser::new(encoding, config).parse() {
            Ok(desc) => {
                log::trace!(
                    "[ENCODING] [OK] Parsed '{}' -> '{}' (size={}, align={})",
                    encoding,
                    desc.encoding,
                    desc.size,
                    desc.alignment
                );
                Ok(desc)
            }
            Err(e) => {
                log::debug!("[ENCODING] Rejected '{}': {}", encoding, e);
                Err(e)
            }
        }
    }

    /// Creates a scalar descriptor with the host layout.
    pub fn scalar(kind: ScalarKind) -> Result<Self> {
        Self::scalar_with(kind, &LayoutConfig::host())
    }

    /// Creates a scalar descriptor with an explicit layout configuration.
    pub fn scalar_with(kind: ScalarKind, config: &LayoutConfig) -> Result<Self> {
        let mut encoding = String::new();
        kind.render(&mut encoding);
        match &kind {
            ScalarKind::Object { class: Some(class) } => check_name(&encoding, class, &['"'])?,
            ScalarKind::Pointer(Pointee::Opaque(name)) => {
                check_name(&encoding, name, &['=', '{', '}', '"'])?;
            }
            _ => {}
        }
        Ok(Self {
            size: kind.size(config),
            alignment: kind.alignment(config),
            kind: TypeKind::Scalar(kind),
            encoding,
        })
    }

    /// The `v` descriptor: size 0, alignment 1.
    pub fn void() -> Self {
        Self {
            kind: TypeKind::Scalar(ScalarKind::Void),
            size: 0,
            alignment: 1,
            encoding: "v".to_string(),
        }
    }

    /// Creates an array descriptor of `count` elements.
    ///
    /// Fails with `MalformedEncoding` for zero-length arrays, arrays of `v`
    /// and sizes above [`MAX_SIZE`].
    pub fn array(element: Arc<TypeDescriptor>, count: usize) -> Result<Self> {
        let encoding = format!("[{}{}]", count, element.encoding);
        if count == 0 {
            return Err(Error::malformed(&encoding, 1, "zero-length array"));
        }
        if element.is_void() {
            return Err(Error::malformed(&encoding, 1, "array of void"));
        }
        let size = element
            .size
            .checked_mul(count)
            .filter(|size| *size <= MAX_SIZE)
            .ok_or_else(|| Error::malformed(&encoding, 1, "size exceeds isize::MAX"))?;
        Ok(Self {
            alignment: element.alignment,
            size,
            kind: TypeKind::Array(ArrayDescriptor { element, count }),
            encoding,
        })
    }

    /// Creates a record descriptor, computing C-style field offsets.
    ///
    /// Each field starts at the previous field's end rounded up to the
    /// field's alignment. The record's alignment is the largest field
    /// alignment (1 when empty) and its size is the end of the last field
    /// rounded up to that alignment.
    pub fn record(
        name: Option<String>,
        fields: Vec<(Option<String>, Arc<TypeDescriptor>)>,
    ) -> Result<Self> {
        // "" and "?" both spell an anonymous record
        let name = name.filter(|n| !n.is_empty() && n != "?");
        let fields: Vec<_> = fields
            .into_iter()
            .map(|(field_name, ty)| (field_name.filter(|n| !n.is_empty()), ty))
            .collect();

        let mut encoding = String::from("{");
        encoding.push_str(name.as_deref().unwrap_or("?"));
        encoding.push('=');
        for (field_name, ty) in &fields {
            if let Some(field_name) = field_name {
                encoding.push('"');
                encoding.push_str(field_name);
                encoding.push('"');
            }
            encoding.push_str(&ty.encoding);
        }
        encoding.push('}');

        if let Some(name) = &name {
            check_name(&encoding, name, &['=', '{', '}', '"'])?;
        }
        // `@"Class"` directly followed by a type reads back as a field name
        for pair in fields.windows(2) {
            if pair[0].1.encoding.ends_with('"') && pair[1].0.is_none() {
                return Err(Error::malformed(
                    &encoding,
                    0,
                    "class name followed by an unnamed field is ambiguous",
                ));
            }
        }

        let mut laid_out = Vec::with_capacity(fields.len());
        let mut offset = 0usize;
        let mut alignment = 1usize;
        for (field_name, ty) in fields {
            if let Some(field_name) = &field_name {
                check_name(&encoding, field_name, &['"'])?;
            }
            if ty.is_void() {
                return Err(Error::malformed(&encoding, 0, "record field of type void"));
            }
            let overflow = || Error::malformed(&encoding, 0, "size exceeds isize::MAX");
            offset = align_up(offset, ty.alignment).ok_or_else(overflow)?;
            let next = offset.checked_add(ty.size).ok_or_else(overflow)?;
            alignment = alignment.max(ty.alignment);
            laid_out.push(FieldDescriptor {
                name: field_name,
                type_desc: ty,
                offset,
            });
            offset = next;
        }
        let size = align_up(offset, alignment)
            .filter(|size| *size <= MAX_SIZE)
            .ok_or_else(|| Error::malformed(&encoding, 0, "size exceeds isize::MAX"))?;

        Ok(Self {
            kind: TypeKind::Record(RecordDescriptor {
                name,
                fields: laid_out,
            }),
            size,
            alignment,
            encoding,
        })
    }

    /// Shape of this descriptor.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Total size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alignment requirement in bytes.
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Normalized encoding string.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Renders the normalized encoding string.
    ///
    /// Parsing the result yields an identical descriptor.
    pub fn to_encoding_string(&self) -> String {
        self.encoding.clone()
    }

    /// True for scalar descriptors (including pointers and `v`).
    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar(_))
    }

    /// True for fixed-size arrays.
    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_))
    }

    /// True for records.
    pub fn is_record(&self) -> bool {
        matches!(self.kind, TypeKind::Record(_))
    }

    fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar(ScalarKind::Void))
    }

    /// Scalar kind, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&ScalarKind> {
        match &self.kind {
            TypeKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    /// Array descriptor, if this is an array.
    pub fn as_array(&self) -> Option<&ArrayDescriptor> {
        match &self.kind {
            TypeKind::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Record descriptor, if this is a record.
    pub fn as_record(&self) -> Option<&RecordDescriptor> {
        match &self.kind {
            TypeKind::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Get fields if this is a record.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        self.as_record().map(|r| r.fields.as_slice())
    }

    /// Get the first field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
    }

    /// Get the index of the first field with the given name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?
            .iter()
            .position(|f| f.name.as_deref() == Some(name))
    }

    /// Number of addressable sub-values: array length, record field count,
    /// or 0 for scalars.
    pub fn count(&self) -> usize {
        match &self.kind {
            TypeKind::Scalar(_) => 0,
            TypeKind::Array(array) => array.count,
            TypeKind::Record(record) => record.fields.len(),
        }
    }

    /// Compatibility used by every typed access.
    ///
    /// Two descriptors are compatible when their normalized encodings are
    /// identical. Distinct encodings that happen to share a layout (`[2i]`
    /// and `{?=ii}`) are not compatible. Sizes are compared as well, which
    /// only matters for descriptors parsed under different layout configs.
    pub fn is_compatible(&self, other: &TypeDescriptor) -> bool {
        self.encoding == other.encoding && self.size == other.size
    }

    /// Locates the `index`th sub-value (array element or record field).
    pub fn region_at(&self, index: usize) -> Result<Region<'_>> {
        match &self.kind {
            TypeKind::Array(array) if index < array.count => Ok(Region {
                offset: index * array.element.size,
                descriptor: &array.element,
            }),
            TypeKind::Record(record) if index < record.fields.len() => {
                let field = &record.fields[index];
                Ok(Region {
                    offset: field.offset,
                    descriptor: &field.type_desc,
                })
            }
            _ => Err(Error::IndexOutOfRange {
                index,
                count: self.count(),
            }),
        }
    }

    /// Locates the first record field named `key`.
    ///
    /// Duplicate names are not an error: the first match in declaration
    /// order wins.
    pub fn region_for_key(&self, key: &str) -> Result<Region<'_>> {
        self.field(key)
            .map(|field| Region {
                offset: field.offset,
                descriptor: &field.type_desc,
            })
            .ok_or_else(|| Error::KeyNotFound {
                key: key.to_string(),
            })
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoding)
    }
}

impl FromStr for TypeDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
