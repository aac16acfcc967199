// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive type codes.

use crate::config::LayoutConfig;
use crate::encoding::TypeDescriptor;
use std::sync::Arc;

/// Scalar (leaf) kinds of the encoding grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `c`
    Char,
    /// `C`
    UChar,
    /// `s`
    Short,
    /// `S`
    UShort,
    /// `i`
    Int,
    /// `I`
    UInt,
    /// `l` (always 32-bit in this encoding)
    Long,
    /// `L`
    ULong,
    /// `q`
    LongLong,
    /// `Q`
    ULongLong,
    /// `t`
    Int128,
    /// `T`
    UInt128,
    /// `f`
    Float,
    /// `d`
    Double,
    /// `D`
    LongDouble,
    /// `B`
    Bool,
    /// `v`
    Void,
    /// `*`
    CString,
    /// `#`
    Class,
    /// `:`
    Selector,
    /// `@` or `@"ClassName"`
    Object { class: Option<String> },
    /// `@?`
    Block,
    /// `^type`
    Pointer(Pointee),
}

/// Target of a pointer scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pointee {
    /// `^?` (function pointer or unknown target)
    Unknown,
    /// `^{name}` (record whose body is not spelled out)
    Opaque(String),
    /// Any complete type, including `v`.
    Type(Arc<TypeDescriptor>),
}

impl ScalarKind {
    /// Maps a single-character code to its scalar kind.
    ///
    /// `@` and `^` take trailing syntax and are handled by the parser.
    pub fn from_code(code: u8) -> Option<Self> {
        let kind = match code {
            b'c' => Self::Char,
            b'C' => Self::UChar,
            b's' => Self::Short,
            b'S' => Self::UShort,
            b'i' => Self::Int,
            b'I' => Self::UInt,
            b'l' => Self::Long,
            b'L' => Self::ULong,
            b'q' => Self::LongLong,
            b'Q' => Self::ULongLong,
            b't' => Self::Int128,
            b'T' => Self::UInt128,
            b'f' => Self::Float,
            b'd' => Self::Double,
            b'D' => Self::LongDouble,
            b'B' => Self::Bool,
            b'v' => Self::Void,
            b'*' => Self::CString,
            b'#' => Self::Class,
            b':' => Self::Selector,
            _ => return None,
        };
        Some(kind)
    }

    /// Leading code character.
    pub fn code(&self) -> char {
        match self {
            Self::Char => 'c',
            Self::UChar => 'C',
            Self::Short => 's',
            Self::UShort => 'S',
            Self::Int => 'i',
            Self::UInt => 'I',
            Self::Long => 'l',
            Self::ULong => 'L',
            Self::LongLong => 'q',
            Self::ULongLong => 'Q',
            Self::Int128 => 't',
            Self::UInt128 => 'T',
            Self::Float => 'f',
            Self::Double => 'd',
            Self::LongDouble => 'D',
            Self::Bool => 'B',
            Self::Void => 'v',
            Self::CString => '*',
            Self::Class => '#',
            Self::Selector => ':',
            Self::Object { .. } | Self::Block => '@',
            Self::Pointer(_) => '^',
        }
    }

    /// True for kinds whose size is the target pointer width.
    pub fn is_pointer_like(&self) -> bool {
        matches!(
            self,
            Self::CString
                | Self::Class
                | Self::Selector
                | Self::Object { .. }
                | Self::Block
                | Self::Pointer(_)
        )
    }

    /// Size in bytes under `config`.
    pub fn size(&self, config: &LayoutConfig) -> usize {
        match self {
            Self::Void => 0,
            Self::Char | Self::UChar | Self::Bool => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Long | Self::ULong | Self::Float => 4,
            Self::LongLong | Self::ULongLong | Self::Double => 8,
            Self::Int128 | Self::UInt128 => 16,
            Self::LongDouble => config.long_double_size,
            _ => config.pointer_size,
        }
    }

    /// Alignment in bytes under `config`.
    pub fn alignment(&self, config: &LayoutConfig) -> usize {
        match self {
            Self::LongDouble => config.long_double_align,
            kind if kind.is_pointer_like() => config.pointer_align,
            // Scalars other than `D` and pointers are naturally aligned
            kind => kind.size(config).max(1),
        }
    }

    /// Appends the normalized encoding of this scalar to `out`.
    pub(crate) fn render(&self, out: &mut String) {
        out.push(self.code());
        match self {
            Self::Object { class: Some(class) } => {
                out.push('"');
                out.push_str(class);
                out.push('"');
            }
            Self::Block => out.push('?'),
            Self::Pointer(Pointee::Unknown) => out.push('?'),
            Self::Pointer(Pointee::Opaque(name)) => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
            Self::Pointer(Pointee::Type(target)) => out.push_str(target.encoding()),
            _ => {}
        }
    }
}
