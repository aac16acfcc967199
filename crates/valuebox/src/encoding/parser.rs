// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive-descent parser for type-encoding strings.
//!
//! # Grammar
//!
//! ```text
//! type       := qualifier* (scalar | object | pointer | array | record)
//! qualifier  := 'r' | 'n' | 'N' | 'o' | 'O' | 'R' | 'V'
//! scalar     := 'c' | 'C' | 's' | 'S' | 'i' | 'I' | 'l' | 'L' | 'q' | 'Q'
//!             | 't' | 'T' | 'f' | 'd' | 'D' | 'B' | 'v' | '*' | '#' | ':'
//! object     := '@' ( '?' | '"' class '"' )?
//! pointer    := '^' ( '?' | '{' name '}' | type )
//! array      := '[' count type ']'
//! record     := '{' name? '=' ( ( '"' name '"' )? type )* '}'
//! ```
//!
//! Single pass, O(length). Qualifiers are accepted and dropped from the
//! normalized form.

use crate::config::LayoutConfig;
use crate::encoding::{Pointee, ScalarKind, TypeDescriptor};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Method-signature qualifiers (const, in, inout, out, bycopy, byref, oneway).
const QUALIFIERS: &[u8] = b"rnNoORV";

pub(crate) struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    config: &'a LayoutConfig,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str, config: &'a LayoutConfig) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            depth: 0,
            config,
        }
    }

    /// Parses the whole input as exactly one type.
    pub(crate) fn parse(mut self) -> Result<TypeDescriptor> {
        if self.bytes.is_empty() {
            return Err(self.error("empty encoding"));
        }
        let desc = self.parse_type()?;
        if self.pos != self.bytes.len() {
            return Err(self.error("trailing characters after type"));
        }
        Ok(desc)
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::malformed(self.input, self.pos, reason)
    }

    /// Re-anchors a constructor error on the input string.
    fn relocate(&self, start: usize, err: Error) -> Error {
        match err {
            Error::MalformedEncoding { reason, .. } => Error::malformed(self.input, start, reason),
            other => other,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn find_from(&self, from: usize, needle: u8) -> Option<usize> {
        self.bytes
            .get(from..)?
            .iter()
            .position(|&b| b == needle)
            .map(|i| from + i)
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.config.max_depth {
            return Err(self.error(format!(
                "nesting deeper than {} levels",
                self.config.max_depth
            )));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor> {
        while self.peek().is_some_and(|b| QUALIFIERS.contains(&b)) {
            self.pos += 1;
        }

        let code = self
            .peek()
            .ok_or_else(|| self.error("unexpected end of encoding"))?;
        match code {
            b'[' => self.nested(Self::parse_array),
            b'{' => self.nested(Self::parse_record),
            b'^' => self.nested(Self::parse_pointer),
            b'@' => self.parse_object(),
            _ => {
                let kind = ScalarKind::from_code(code).ok_or_else(|| {
                    let shown = self.input[self.pos..].chars().next().unwrap_or('?');
                    self.error(format!("unknown type code '{}'", shown))
                })?;
                self.pos += 1;
                TypeDescriptor::scalar_with(kind, self.config)
            }
        }
    }

    fn parse_array(&mut self) -> Result<TypeDescriptor> {
        let start = self.pos;
        self.pos += 1; // '['

        let digits_start = self.pos;
        let mut count: usize = 0;
        while let Some(digit) = self.peek().filter(u8::is_ascii_digit) {
            count = count
                .checked_mul(10)
                .and_then(|c| c.checked_add(usize::from(digit - b'0')))
                .ok_or_else(|| self.error("array count overflows"))?;
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(self.error("array count must be numeric"));
        }
        if count == 0 {
            return Err(Error::malformed(self.input, digits_start, "zero-length array"));
        }

        let element = self.parse_type()?;
        match self.peek() {
            Some(b']') => self.pos += 1,
            Some(_) => return Err(self.error("expected ']' after array element type")),
            None => return Err(self.error("unterminated array")),
        }

        TypeDescriptor::array(Arc::new(element), count).map_err(|e| self.relocate(start, e))
    }

    fn parse_record(&mut self) -> Result<TypeDescriptor> {
        let start = self.pos;
        self.pos += 1; // '{'

        let name_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated record")),
                Some(b'=') => break,
                Some(b'}') => return Err(self.error("record without body used by value")),
                Some(b'{') | Some(b'"') => {
                    return Err(self.error("unexpected character in record name"))
                }
                Some(_) => self.pos += 1,
            }
        }
        let name = &self.input[name_start..self.pos];
        self.pos += 1; // '='

        let mut fields = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated record")),
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(b'"') => {
                    let field_name = self.parse_quoted("unterminated field name")?;
                    if matches!(self.peek(), None | Some(b'}')) {
                        return Err(self.error("field name without type"));
                    }
                    let ty = self.parse_type()?;
                    fields.push((Some(field_name.to_string()), Arc::new(ty)));
                }
                Some(_) => {
                    let ty = self.parse_type()?;
                    fields.push((None, Arc::new(ty)));
                }
            }
        }

        TypeDescriptor::record(Some(name.to_string()), fields).map_err(|e| self.relocate(start, e))
    }

    fn parse_pointer(&mut self) -> Result<TypeDescriptor> {
        let start = self.pos;
        self.pos += 1; // '^'

        let pointee = match self.peek() {
            None => return Err(self.error("pointer without target type")),
            Some(b'?') => {
                self.pos += 1;
                Pointee::Unknown
            }
            Some(b'{') if self.is_opaque_record() => {
                let close = self
                    .find_from(self.pos, b'}')
                    .ok_or_else(|| self.error("unterminated record"))?;
                let name = &self.input[self.pos + 1..close];
                if name.is_empty() {
                    return Err(self.error("opaque record without name"));
                }
                self.pos = close + 1;
                Pointee::Opaque(name.to_string())
            }
            Some(_) => Pointee::Type(Arc::new(self.parse_type()?)),
        };

        TypeDescriptor::scalar_with(ScalarKind::Pointer(pointee), self.config)
            .map_err(|e| self.relocate(start, e))
    }

    /// True when the record at `pos` closes before any '=' (`{name}`).
    fn is_opaque_record(&self) -> bool {
        self.bytes[self.pos + 1..]
            .iter()
            .find(|&&b| b == b'=' || b == b'}')
            .is_some_and(|&b| b == b'}')
    }

    fn parse_object(&mut self) -> Result<TypeDescriptor> {
        self.pos += 1; // '@'

        let kind = match self.peek() {
            Some(b'?') => {
                self.pos += 1;
                ScalarKind::Block
            }
            Some(b'"') => {
                let close = self
                    .find_from(self.pos + 1, b'"')
                    .ok_or_else(|| self.error("unterminated class name"))?;
                // Inside a named record `@"x"i` means: object, then field "x" of type i.
                // A quoted run is a class name only when no type can follow it.
                let follows = self.bytes.get(close + 1).copied();
                if matches!(follows, None | Some(b'"') | Some(b'}') | Some(b']')) {
                    let class = &self.input[self.pos + 1..close];
                    self.pos = close + 1;
                    ScalarKind::Object {
                        class: (!class.is_empty()).then(|| class.to_string()),
                    }
                } else {
                    ScalarKind::Object { class: None }
                }
            }
            _ => ScalarKind::Object { class: None },
        };

        TypeDescriptor::scalar_with(kind, self.config)
    }

    fn parse_quoted(&mut self, unterminated: &str) -> Result<&'a str> {
        let close = self
            .find_from(self.pos + 1, b'"')
            .ok_or_else(|| self.error(unterminated))?;
        let input: &'a str = self.input;
        let text = &input[self.pos + 1..close];
        self.pos = close + 1;
        Ok(text)
    }
}
