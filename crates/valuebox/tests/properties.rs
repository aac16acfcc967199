// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Property checks over randomly generated encodings (fixed seeds, so every
// run sees the same inputs).

use std::sync::Arc;
use valuebox::{Error, ScalarKind, TypeDescriptor, TypeKind, TypedValue};

const SEEDS: [u64; 4] = [0x5EED, 0xC0FFEE, 42, 0xDEAD_BEEF];
const CASES_PER_SEED: usize = 64;

const SCALARS: &[&str] = &[
    "c", "C", "s", "S", "i", "I", "l", "L", "q", "Q", "t", "T", "f", "d", "D", "B", "*", "#",
    ":", "@", "@?", "@\"NSString\"", "^v", "^?", "^{node}", "^i", "^@\"Widget\"",
];

const QUALIFIERS: &[char] = &['r', 'n', 'N', 'o', 'O', 'R', 'V'];

fn random_encoding(rng: &mut fastrand::Rng, depth: usize) -> String {
    let mut out = String::new();
    if rng.u8(..4) == 0 {
        out.push(QUALIFIERS[rng.usize(..QUALIFIERS.len())]);
    }
    let roll = if depth == 0 { 0 } else { rng.u8(..10) };
    match roll {
        0..=4 => out.push_str(SCALARS[rng.usize(..SCALARS.len())]),
        5..=6 => {
            let element = random_encoding(rng, depth - 1);
            out.push_str(&format!("[{}{}]", rng.usize(1..5), element));
        }
        _ => {
            out.push('{');
            if rng.bool() {
                out.push_str(&format!("r{}", rng.u16(..)));
            }
            out.push('=');
            let mut after_class = false;
            for index in 0..rng.usize(0..5) {
                // A type right after `@"Class"` would read the class as a field name
                if after_class || rng.bool() {
                    out.push_str(&format!("\"f{}\"", index));
                }
                let field = random_encoding(rng, depth - 1);
                after_class = field.ends_with('"');
                out.push_str(&field);
            }
            out.push('}');
        }
    }
    out
}

fn for_each_case(mut check: impl FnMut(&mut fastrand::Rng, TypeDescriptor)) {
    for seed in SEEDS {
        let mut rng = fastrand::Rng::with_seed(seed);
        for _ in 0..CASES_PER_SEED {
            let encoding = random_encoding(&mut rng, 3);
            let desc = TypeDescriptor::parse(&encoding)
                .unwrap_or_else(|e| panic!("generated '{}' failed: {}", encoding, e));
            check(&mut rng, desc);
        }
    }
}

fn random_bytes(rng: &mut fastrand::Rng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.u8(..)).collect()
}

fn align_up(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}

fn check_layout(desc: &TypeDescriptor) {
    match desc.kind() {
        TypeKind::Scalar(_) => {}
        TypeKind::Array(array) => {
            assert_eq!(desc.size(), array.element.size() * array.count);
            assert_eq!(desc.alignment(), array.element.alignment());
            check_layout(&array.element);
        }
        TypeKind::Record(record) => {
            for pair in record.fields.windows(2) {
                let end = pair[0].end_offset();
                assert!(pair[1].offset >= end);
                assert_eq!(
                    pair[1].offset,
                    align_up(end, pair[1].type_desc.alignment()),
                    "padding only where alignment needs it in '{}'",
                    desc.encoding()
                );
            }
            let end = record.fields.last().map_or(0, |f| f.end_offset());
            assert_eq!(desc.size(), align_up(end, desc.alignment()));
            for field in &record.fields {
                assert_eq!(field.offset % field.type_desc.alignment(), 0);
                check_layout(&field.type_desc);
            }
        }
    }
}

#[test]
fn render_then_parse_is_identity() {
    for_each_case(|_, desc| {
        let rendered = desc.to_encoding_string();
        let reparsed = TypeDescriptor::parse(&rendered).unwrap();
        assert_eq!(reparsed.size(), desc.size());
        assert_eq!(reparsed.alignment(), desc.alignment());
        assert_eq!(reparsed.fields(), desc.fields());
        assert_eq!(reparsed, desc);
    });
}

#[test]
fn generator_reaches_wide_and_class_scalars() {
    let mut seen = Vec::new();
    for seed in SEEDS {
        let mut rng = fastrand::Rng::with_seed(seed);
        for _ in 0..CASES_PER_SEED {
            let desc = TypeDescriptor::parse(&random_encoding(&mut rng, 3)).unwrap();
            collect_scalars(&desc, &mut seen);
        }
    }
    for code in ['t', 'T', 'D'] {
        assert!(seen.iter().any(|k| k.code() == code), "never generated '{}'", code);
    }
    assert!(seen
        .iter()
        .any(|k| matches!(k, ScalarKind::Object { class: Some(_) })));
}

fn collect_scalars(desc: &TypeDescriptor, seen: &mut Vec<ScalarKind>) {
    match desc.kind() {
        TypeKind::Scalar(kind) => seen.push(kind.clone()),
        TypeKind::Array(array) => collect_scalars(&array.element, seen),
        TypeKind::Record(record) => {
            for field in &record.fields {
                collect_scalars(&field.type_desc, seen);
            }
        }
    }
}

#[test]
fn record_offsets_follow_c_layout() {
    for_each_case(|_, desc| check_layout(&desc));
}

#[test]
fn get_into_returns_constructor_bytes() {
    for_each_case(|rng, desc| {
        let bytes = random_bytes(rng, desc.size());
        let desc = Arc::new(desc);
        let value = TypedValue::from_bytes(&bytes, desc.clone()).unwrap();
        let mut out = vec![0u8; desc.size()];
        value.get_into(&desc, &mut out).unwrap();
        assert_eq!(out, bytes);
    });
}

#[test]
fn at_respects_count() {
    for_each_case(|rng, desc| {
        let count = desc.count();
        let bytes = random_bytes(rng, desc.size());
        let value = TypedValue::from_bytes(&bytes, Arc::new(desc)).unwrap();
        for index in 0..count {
            let sub = value.at(index).unwrap();
            let region = value.descriptor().region_at(index).unwrap();
            assert_eq!(sub.as_bytes(), &bytes[region.range()]);
        }
        assert!(matches!(
            value.at(count),
            Err(Error::IndexOutOfRange { .. })
        ));
    });
}

#[test]
fn mutable_copies_never_leak_back() {
    for_each_case(|rng, desc| {
        if desc.size() == 0 {
            return;
        }
        let bytes = random_bytes(rng, desc.size());
        let original = TypedValue::from_bytes(&bytes, Arc::new(desc)).unwrap();
        let snapshot = original.copy();

        let mut edited = original.mutable_copy();
        let flipped: Vec<u8> = bytes.iter().map(|b| !b).collect();
        let whole = edited.descriptor().clone();
        edited.set_from(&whole, &flipped).unwrap();

        assert_eq!(original.as_bytes(), &bytes[..]);
        assert_eq!(snapshot.as_bytes(), &bytes[..]);
        assert_eq!(edited.as_bytes(), &flipped[..]);
    });
}

#[test]
fn archives_roundtrip() {
    for_each_case(|rng, desc| {
        let bytes = random_bytes(rng, desc.size());
        let value = TypedValue::from_bytes(&bytes, Arc::new(desc)).unwrap();
        let archive = value.to_archive().unwrap();
        assert_eq!(TypedValue::from_archive(&archive).unwrap(), value);
    });
}
