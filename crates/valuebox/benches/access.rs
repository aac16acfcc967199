// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Access Benchmark
//!
//! Measures the hot paths of typed values:
//! - Parsing encodings of increasing nesting
//! - Whole-value and keyed typed reads
//! - Indexed writes and sub-value extraction

#![allow(clippy::uninlined_format_args)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box as bb;
use std::sync::Arc;
use valuebox::{MutableTypedValue, TypeDescriptor, TypedValue};

const ENCODINGS: &[(&str, &str)] = &[
    ("scalar", "d"),
    ("point", "{point=\"x\"f\"y\"f}"),
    (
        "rect",
        "{rect=\"origin\"{point=\"x\"d\"y\"d}\"size\"{size=\"w\"d\"h\"d}}",
    ),
    ("matrix", "[4[4f]]"),
    (
        "nested",
        "{frame=\"id\"I\"poses\"[8{pose=\"p\"[3d]\"q\"[4d]}]\"stamp\"Q}",
    ),
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, encoding) in ENCODINGS {
        group.bench_with_input(BenchmarkId::from_parameter(name), encoding, |b, enc| {
            b.iter(|| TypeDescriptor::parse(bb(enc)).expect("valid encoding"));
        });
    }
    group.finish();
}

fn bench_reads(c: &mut Criterion) {
    let rect = Arc::new(TypeDescriptor::parse(ENCODINGS[2].1).expect("rect"));
    let value = TypedValue::zeroed(rect);

    let mut group = c.benchmark_group("read");
    group.bench_function("get_whole_f64", |b| {
        let scalar = TypedValue::from_scalar(1.5f64).expect("scalar");
        b.iter(|| bb(&scalar).get::<f64>().expect("get"));
    });
    group.bench_function("at_key_then_get", |b| {
        b.iter(|| {
            bb(&value)
                .at_key("size")
                .and_then(|s| s.get_for_key::<f64>("h"))
                .expect("nested get")
        });
    });
    group.bench_function("get_into_at", |b| {
        let point = value.descriptor().region_at(0).expect("origin").descriptor.clone();
        let mut out = [0u8; 16];
        b.iter(|| bb(&value).get_into_at(&point, 0, &mut out).expect("get_into_at"));
    });
    group.finish();
}

fn bench_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    for count in [4usize, 64, 1024] {
        let desc = Arc::new(TypeDescriptor::parse(&format!("[{}i]", count)).expect("array"));
        let mut value = MutableTypedValue::zeroed(desc);
        group.bench_with_input(BenchmarkId::new("set_at", count), &count, |b, &n| {
            let mut index = 0;
            b.iter(|| {
                value.set_at(index, bb(7i32)).expect("set_at");
                index = (index + 1) % n;
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_reads, bench_writes);
criterion_main!(benches);
