// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use valuebox::{TypeDescriptor, TypedValue};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Accepted encodings must render to a string that parses identically
    if let Ok(desc) = TypeDescriptor::parse(input) {
        let reparsed = TypeDescriptor::parse(desc.encoding()).expect("normalized form parses");
        assert_eq!(reparsed, desc);

        // Walk every region of a zeroed value when it is small enough
        if desc.size() <= 1 << 16 {
            let value = TypedValue::zeroed(std::sync::Arc::new(desc));
            for index in 0..value.count().min(64) {
                let _ = value.at(index);
            }
        }
    }
});
