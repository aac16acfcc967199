// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use valuebox::TypedValue;

fuzz_target!(|data: &[u8]| {
    // Accepted archives survive a re-encode with the normalized encoding
    if let Ok(value) = TypedValue::from_archive(data) {
        let encoded = value.to_archive().expect("archive fits length prefixes");
        let again = TypedValue::from_archive(&encoded).expect("re-encoded archive decodes");
        assert_eq!(again, value);
    }
});
