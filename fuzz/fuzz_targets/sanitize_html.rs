//! Fuzz target for the sanitizer entry points.
//!
//! Arbitrary bytes must never panic, and the output must be stable and free
//! of anything the classifier flags.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vellum_sanitizer::{contains_dangerous_content, remove_dangerous_patterns_only, sanitize_html};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let clean = sanitize_html(input);
    assert!(!contains_dangerous_content(&clean), "dangerous output for {:?}", input);
    assert_eq!(sanitize_html(clean.as_str()), clean, "unstable output for {:?}", input);

    let scrubbed = remove_dangerous_patterns_only(input);
    assert!(scrubbed.len() <= input.len());
    assert!(!contains_dangerous_content(&scrubbed), "scrub missed {:?}", input);
});
