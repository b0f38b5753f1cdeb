#![allow(dead_code)]

use nginx_fmt::{ConfigDocument, format, format_str, parse_str};

/// Assert that `input` is already canonical: parsing and formatting it
/// gives back the same text.
pub fn roundtrip(input: &str) {
    let output = format_str(input).expect("parse failed");
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Assert that formatting twice gives the same result as formatting once.
pub fn assert_idempotent(input: &str) -> String {
    let once = format_str(input).expect("first parse failed");
    let twice = format_str(&once).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{once}"
        )
    });
    assert_eq!(
        once, twice,
        "format is not idempotent\n--- once ---\n{once}\n--- twice ---\n{twice}"
    );
    once
}

/// Format a document, parse it back, and return the re-parsed tree.
pub fn reparse(document: &ConfigDocument) -> ConfigDocument {
    let formatted = format(document);
    parse_str(&formatted).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{formatted}"
        )
    })
}
