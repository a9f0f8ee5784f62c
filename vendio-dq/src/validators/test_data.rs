//! Test-data detection
//!
//! Flags records that look like leftovers from manual testing so operators
//! can clean them out before reports run over them. Matching is substring,
//! case-insensitive, and never blocking.

const TEST_DATA_KEYWORDS: &[&str] = &["test", "teste", "demo", "example", "exemplo", "fake", "asdf"];

/// True when the value contains a known test-data keyword
pub fn looks_like_test_data(value: &str) -> bool {
    let lowered = value.to_lowercase();
    TEST_DATA_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}
