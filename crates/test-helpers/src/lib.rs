//! Shared helpers for `configspan` integration tests.

/// Loads a fixture file from the `tests/fixtures/` directory.
///
/// # Panics
///
/// Panics if the file cannot be read.
#[must_use]
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
}

/// Returns the `tests/fixtures/` relative path used as a diagnostic label.
#[must_use]
pub fn fixture_label(name: &str) -> String {
    format!("tests/fixtures/{name}")
}
