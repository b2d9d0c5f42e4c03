//! Property-based tests for path text and walker coordinates.

use configspan::locate::{Dialect, Path, PathSegment, SourceIndex, SourceLocation};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,8}".prop_map(PathSegment::Property),
        (0usize..10_000).prop_map(PathSegment::Index),
        "[ -~]{0,8}".prop_map(PathSegment::Key),
    ]
}

fn resolve(index: &SourceIndex, path: &str) -> Option<SourceLocation> {
    index.find_str(path).ok().flatten().map(std::borrow::Cow::into_owned)
}

/// Returns the characters of `raw` starting at `column`, `len` long.
fn excerpt(raw: &str, column: usize, len: usize) -> String {
    raw.chars().skip(column).take(len).collect()
}

proptest! {
    #[test]
    fn canonical_text_parses_back_to_the_same_segments(
        segments in prop::collection::vec(segment(), 1..6),
    ) {
        let path: Path = segments.iter().cloned().collect();
        let parsed = Path::parse(path.as_str());
        prop_assert_eq!(parsed.as_ref().map(Path::segments), Ok(segments.as_slice()));
        prop_assert_eq!(parsed, Ok(path));
    }

    #[test]
    fn inline_elements_point_at_their_own_text(
        elements in prop::collection::vec("[a-z0-9]{0,6}", 2..8),
    ) {
        let content = format!("items={}", elements.join(","));
        let index = SourceIndex::build(Dialect::Flat, &content);
        for (position, element) in elements.iter().enumerate() {
            let location = resolve(&index, &format!("items[{position}]"));
            let Some(location) = location else {
                return Err(TestCaseError::fail(format!("items[{position}] missing")));
            };
            let Some(column) = location.value_column() else {
                return Err(TestCaseError::fail(format!("items[{position}] has no value")));
            };
            prop_assert_eq!(location.value_text(), Some(element.as_str()));
            prop_assert_eq!(excerpt(&location.raw_line, column, element.len()), element.clone());
        }
    }

    #[test]
    fn nested_values_follow_their_keys(
        entries in prop::collection::btree_map("[a-z][a-z0-9_]{0,6}", "[a-z0-9]{1,8}", 1..8),
    ) {
        let mut content = String::from("root:\n");
        for (key, value) in &entries {
            content.push_str(&format!("  {key}: {value}\n"));
        }
        let index = SourceIndex::build(Dialect::Indentation, &content);
        for (line_number, (key, value)) in (2..).zip(&entries) {
            let Some(location) = resolve(&index, &format!("root.{key}")) else {
                return Err(TestCaseError::fail(format!("root.{key} missing")));
            };
            prop_assert_eq!(location.line_number, line_number);
            prop_assert_eq!(location.key_column(), Some(2));
            prop_assert_eq!(location.value_column(), Some(key.len() + 4));
            prop_assert!(location.key_column() < location.value_column());
            prop_assert_eq!(location.value_text(), Some(value.as_str()));
        }
    }

    #[test]
    fn indexing_arbitrary_text_is_total_and_repeatable(
        content in "(\\PC|\n){0,300}",
        dialect in prop_oneof![
            Just(Dialect::Indentation),
            Just(Dialect::Flat),
            Just(Dialect::Markup),
        ],
    ) {
        let first = SourceIndex::build(dialect, &content);
        let second = SourceIndex::build(dialect, &content);
        let first_entries: Vec<_> = first.locations().iter().collect();
        let second_entries: Vec<_> = second.locations().iter().collect();
        prop_assert_eq!(first_entries, second_entries);
        let line_count = content.lines().count();
        for (_, location) in first.locations().iter() {
            prop_assert!(location.line_number >= 1 && location.line_number <= line_count.max(1));
        }
    }
}

