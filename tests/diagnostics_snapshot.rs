//! Snapshot tests for rendered diagnostics across dialects.

use camino::Utf8Path;
use configspan::locate::{Dialect, Path, SourceIndex};
use test_helpers::{fixture_label, load_fixture};

fn render_for_fixture(fixture_name: &str, path: &str, hint: &str) -> String {
    let Ok(dialect) = Dialect::from_path(Utf8Path::new(fixture_name)) else {
        panic!("fixture {fixture_name} should have a known extension");
    };
    let index = SourceIndex::build(dialect, &load_fixture(fixture_name));
    let Ok(parsed) = Path::parse(path) else {
        panic!("{path} should parse");
    };
    let label = fixture_label(fixture_name);
    let Some(rendered) = index.render(&parsed, Some(&label), Some(hint)) else {
        panic!("{path} should resolve in {fixture_name}");
    };
    rendered
}

#[test]
fn indentation_list_item_diagnostic_snapshot() {
    let actual = render_for_fixture("service.yaml", "servers[1].port", "expected an integer");
    let expected = include_str!("snapshots/diagnostics/indentation_list_item.snap").trim_end();
    assert_eq!(actual, expected);
}

#[test]
fn indentation_ancestor_fallback_diagnostic_snapshot() {
    let actual = render_for_fixture("service.yaml", "database.pool.size", "unknown field `pool`");
    let expected =
        include_str!("snapshots/diagnostics/indentation_ancestor_fallback.snap").trim_end();
    assert_eq!(actual, expected);
}

#[test]
fn flat_inline_element_diagnostic_snapshot() {
    let actual = render_for_fixture("service.ini", "servers.timeouts[2]", "expected an integer");
    let expected = include_str!("snapshots/diagnostics/flat_inline_element.snap").trim_end();
    assert_eq!(actual, expected);
}

#[test]
fn markup_list_item_diagnostic_snapshot() {
    let actual = render_for_fixture("service.xml", "servers[1].port", "expected an integer");
    let expected = include_str!("snapshots/diagnostics/markup_list_item.snap").trim_end();
    assert_eq!(actual, expected);
}
