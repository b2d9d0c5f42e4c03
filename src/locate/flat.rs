//! Location index for line-per-entry `key=value` sources with optional
//! `[section]` headers (INI, properties and TOML-style files).
//!
//! Dotted keys and dotted section names expand into nested property
//! segments. Comma-separated values are addressable by index without being
//! stored separately: `items[1]` is cut out of the `items` line on demand.

use std::borrow::Cow;
use std::collections::HashMap;

use super::lines::{char_column, offset_in, split_elements, token_at, unquote};
use super::location::{LocationIndex, SourceLocation, Token};
use super::path::{Path, PathSegment};
use super::walker::Walker;

/// Walker for flat, section-based sources.
#[derive(Debug, Clone, Default)]
pub struct FlatWalker {
    locations: LocationIndex,
}

impl Walker for FlatWalker {
    fn index(content: &str) -> Self {
        let mut locations = LocationIndex::default();
        let mut section = Path::root();
        let mut tables: HashMap<String, usize> = HashMap::new();
        let mut lines = 0_usize;

        for (line_index, raw) in content.lines().enumerate() {
            lines += 1;
            let line_number = line_index + 1;
            let body = raw.trim();
            if body.is_empty() || body.starts_with([';', '#']) {
                continue;
            }

            if let Some(name) = bracketed(body, "[[", "]]") {
                let table = dotted_path(&Path::root(), name);
                let counter = tables.entry(table.lookup_key()).or_insert(0);
                section = table.element(*counter);
                *counter += 1;
            } else if let Some(name) = bracketed(body, "[", "]") {
                section = dotted_path(&Path::root(), name);
            } else if let Some(entry) = Entry::parse(raw) {
                let path = dotted_path(&section, entry.key);
                let mut location = SourceLocation::new(line_number, raw)
                    .with_key(token_at(raw, entry.key_offset, entry.key));
                if let Some((offset, value)) = entry.value {
                    location = location.with_value(token_at(raw, offset, value));
                }
                locations.insert(path, location);
            } else {
                tracing::trace!(line = line_number, "skipping unrecognised line");
            }
        }

        tracing::debug!(
            dialect = "flat",
            lines,
            entries = locations.len(),
            "indexed source"
        );
        Self { locations }
    }

    fn locations(&self) -> &LocationIndex {
        &self.locations
    }

    fn resolve(&self, path: &Path) -> Option<Cow<'_, SourceLocation>> {
        if let Some(location) = self.locations.get(path) {
            return Some(Cow::Borrowed(location));
        }
        let Some(&PathSegment::Index(position)) = path.last() else {
            return None;
        };
        let container = self.resolve(&path.parent()?)?;
        inline_element(&container, position).map(Cow::Owned)
    }
}

/// Cuts element `position` out of a comma-separated value.
///
/// Values wrapped in `[...]` are split inside the brackets. A value with no
/// list structure, or an index past the last element, yields `None`.
fn inline_element(container: &SourceLocation, position: usize) -> Option<SourceLocation> {
    let value = container.value.as_ref()?;
    let (list, column) = match value
        .text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(inner) => (inner, value.column + 1),
        None if value.text.contains(',') => (value.text.as_str(), value.column),
        None => return None,
    };
    let element = split_elements(list).into_iter().nth(position)?;
    let token = Token::new(element.text, column + char_column(list, element.offset));
    Some(SourceLocation {
        line_number: container.line_number,
        raw_line: container.raw_line.clone(),
        key: container.key.clone(),
        value: Some(token),
    })
}

/// Returns the trimmed text between `open` and `close`.
fn bracketed<'a>(body: &'a str, open: &str, close: &str) -> Option<&'a str> {
    body.strip_prefix(open)?.strip_suffix(close).map(str::trim)
}

/// Appends the dot-separated parts of `key` to `base`.
///
/// Quoted parts stay whole, so `"a.b"` is a single segment.
fn dotted_path(base: &Path, key: &str) -> Path {
    let mut path = base.clone();
    let mut part = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in key.chars() {
        if escaped {
            part.push(c);
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (None, '.') => {
                push_part(&mut path, &part);
                part.clear();
            }
            (None, '"' | '\'') if part.trim().is_empty() => {
                quote = Some(c);
                part.push(c);
            }
            (Some(open), _) if open == c => {
                quote = None;
                part.push(c);
            }
            _ => part.push(c),
        }
    }
    push_part(&mut path, &part);
    path
}

fn push_part(path: &mut Path, part: &str) {
    let name = unquote(part.trim());
    if !name.is_empty() {
        path.push(PathSegment::Property(name.to_owned()));
    }
}

/// A `key=value` line.
#[derive(Debug, Clone, Copy)]
struct Entry<'a> {
    key: &'a str,
    key_offset: usize,
    value: Option<(usize, &'a str)>,
}

impl<'a> Entry<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let separator = separator(raw)?;
        let key = raw.get(..separator)?.trim();
        if key.is_empty() {
            return None;
        }
        let after = raw.get(separator + 1..)?;
        let value = after.trim();
        Some(Self {
            key,
            key_offset: offset_in(raw, key),
            value: (!value.is_empty()).then(|| (offset_in(raw, value), value)),
        })
    }
}

/// Byte offset of the first `=` that is neither escaped nor inside a quoted
/// key part.
fn separator(raw: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut part_start = true;
    for (offset, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            part_start = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (None, '"' | '\'') if part_start => quote = Some(c),
            (Some(open), _) if open == c => quote = None,
            (None, '=') => return Some(offset),
            _ => {}
        }
        if quote.is_none() {
            part_start = c == '.' || (part_start && c.is_whitespace());
        }
    }
    None
}

#[cfg(test)]
#[path = "flat_tests.rs"]
mod tests;
