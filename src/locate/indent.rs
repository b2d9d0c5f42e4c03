//! Location index for indentation-nested block syntax (YAML-style).
//!
//! Lines are classified as blank, comment, `key: value` pairs, `- ` list
//! items, or block-scalar continuations. A stack of `(path, indent)` frames
//! gives every pair and item its full path, and a counter per indent level
//! numbers list items.

use std::collections::BTreeMap;

use super::lines::{indent_width, quoted_len, split_elements, token_at, unquote};
use super::location::{LocationIndex, SourceLocation};
use super::path::Path;
use super::walker::Walker;


/// Walker for indentation-significant sources.
#[derive(Debug, Clone, Default)]
pub struct IndentWalker {
    locations: LocationIndex,
}

impl Walker for IndentWalker {
    fn index(content: &str) -> Self {
        let mut scan = Scan::default();
        let mut lines = 0_usize;
        for (line_index, raw) in content.lines().enumerate() {
            scan.line(line_index + 1, raw);
            lines += 1;
        }
        tracing::debug!(
            dialect = "indentation",
            lines,
            entries = scan.locations.len(),
            "indexed source"
        );
        Self {
            locations: scan.locations,
        }
    }

    fn locations(&self) -> &LocationIndex {
        &self.locations
    }
}

#[derive(Debug)]
struct Frame {
    path: Path,
    indent: usize,
    list_item: bool,
}

/// Transient state for one scan.
#[derive(Debug, Default)]
struct Scan {
    locations: LocationIndex,
    stack: Vec<Frame>,
    /// Next list index per marker column.
    counters: BTreeMap<usize, usize>,
    /// Indent of the entry that opened the active block scalar.
    block_base: Option<usize>,
}

impl Scan {
    fn line(&mut self, line_number: usize, raw: &str) {
        let indent = indent_width(raw);
        let body = raw.trim_start();

        if let Some(base) = self.block_base {
            if body.is_empty() || indent > base {
                return;
            }
            self.block_base = None;
        }
        if body.is_empty() || body.starts_with('#') || is_directive(body) {
            return;
        }

        if is_list_marker(body) {
            self.item(line_number, raw, indent);
        } else if let Some(pair) = Pair::parse(raw, indent) {
            self.close_scopes(|frame| frame.indent >= indent);
            self.counters.retain(|&column, _| column < indent);
            let prefix = self.prefix();
            self.pair(line_number, raw, &pair, &prefix);
        } else {
            tracing::trace!(line = line_number, "skipping unrecognised line");
        }
    }

    /// Records a list item whose `-` marker sits at byte offset `marker`.
    fn item(&mut self, line_number: usize, raw: &str, marker: usize) {
        // A list may sit at the same indent as the key that owns it, so only
        // sibling items are closed at equal indent.
        self.close_scopes(|frame| {
            frame.indent > marker || (frame.indent == marker && frame.list_item)
        });
        self.counters.retain(|&column, _| column <= marker);
        let counter = self.counters.entry(marker).or_insert(0);
        let position = *counter;
        *counter += 1;

        let item_path = self.prefix().element(position);
        self.stack.push(Frame {
            path: item_path.clone(),
            indent: marker,
            list_item: true,
        });

        let after_marker = raw.get(marker + 1..).unwrap_or_default();
        let content = after_marker.trim_start();
        let content_offset = marker + 1 + (after_marker.len() - content.len());
        let location = SourceLocation::new(line_number, raw);

        if content.is_empty() || content.starts_with('#') {
            self.locations.insert(item_path, location);
        } else if is_list_marker(content) {
            self.locations.insert(item_path, location);
            self.item(line_number, raw, content_offset);
        } else if let Some(pair) = Pair::parse(raw, content_offset) {
            self.locations.insert(item_path.clone(), location);
            self.pair(line_number, raw, &pair, &item_path);
        } else {
            let value = clean_value(content);
            if is_block_indicator(value) {
                self.block_base = Some(marker);
            } else {
                self.flow_elements(line_number, raw, &item_path, content_offset, value);
            }
            self.locations.insert(
                item_path,
                location.with_value(token_at(raw, content_offset, value)),
            );
        }
    }

    /// Records a `key: value` pair nested under `prefix`.
    fn pair(&mut self, line_number: usize, raw: &str, pair: &Pair<'_>, prefix: &Path) {
        let path = prefix.child(unquote(pair.key));
        let mut location = SourceLocation::new(line_number, raw)
            .with_key(token_at(raw, pair.key_offset, pair.key));

        if let Some((offset, value)) = pair.value {
            if is_block_indicator(value) {
                self.block_base = Some(pair.key_offset);
            } else {
                self.flow_elements(line_number, raw, &path, offset, value);
            }
            location = location.with_value(token_at(raw, offset, value));
        }

        self.stack.push(Frame {
            path: path.clone(),
            indent: pair.key_offset,
            list_item: false,
        });
        self.locations.insert(path, location);
    }

    /// Records each element of an inline `[a, b]` sequence as `path[i]`.
    fn flow_elements(
        &mut self,
        line_number: usize,
        raw: &str,
        path: &Path,
        offset: usize,
        value: &str,
    ) {
        let Some(inner) = value
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        else {
            return;
        };
        if inner.trim().is_empty() {
            return;
        }
        for (position, element) in split_elements(inner).into_iter().enumerate() {
            let location = SourceLocation::new(line_number, raw).with_value(token_at(
                raw,
                offset + 1 + element.offset,
                element.text,
            ));
            self.locations.insert(path.element(position), location);
        }
    }

    fn close_scopes(&mut self, closes: impl Fn(&Frame) -> bool) {
        while self.stack.last().is_some_and(&closes) {
            self.stack.pop();
        }
    }

    fn prefix(&self) -> Path {
        self.stack
            .last()
            .map_or_else(Path::root, |frame| frame.path.clone())
    }
}

/// A `key: value` or `key:` entry found on a line.
#[derive(Debug, Clone, Copy)]
struct Pair<'a> {
    /// The key as written, quotes included.
    key: &'a str,
    key_offset: usize,
    /// Byte offset and text of a non-empty value.
    value: Option<(usize, &'a str)>,
}

impl<'a> Pair<'a> {
    /// Parses a pair whose key starts at byte `offset` of `raw`.
    fn parse(raw: &'a str, offset: usize) -> Option<Self> {
        let text = raw.get(offset..)?;
        let key_end = match quoted_len(text) {
            Some(len) => len,
            None => key_separator(text)?,
        };
        let key = text.get(..key_end)?.trim_end();
        if key.is_empty() || key.starts_with(['{', '[', '?', '|', '>', '&', '!', '%', '@', '`']) {
            return None;
        }

        let after_key = text.get(key_end..)?;
        let colon = key_end + after_key.find(':')?;
        if text.get(key_end..colon)?.trim().is_empty() {
            let rest = text.get(colon + 1..)?;
            if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
                return None;
            }
            let trimmed = rest.trim_start();
            let value_offset = offset + colon + 1 + (rest.len() - trimmed.len());
            let value = clean_value(trimmed);
            return Some(Self {
                key,
                key_offset: offset,
                value: (!value.is_empty()).then_some((value_offset, value)),
            });
        }
        None
    }
}

/// Byte offset of the first `:` followed by whitespace or end of line.
fn key_separator(text: &str) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if c == ':' && chars.peek().is_none_or(|&(_, next)| matches!(next, ' ' | '\t')) {
            return Some(offset);
        }
    }
    None
}

/// Trims a trailing comment from a value whose leading whitespace is gone.
///
/// The result is always a prefix of `text`.
fn clean_value(text: &str) -> &str {
    if text.starts_with('#') {
        return "";
    }
    if let Some(len) = quoted_len(text) {
        return text.get(..len).unwrap_or(text);
    }
    let mut after_space = false;
    for (offset, c) in text.char_indices() {
        if c == '#' && after_space {
            return text.get(..offset).unwrap_or(text).trim_end();
        }
        after_space = matches!(c, ' ' | '\t');
    }
    text.trim_end()
}

/// Matches a block-scalar header: `|` or `>` followed by chomping and
/// indentation indicators only (`|`, `>-`, `|+`, `|2`, `>2-`).
fn is_block_indicator(value: &str) -> bool {
    value
        .strip_prefix(['|', '>'])
        .is_some_and(|rest| rest.chars().all(|c| matches!(c, '+' | '-') || c.is_ascii_digit()))
}

fn is_list_marker(body: &str) -> bool {
    body == "-" || body.starts_with("- ") || body.starts_with("-\t")
}

/// Document markers and `%` directives carry no paths.
fn is_directive(body: &str) -> bool {
    body.starts_with('%')
        || body == "---"
        || body.starts_with("--- ")
        || body == "..."
}

#[cfg(test)]
#[path = "indent_tests.rs"]
mod tests;
