//! Location index for tag-nested markup (XML-style) sources.
//!
//! The scan first collects elements with their parent links and byte
//! offsets, then assigns paths top-down so that repeated siblings can be
//! numbered as list items. Conventions understood:
//!
//! - A single top-level element with element children is an unnamed
//!   document wrapper and adds no path segment.
//! - `<entry key="...">` contributes a `Key` segment named by the attribute,
//!   for map keys that are not legal tag names.
//! - `<null/>` marks an explicit null and is left out of the index.
//! - Attributes other than namespace declarations are recorded as child
//!   properties of their element.
//! - A container with a single child cannot be told apart from a one-item
//!   list, so `P[0]` also resolves to that child when `P[0]` is not indexed.

use std::borrow::Cow;
use std::collections::HashMap;

use super::lines::{LineMap, char_column, quoted_len, unquote};
use super::location::{LocationIndex, SourceLocation, Token};
use super::path::{Path, PathSegment};
use super::walker::Walker;

/// Tag marking an explicit null value.
const NULL_TAG: &str = "null";
/// Tag carrying a map key in its [`KEY_ATTRIBUTE`].
const ENTRY_TAG: &str = "entry";
const KEY_ATTRIBUTE: &str = "key";
/// Conventional name for a lone list item.
const ITEM_TAG: &str = "item";

/// Walker for tag-nested sources.
#[derive(Debug, Clone, Default)]
pub struct MarkupWalker {
    locations: LocationIndex,
    /// Path of the only child element, keyed by its container's lookup key.
    lone_children: HashMap<String, Path>,
}

impl Walker for MarkupWalker {
    fn index(content: &str) -> Self {
        let lines = LineMap::new(content);
        let elements = collect_elements(content);
        let mut assigner = Assigner {
            lines: &lines,
            elements: &elements,
            locations: LocationIndex::default(),
            lone_children: HashMap::new(),
        };
        assigner.assign_document();
        tracing::debug!(
            dialect = "markup",
            lines = lines.line_count(),
            entries = assigner.locations.len(),
            "indexed source"
        );
        Self {
            locations: assigner.locations,
            lone_children: assigner.lone_children,
        }
    }

    fn locations(&self) -> &LocationIndex {
        &self.locations
    }

    fn resolve(&self, path: &Path) -> Option<Cow<'_, SourceLocation>> {
        if let Some(location) = self.locations.get(path) {
            return Some(Cow::Borrowed(location));
        }
        // Each rewrite replaces one `[0]` with a name, so the recursion ends.
        let segments = path.segments();
        segments.iter().enumerate().find_map(|(depth, segment)| {
            if *segment != PathSegment::Index(0) {
                return None;
            }
            let child = self.lone_children.get(&path.sub_path(depth).lookup_key())?;
            let rewritten: Path = child
                .segments()
                .iter()
                .chain(segments.iter().skip(depth + 1))
                .cloned()
                .collect();
            self.resolve(&rewritten)
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Attribute<'a> {
    name: &'a str,
    name_offset: usize,
    /// Verbatim value, quotes included.
    value: &'a str,
    value_offset: usize,
}

impl Attribute<'_> {
    fn is_namespace(&self) -> bool {
        self.name == "xmlns" || self.name.contains(':')
    }
}

#[derive(Debug, Clone)]
struct Element<'a> {
    name: &'a str,
    name_offset: usize,
    attributes: Vec<Attribute<'a>>,
    self_closing: bool,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Offset just past the `>` of the opening tag.
    open_end: usize,
    /// Trimmed inline text and its offset, when open and close share a line.
    text: Option<(usize, &'a str)>,
}

impl<'a> Element<'a> {
    fn is_null(&self) -> bool {
        self.name == NULL_TAG
    }

    fn designator(&self) -> Option<&Attribute<'a>> {
        if self.name != ENTRY_TAG {
            return None;
        }
        self.attributes
            .iter()
            .find(|attribute| attribute.name == KEY_ATTRIBUTE)
    }
}

/// Collects every element in document order.
fn collect_elements(content: &str) -> Vec<Element<'_>> {
    let mut elements: Vec<Element<'_>> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut position = 0;

    while let Some(start) = content
        .get(position..)
        .and_then(|rest| rest.find('<'))
        .map(|relative| position + relative)
    {
        let rest = content.get(start..).unwrap_or_default();
        if rest.starts_with("<!--") {
            position = skip_past(content, start, "-->");
        } else if rest.starts_with("<![CDATA[") {
            position = skip_past(content, start, "]]>");
        } else if rest.starts_with("<?") {
            position = skip_past(content, start, "?>");
        } else if rest.starts_with("<!") {
            position = skip_past(content, start, ">");
        } else if let Some(closing) = rest.strip_prefix("</") {
            close_element(content, &mut elements, &mut open, tag_name(closing), start);
            position = skip_past(content, start, ">");
        } else if let Some(tag) = parse_open_tag(content, start) {
            let index = elements.len();
            let parent = open.last().copied();
            if let Some(parent_element) = parent.and_then(|p| elements.get_mut(p)) {
                parent_element.children.push(index);
            }
            if !tag.self_closing {
                open.push(index);
            }
            position = tag.open_end;
            elements.push(Element {
                parent,
                ..tag
            });
        } else {
            position = start + 1;
        }
    }
    elements
}

/// Byte offset just past the first `terminator` at or after `start`.
fn skip_past(content: &str, start: usize, terminator: &str) -> usize {
    content
        .get(start..)
        .and_then(|rest| rest.find(terminator))
        .map_or(content.len(), |found| start + found + terminator.len())
}

fn tag_name(text: &str) -> &str {
    let end = text
        .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>'))
        .unwrap_or(text.len());
    text.get(..end).unwrap_or_default()
}

/// Closes the innermost open element named `name` (or, failing a match, the
/// innermost open element), recording inline text when the element has no
/// children and closes on its opening line.
fn close_element<'c>(
    content: &'c str,
    elements: &mut [Element<'c>],
    open: &mut Vec<usize>,
    name: &str,
    close_start: usize,
) {
    let matching = open
        .iter()
        .rposition(|&index| elements.get(index).is_some_and(|e| e.name == name));
    if matching.is_none() {
        tracing::trace!(tag = name, "closing tag matches no open element");
    }
    let Some(depth) = matching.or_else(|| open.len().checked_sub(1)) else {
        return;
    };
    let Some(&index) = open.get(depth) else {
        return;
    };
    open.truncate(depth);

    let Some(element) = elements.get_mut(index) else {
        return;
    };
    if !element.children.is_empty() {
        return;
    }
    let Some(body) = content.get(element.open_end..close_start) else {
        return;
    };
    if body.contains('\n') {
        return;
    }
    let trimmed = body.trim_start();
    let offset = element.open_end + (body.len() - trimmed.len());
    element.text = Some((offset, trimmed.trim_end()));
}

/// Parses an opening or self-closing tag starting at `start` (the `<`).
fn parse_open_tag(content: &str, start: usize) -> Option<Element<'_>> {
    let name_offset = start + 1;
    let after = content.get(name_offset..)?;
    let name = tag_name(after);
    if name.is_empty() {
        return None;
    }

    let body_offset = name_offset + name.len();
    let body = content.get(body_offset..)?;
    let close = tag_end(body)?;
    let inner = body.get(..close)?;
    let self_closing = inner.trim_end().ends_with('/');
    let attributes = parse_attributes(inner.trim_end_matches('/'), body_offset);

    Some(Element {
        name,
        name_offset,
        attributes,
        self_closing,
        parent: None,
        children: Vec::new(),
        open_end: body_offset + close + 1,
        text: None,
    })
}

/// Byte offset of the `>` ending a tag, ignoring `>` inside quotes.
fn tag_end(body: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, c) in body.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if open == c => quote = None,
            (None, '>') => return Some(offset),
            _ => {}
        }
    }
    None
}

/// Parses `name="value"` pairs; `base` is the byte offset of `inner`.
fn parse_attributes(inner: &str, base: usize) -> Vec<Attribute<'_>> {
    let mut attributes = Vec::new();
    let mut position = 0;
    while let Some(rest) = inner.get(position..) {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        let name_start = position + (rest.len() - trimmed.len());
        let name_len = trimmed
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(trimmed.len());
        let name = trimmed.get(..name_len).unwrap_or_default();
        let after_name = trimmed.get(name_len..).unwrap_or_default();
        let after_ws = after_name.trim_start();
        let Some(value_part) = after_ws.strip_prefix('=') else {
            position = name_start + name_len.max(1);
            continue;
        };
        let value_trimmed = value_part.trim_start();
        let value_len = quoted_len(value_trimmed).unwrap_or_else(|| {
            value_trimmed
                .find(char::is_whitespace)
                .unwrap_or(value_trimmed.len())
        });
        let value = value_trimmed.get(..value_len).unwrap_or_default();
        let value_start = inner.len() - value_trimmed.len();
        if !name.is_empty() {
            attributes.push(Attribute {
                name,
                name_offset: base + name_start,
                value,
                value_offset: base + value_start,
            });
        }
        position = value_start + value_len.max(1);
    }
    attributes
}

/// Assigns paths to collected elements and records their locations.
struct Assigner<'a, 'c> {
    lines: &'a LineMap<'c>,
    elements: &'a [Element<'c>],
    locations: LocationIndex,
    lone_children: HashMap<String, Path>,
}

impl<'c> Assigner<'_, 'c> {
    fn assign_document(&mut self) {
        let elements = self.elements;
        let top: Vec<usize> = elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.parent.is_none() && !element.is_null())
            .map(|(index, _)| index)
            .collect();

        if let [only] = top.as_slice() {
            if let Some(wrapper) = elements.get(*only) {
                if !wrapper.children.is_empty() {
                    self.assign_children(&wrapper.children, &Path::root(), wrapper.name);
                    return;
                }
            }
        }
        self.assign_children(&top, &Path::root(), "");
    }

    fn assign_children(&mut self, children: &[usize], parent_path: &Path, parent_name: &str) {
        let elements = self.elements;
        let members: Vec<&Element<'c>> = children
            .iter()
            .filter_map(|&index| elements.get(index))
            .filter(|element| !element.is_null())
            .collect();

        let mut name_counts: HashMap<&str, usize> = HashMap::new();
        for element in members.iter().filter(|e| e.designator().is_none()) {
            *name_counts.entry(element.name).or_insert(0) += 1;
        }
        let wrapped_list = match name_counts.iter().next() {
            Some((&name, &count)) if name_counts.len() == 1 => {
                count >= 2 || name == ITEM_TAG || name == parent_name
            }
            _ => false,
        };
        let lone_child = match name_counts.iter().next() {
            Some((&name, &1)) if members.len() == 1 && !wrapped_list => Some(name),
            _ => None,
        };
        if let Some(name) = lone_child {
            self.lone_children
                .insert(parent_path.lookup_key(), parent_path.child(name));
        }

        let mut list_position = 0;
        let mut ordinals: HashMap<&str, usize> = HashMap::new();
        for element in members {
            let path = if let Some(designator) = element.designator() {
                parent_path.key(unquote(designator.value))
            } else if wrapped_list {
                list_position += 1;
                parent_path.element(list_position - 1)
            } else if name_counts.get(element.name).is_some_and(|&count| count > 1) {
                let ordinal = ordinals.entry(element.name).or_insert(0);
                *ordinal += 1;
                parent_path.child(element.name).element(*ordinal - 1)
            } else {
                parent_path.child(element.name)
            };
            self.record(element, &path);
        }
    }

    fn record(&mut self, element: &Element<'c>, path: &Path) {
        let line_index = self.lines.line_index(element.name_offset);
        let key = match element.designator() {
            Some(designator) => {
                let text = unquote(designator.value);
                let quote = usize::from(text.len() != designator.value.len());
                self.token(designator.value_offset + quote, text)
            }
            None => self.token(element.name_offset, element.name),
        };
        let mut location =
            SourceLocation::new(line_index + 1, self.lines.line(line_index)).with_key(key);
        if let Some((offset, text)) = element.text {
            location = location.with_value(self.token(offset, text));
        }
        self.locations.insert(path.clone(), location);

        let designated = element.designator().is_some();
        for attribute in &element.attributes {
            if attribute.is_namespace() || (designated && attribute.name == KEY_ATTRIBUTE) {
                continue;
            }
            let attribute_line = self.lines.line_index(attribute.name_offset);
            let attribute_location =
                SourceLocation::new(attribute_line + 1, self.lines.line(attribute_line))
                    .with_key(self.token(attribute.name_offset, attribute.name))
                    .with_value(self.token(attribute.value_offset, attribute.value));
            self.locations
                .insert(path.child(attribute.name), attribute_location);
        }

        self.assign_children(&element.children, path, element.name);
    }

    fn token(&self, offset: usize, text: &str) -> Token {
        let line = self.lines.line(self.lines.line_index(offset));
        Token::new(text, char_column(line, self.lines.line_offset(offset)))
    }
}

#[cfg(test)]
#[path = "markup_tests.rs"]
mod tests;
