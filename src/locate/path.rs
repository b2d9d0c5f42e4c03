//! Logical paths into a deserialized configuration tree.
//!
//! A [`Path`] is an ordered list of [`PathSegment`]s with a canonical text
//! form such as `environments["production"].clusters[0].nodes[0].cpu`.
//! Property segments are joined with `.`, list indices render as `[i]` and
//! arbitrary map keys render as `["raw"]`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{Enumerate, Peekable};
use std::str::{Chars, FromStr};

use super::error::LocateError;

/// One step of a logical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field or key written as a bare identifier.
    Property(String),
    /// A position in an ordered list.
    Index(usize),
    /// A map key that may not be a legal bare identifier.
    Key(String),
}

impl PathSegment {
    /// Returns the textual name for `Property` and `Key` segments.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Property(name) | Self::Key(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    fn write_canonical(&self, out: &mut String, first: bool) {
        match self {
            Self::Property(name) => {
                if !first {
                    out.push('.');
                }
                out.push_str(name);
            }
            Self::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
            Self::Key(raw) => {
                out.push_str("[\"");
                for c in raw.chars() {
                    if matches!(c, '"' | '\\') {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push_str("\"]");
            }
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_canonical(&mut out, true);
        f.write_str(&out)
    }
}

/// A logical path, compared and hashed by its canonical rendering.
///
/// The empty path denotes the document root. It never appears in a location
/// index and cannot be produced by [`Path::parse`].
#[derive(Debug, Clone, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
    rendered: String,
}

impl Path {
    /// Returns the empty root path.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
            rendered: String::new(),
        }
    }

    /// Parses the canonical text form produced by [`Display`](fmt::Display).
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::EmptyPath`] for empty input and
    /// [`LocateError::InvalidPath`] when brackets, indices, quoted keys or
    /// property names are malformed.
    ///
    /// # Examples
    ///
    ///     use configspan::locate::{Path, PathSegment};
    ///
    ///     let path = Path::parse(r#"servers[1]["my key"].port"#).unwrap();
    ///     assert_eq!(path.len(), 4);
    ///     assert_eq!(path.last(), Some(&PathSegment::Property("port".to_owned())));
    ///     assert_eq!(path.to_string(), r#"servers[1]["my key"].port"#);
    pub fn parse(text: &str) -> Result<Self, LocateError> {
        if text.is_empty() {
            return Err(LocateError::EmptyPath);
        }

        let mut chars = text.chars().enumerate().peekable();
        let mut path = Self::root();
        while let Some(&(position, c)) = chars.peek() {
            match c {
                '[' => {
                    chars.next();
                    path.push(parse_bracket(&mut chars, position)?);
                }
                '.' if !path.is_empty() => {
                    chars.next();
                    path.push(PathSegment::Property(parse_name(&mut chars, position + 1)?));
                }
                _ if path.is_empty() => {
                    path.push(PathSegment::Property(parse_name(&mut chars, position)?));
                }
                _ => {
                    return Err(LocateError::invalid_path(
                        position,
                        "expected '.' or '[' after a closing bracket",
                    ));
                }
            }
        }
        Ok(path)
    }

    /// Appends a segment in place.
    pub fn push(&mut self, segment: PathSegment) {
        segment.write_canonical(&mut self.rendered, self.segments.is_empty());
        self.segments.push(segment);
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn with(&self, segment: PathSegment) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    /// Returns a new path with a `Property` segment appended.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        self.with(PathSegment::Property(name.into()))
    }

    /// Returns a new path with an `Index` segment appended.
    #[must_use]
    pub fn element(&self, index: usize) -> Self {
        self.with(PathSegment::Index(index))
    }

    /// Returns a new path with a `Key` segment appended.
    #[must_use]
    pub fn key(&self, raw: impl Into<String>) -> Self {
        self.with(PathSegment::Key(raw.into()))
    }

    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the final segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the canonical text form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Returns the prefix made of the first `len` segments.
    ///
    /// Lengths beyond the path length return the whole path.
    #[must_use]
    pub fn sub_path(&self, len: usize) -> Self {
        self.segments.iter().take(len).cloned().collect()
    }

    /// Returns the path without its final segment, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let len = self.segments.len().checked_sub(1)?;
        Some(self.sub_path(len))
    }

    /// Iterates over the non-root proper ancestors, longest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (1..self.segments.len()).rev().map(|len| self.sub_path(len))
    }

    /// Key used by location indices.
    ///
    /// `Property` and `Key` segments with the same text produce the same
    /// key: source text does not say whether a name is an object field or
    /// a map key.
    pub(crate) fn lookup_key(&self) -> String {
        let mut out = String::with_capacity(self.rendered.len());
        for segment in &self.segments {
            match segment {
                PathSegment::Property(name) | PathSegment::Key(name) => {
                    out.push('.');
                    for c in name.chars() {
                        if matches!(c, '\\' | '.' | '[') {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                }
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl FromStr for Path {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        let mut path = Self::root();
        for segment in iter {
            path.push(segment);
        }
        path
    }
}

type Cursor<'a> = Peekable<Enumerate<Chars<'a>>>;

/// Reads a property name up to the next `.` or `[`.
fn parse_name(chars: &mut Cursor<'_>, position: usize) -> Result<String, LocateError> {
    let mut name = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if matches!(c, '.' | '[') {
            break;
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        return Err(LocateError::invalid_path(
            position,
            "expected a property name",
        ));
    }
    Ok(name)
}

/// Reads the remainder of a `[...]` segment; the opening bracket is consumed.
fn parse_bracket(chars: &mut Cursor<'_>, open: usize) -> Result<PathSegment, LocateError> {
    if chars.next_if(|&(_, c)| c == '"').is_some() {
        let raw = parse_quoted_key(chars, open)?;
        return match chars.next() {
            Some((_, ']')) => Ok(PathSegment::Key(raw)),
            Some((position, _)) => Err(LocateError::invalid_path(
                position,
                "expected ']' after a quoted key",
            )),
            None => Err(LocateError::invalid_path(open, "unterminated '['")),
        };
    }

    let mut digits = String::new();
    loop {
        match chars.next() {
            Some((_, ']')) => break,
            Some((_, c)) => digits.push(c),
            None => return Err(LocateError::invalid_path(open, "unterminated '['")),
        }
    }
    let invalid = || LocateError::invalid_path(open + 1, "expected a non-negative list index");
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    digits
        .parse::<usize>()
        .map(PathSegment::Index)
        .map_err(|_| invalid())
}

fn parse_quoted_key(chars: &mut Cursor<'_>, open: usize) -> Result<String, LocateError> {
    let mut raw = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(raw),
            '\\' => match chars.next() {
                Some((_, escaped)) => raw.push(escaped),
                None => break,
            },
            _ => raw.push(c),
        }
    }
    Err(LocateError::invalid_path(open, "unterminated quoted key"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn segments(text: &str) -> Vec<PathSegment> {
        Path::parse(text)
            .map(|path| path.segments().to_vec())
            .unwrap_or_default()
    }

    #[rstest]
    #[case::single("age", "age")]
    #[case::nested("database.port", "database.port")]
    #[case::indexed("servers[1].port", "servers[1].port")]
    #[case::leading_index("[0].name", "[0].name")]
    #[case::quoted_key(r#"env["production"].cpu"#, r#"env["production"].cpu"#)]
    #[case::escaped_key(r#"labels["say \"hi\""]"#, r#"labels["say \"hi\""]"#)]
    fn canonical_text_survives_parsing(#[case] input: &str, #[case] expected: &str) {
        let path = Path::parse(input).expect("path should parse");
        assert_eq!(path.to_string(), expected);
    }

    #[test]
    fn parses_mixed_segments() {
        assert_eq!(
            segments(r#"environments["production"].clusters[0].nodes"#),
            vec![
                PathSegment::Property("environments".to_owned()),
                PathSegment::Key("production".to_owned()),
                PathSegment::Property("clusters".to_owned()),
                PathSegment::Index(0),
                PathSegment::Property("nodes".to_owned()),
            ]
        );
    }

    #[test]
    fn key_segments_may_contain_path_syntax() {
        assert_eq!(
            segments(r#"map["a.b[0]"]"#),
            vec![
                PathSegment::Property("map".to_owned()),
                PathSegment::Key("a.b[0]".to_owned()),
            ]
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::leading_dot(".a")]
    #[case::double_dot("a..b")]
    #[case::trailing_dot("a.")]
    #[case::unterminated_index("a[1")]
    #[case::negative_index("a[-1]")]
    #[case::word_index("a[x]")]
    #[case::empty_index("a[]")]
    #[case::unterminated_key(r#"a["x"#)]
    #[case::garbage_after_bracket("a[0]b")]
    fn rejects_malformed_text(#[case] input: &str) {
        assert!(Path::parse(input).is_err(), "{input:?} should be rejected");
    }

    #[test]
    fn empty_input_reports_empty_path() {
        assert_eq!(Path::parse(""), Err(LocateError::EmptyPath));
    }

    #[test]
    fn sub_path_and_parent_trim_segments() {
        let path = Path::parse("a.b[2].c").expect("path should parse");
        assert_eq!(path.sub_path(2).as_str(), "a.b");
        assert_eq!(path.sub_path(3).as_str(), "a.b[2]");
        assert_eq!(path.sub_path(10), path);
        assert_eq!(path.parent().map(|p| p.to_string()), Some("a.b[2]".to_owned()));
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn ancestors_run_longest_first_and_skip_root() {
        let path = Path::parse("a.b[2]").expect("path should parse");
        let rendered: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["a.b".to_owned(), "a".to_owned()]);
    }

    #[test]
    fn builders_render_canonically() {
        let path = Path::root().child("env").key("prod east").element(3).child("cpu");
        assert_eq!(path.as_str(), r#"env["prod east"][3].cpu"#);
    }

    #[test]
    fn lookup_key_ignores_property_key_distinction() {
        let by_key = Path::root().child("env").key("production");
        let by_property = Path::root().child("env").child("production");
        assert_ne!(by_key, by_property);
        assert_eq!(by_key.lookup_key(), by_property.lookup_key());
    }

    #[test]
    fn lookup_key_keeps_dotted_names_distinct() {
        let dotted = Path::root().key("a.b");
        let nested = Path::root().child("a").child("b");
        assert_ne!(dotted.lookup_key(), nested.lookup_key());
    }

    #[test]
    fn equality_follows_rendering() {
        let parsed: Path = "a.b".parse().expect("path should parse");
        let built = Path::root().child("a").child("b");
        assert_eq!(parsed, built);
    }
}
