//! Source locations and the per-walker location index.

use indexmap::IndexMap;

use super::path::Path;

/// A token on a source line: its verbatim text and 0-based start column.
///
/// Columns count characters, not bytes, so carets line up under non-ASCII
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Verbatim token text, including any surrounding quotes.
    pub text: String,
    /// 0-based character column of the first character.
    pub column: usize,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(text: impl Into<String>, column: usize) -> Self {
        Self {
            text: text.into(),
            column,
        }
    }

    /// Returns the token width in characters.
    #[must_use]
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns the column one past the last character.
    #[must_use]
    pub fn end(&self) -> usize {
        self.column + self.width()
    }
}

/// Where a logical path lives in the original text.
///
/// `key` is absent for list items written without an inline key. `value`
/// is absent when the path names a container whose content sits on other
/// lines, or an element with nothing to underline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line_number: usize,
    /// The physical line, untrimmed.
    pub raw_line: String,
    /// The key token on this line, if any.
    pub key: Option<Token>,
    /// The scalar value token on this line, if any.
    pub value: Option<Token>,
}

impl SourceLocation {
    /// Creates a location with neither key nor value.
    #[must_use]
    pub fn new(line_number: usize, raw_line: impl Into<String>) -> Self {
        Self {
            line_number,
            raw_line: raw_line.into(),
            key: None,
            value: None,
        }
    }

    /// Sets the key token.
    #[must_use]
    pub fn with_key(mut self, key: Token) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets the value token.
    #[must_use]
    pub fn with_value(mut self, value: Token) -> Self {
        self.value = Some(value);
        self
    }

    /// Returns the key column, if a key token is present.
    #[must_use]
    pub fn key_column(&self) -> Option<usize> {
        self.key.as_ref().map(|key| key.column)
    }

    /// Returns the value column, if a value token is present.
    #[must_use]
    pub fn value_column(&self) -> Option<usize> {
        self.value.as_ref().map(|value| value.column)
    }

    /// Returns the key text, if present.
    #[must_use]
    pub fn key_text(&self) -> Option<&str> {
        self.key.as_ref().map(|key| key.text.as_str())
    }

    /// Returns the value text, if present.
    #[must_use]
    pub fn value_text(&self) -> Option<&str> {
        self.value.as_ref().map(|value| value.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    path: Path,
    location: SourceLocation,
}

/// Mapping from logical path to the location that last wrote it.
///
/// Entries iterate in first-seen document order. Re-inserting a path keeps
/// its position but replaces the location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationIndex {
    entries: IndexMap<String, Entry>,
}

impl LocationIndex {
    pub(crate) fn insert(&mut self, path: Path, location: SourceLocation) {
        if path.is_empty() {
            return;
        }
        self.entries
            .insert(path.lookup_key(), Entry { path, location });
    }

    /// Returns the location recorded for exactly `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&SourceLocation> {
        self.entries
            .get(&path.lookup_key())
            .map(|entry| &entry.location)
    }

    /// Returns `true` if `path` has a recorded location.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&path.lookup_key())
    }

    /// Returns the number of recorded paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over recorded paths and their locations.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &SourceLocation)> {
        self.entries
            .values()
            .map(|entry| (&entry.path, &entry.location))
    }
}
