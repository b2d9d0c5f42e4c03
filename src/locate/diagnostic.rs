//! Compiler-style rendering of a [`SourceLocation`].
//!
//! Every dialect shares this formatter. A rendered diagnostic looks like:
//!
//! ```text
//!  --> config.yaml:5:11
//!   |
//! 5 |     port: bad
//!   |           ^^^ expected an integer
//! ```

use std::fmt;

use super::location::{SourceLocation, Token};

/// A sub-range of a value token to underline instead of the whole value.
///
/// `offset` counts characters of the unquoted value: when the token starts
/// with a quote, the quote is skipped before the offset is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    /// Character offset into the unquoted value.
    pub offset: usize,
    /// Number of characters to underline.
    pub length: usize,
}

/// A diagnostic ready to render.
#[derive(Debug, Clone, Copy)]
pub struct Diagnostic<'a> {
    location: &'a SourceLocation,
    source: Option<&'a str>,
    hint: Option<&'a str>,
    highlight: Option<Highlight>,
}

impl<'a> Diagnostic<'a> {
    /// Creates a diagnostic for `location` with no label, hint, or highlight.
    #[must_use]
    pub const fn new(location: &'a SourceLocation) -> Self {
        Self {
            location,
            source: None,
            hint: None,
            highlight: None,
        }
    }

    /// Sets the file label shown in the header.
    #[must_use]
    pub const fn with_source(self, source: &'a str) -> Self {
        Self {
            source: Some(source),
            ..self
        }
    }

    /// Sets the hint appended after the carets.
    #[must_use]
    pub const fn with_hint(self, hint: &'a str) -> Self {
        Self {
            hint: Some(hint),
            ..self
        }
    }

    /// Underlines only part of the value token.
    #[must_use]
    pub const fn with_highlight(self, offset: usize, length: usize) -> Self {
        Self {
            highlight: Some(Highlight { offset, length }),
            ..self
        }
    }

    /// Returns the 0-based start column and width of the underline.
    ///
    /// The value span is preferred, then the key span, then the trimmed
    /// line.
    #[must_use]
    pub fn underline(&self) -> (usize, usize) {
        if let Some(value) = &self.location.value {
            return value_span(value, self.highlight);
        }
        if let Some(key) = &self.location.key {
            return (key.column, key.width());
        }
        let raw = self.location.raw_line.as_str();
        let start = raw.chars().take_while(|c| c.is_whitespace()).count();
        (start, raw.trim().chars().count())
    }

    /// Renders the header, excerpt and caret lines.
    #[must_use]
    pub fn render(&self) -> String {
        let (start, width) = self.underline();
        let line_number = self.location.line_number.to_string();
        let gutter = " ".repeat(line_number.len());

        let mut out = String::from(" --> ");
        if let Some(source) = self.source {
            out.push_str(source);
            out.push(':');
        }
        out.push_str(&format!("{line_number}:{}\n", start + 1));
        out.push_str(&format!("{gutter} |\n"));
        out.push_str(&format!("{line_number} | {}\n", self.location.raw_line));
        out.push_str(&format!(
            "{gutter} | {}{}",
            " ".repeat(start),
            "^".repeat(width.max(1))
        ));
        if let Some(hint) = self.hint {
            out.push(' ');
            out.push_str(hint);
        }
        out
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Renders `location` in one call.
///
/// `highlight` is an `(offset, length)` pair within the unquoted value.
///
/// # Examples
///
///     use configspan::locate::{SourceLocation, Token, render_diagnostic};
///
///     let location = SourceLocation::new(1, "age: thirty")
///         .with_key(Token::new("age", 0))
///         .with_value(Token::new("thirty", 5));
///     let text = render_diagnostic(&location, Some("app.yaml"), Some("expected a number"), None);
///     assert_eq!(
///         text,
///         " --> app.yaml:1:6\n  |\n1 | age: thirty\n  |      ^^^^^^ expected a number"
///     );
#[must_use]
pub fn render_diagnostic(
    location: &SourceLocation,
    source: Option<&str>,
    hint: Option<&str>,
    highlight: Option<(usize, usize)>,
) -> String {
    let mut diagnostic = Diagnostic::new(location);
    if let Some(label) = source {
        diagnostic = diagnostic.with_source(label);
    }
    if let Some(text) = hint {
        diagnostic = diagnostic.with_hint(text);
    }
    if let Some((offset, length)) = highlight {
        diagnostic = diagnostic.with_highlight(offset, length);
    }
    diagnostic.render()
}

fn value_span(value: &Token, highlight: Option<Highlight>) -> (usize, usize) {
    let width = value.width();
    let Some(Highlight { offset, length }) = highlight else {
        return (value.column, width);
    };
    let quoted = value.text.starts_with(['"', '\'']);
    let start = offset + usize::from(quoted);
    if start >= width {
        return (value.column, width);
    }
    (value.column + start, length.min(width - start))
}
