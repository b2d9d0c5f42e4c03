//! Line and column helpers shared by the dialect walkers.
//!
//! Walkers track byte offsets while scanning and convert them to character
//! columns only when building a [`Token`].

use super::location::Token;

/// Returns the number of leading spaces and tabs.
pub(crate) fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| matches!(c, ' ' | '\t')).count()
}

/// Converts a byte offset within `line` to a character column.
pub(crate) fn char_column(line: &str, byte_offset: usize) -> usize {
    line.get(..byte_offset)
        .map_or_else(|| line.chars().count(), |prefix| prefix.chars().count())
}

/// Builds a token for `text` starting at `byte_offset` within `line`.
pub(crate) fn token_at(line: &str, byte_offset: usize, text: &str) -> Token {
    Token::new(text, char_column(line, byte_offset))
}

/// Byte offset of `part` within `whole`; `part` must be a subslice of it.
pub(crate) fn offset_in(whole: &str, part: &str) -> usize {
    (part.as_ptr() as usize).saturating_sub(whole.as_ptr() as usize)
}

/// Returns `true` when `text` is wrapped in matching single or double quotes.
pub(crate) fn is_quoted(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')))
}

/// Strips one layer of matching quotes.
pub(crate) fn unquote(text: &str) -> &str {
    if is_quoted(text) {
        let mut chars = text.chars();
        chars.next();
        chars.next_back();
        chars.as_str()
    } else {
        text
    }
}

/// Returns the byte length of a quoted run starting at the front of `text`,
/// including both quotes, or `None` if `text` does not open a quote or the
/// quote is never closed.
pub(crate) fn quoted_len(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (_, quote) = chars.next().filter(|&(_, c)| matches!(c, '"' | '\''))?;
    let mut escaped = false;
    for (offset, c) in chars {
        if escaped {
            escaped = false;
        } else if c == '\\' && quote == '"' {
            escaped = true;
        } else if c == quote {
            return Some(offset + c.len_utf8());
        }
    }
    None
}

/// One element of a comma-separated list, trimmed of surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Element<'a> {
    /// Byte offset of the trimmed text within the split input.
    pub(crate) offset: usize,
    pub(crate) text: &'a str,
}

/// Splits `list` on top-level commas.
///
/// Commas inside quotes or nested brackets do not split. Empty elements,
/// including one after a trailing comma, are kept as zero-length text at
/// the position they would occupy.
pub(crate) fn split_elements(list: &str) -> Vec<Element<'_>> {
    let mut elements = Vec::new();
    let mut start = 0;
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in list.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && open == '"' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                elements.push(element(list, start, offset));
                start = offset + 1;
            }
            _ => {}
        }
    }
    elements.push(element(list, start, list.len()));
    elements
}

fn element(list: &str, start: usize, end: usize) -> Element<'_> {
    let raw = list.get(start..end).unwrap_or_default();
    let leading = raw.len() - raw.trim_start().len();
    Element {
        offset: start + leading,
        text: raw.trim(),
    }
}

/// Byte offsets of line starts, for mapping offsets in a whole document.
#[derive(Debug, Clone)]
pub(crate) struct LineMap<'a> {
    content: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineMap<'a> {
    pub(crate) fn new(content: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            content
                .char_indices()
                .filter(|&(_, c)| c == '\n')
                .map(|(offset, _)| offset + 1),
        );
        Self {
            content,
            line_starts,
        }
    }

    /// Returns the 0-based line index containing `offset`.
    pub(crate) fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    /// Returns the line text without its terminator.
    pub(crate) fn line(&self, line_index: usize) -> &'a str {
        let Some(&start) = self.line_starts.get(line_index) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line_index + 1)
            .map_or(self.content.len(), |next| next.saturating_sub(1));
        let line = self.content.get(start..end).unwrap_or_default();
        line.strip_suffix('\r').unwrap_or(line)
    }

    /// Returns the byte offset of `offset` within its line.
    pub(crate) fn line_offset(&self, offset: usize) -> usize {
        let start = self
            .line_starts
            .get(self.line_index(offset))
            .copied()
            .unwrap_or_default();
        offset.saturating_sub(start)
    }

    pub(crate) fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn texts(list: &str) -> Vec<(usize, &str)> {
        split_elements(list)
            .into_iter()
            .map(|e| (e.offset, e.text))
            .collect()
    }

    #[test]
    fn splits_plain_elements_with_offsets() {
        assert_eq!(
            texts("alpha,beta,gamma"),
            vec![(0, "alpha"), (6, "beta"), (11, "gamma")]
        );
    }

    #[test]
    fn keeps_empty_and_trailing_elements() {
        assert_eq!(texts("a,,b,"), vec![(0, "a"), (2, ""), (3, "b"), (5, "")]);
    }

    #[test]
    fn trims_whitespace_around_elements() {
        assert_eq!(texts("80, 443"), vec![(0, "80"), (4, "443")]);
    }

    #[test]
    fn quoted_and_nested_commas_do_not_split() {
        assert_eq!(
            texts(r#""a,b", [1,2], c"#),
            vec![(0, r#""a,b""#), (7, "[1,2]"), (14, "c")]
        );
    }

    #[rstest]
    #[case::double("\"abc\" tail", Some(5))]
    #[case::single("'a b'", Some(5))]
    #[case::escaped_quote(r#""a\"b""#, Some(6))]
    #[case::unterminated("\"abc", None)]
    #[case::plain("abc", None)]
    fn measures_quoted_runs(#[case] text: &str, #[case] expected: Option<usize>) {
        assert_eq!(quoted_len(text), expected);
    }

    #[test]
    fn columns_count_characters() {
        let line = "né: 1";
        let byte = line.find('1').expect("digit present");
        assert_eq!(char_column(line, byte), 4);
    }

    #[test]
    fn line_map_resolves_offsets() {
        let content = "<a>\r\n  <b/>\n</a>";
        let map = LineMap::new(content);
        let offset = content.find("<b").expect("tag present");
        assert_eq!(map.line_index(offset), 1);
        assert_eq!(map.line(1), "  <b/>");
        assert_eq!(map.line(0), "<a>");
        assert_eq!(map.line_offset(offset), 2);
        assert_eq!(map.line_count(), 3);
    }
}
