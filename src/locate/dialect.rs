//! Dialect selection and the walker chosen for it.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use serde::Deserialize;

use super::diagnostic::render_diagnostic;
use super::error::LocateError;
use super::flat::FlatWalker;
use super::indent::IndentWalker;
use super::location::{LocationIndex, SourceLocation};
use super::markup::MarkupWalker;
use super::path::Path;
use super::walker::Walker;

/// The textual family a configuration source is written in.
///
/// Deserializes from lowercase names, with format names accepted as
/// aliases so host configuration can say `format: yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Indentation-nested block syntax.
    #[serde(alias = "yaml", alias = "yml")]
    Indentation,
    /// `key=value` lines with optional `[section]` headers.
    #[serde(
        alias = "properties",
        alias = "ini",
        alias = "toml",
        alias = "cfg",
        alias = "conf"
    )]
    Flat,
    /// Tag-nested markup.
    #[serde(alias = "xml")]
    Markup,
}

impl Dialect {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indentation => "indentation",
            Self::Flat => "flat",
            Self::Markup => "markup",
        }
    }

    /// Chooses a dialect from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::UnsupportedExtension`] when the path has no
    /// extension or an unrecognised one.
    ///
    /// # Examples
    ///
    ///     use camino::Utf8Path;
    ///     use configspan::locate::Dialect;
    ///
    ///     let dialect = Dialect::from_path(Utf8Path::new("deploy/app.yml")).unwrap();
    ///     assert_eq!(dialect, Dialect::Indentation);
    pub fn from_path(path: &Utf8Path) -> Result<Self, LocateError> {
        let dialect = match path.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("yaml" | "yml") => Some(Self::Indentation),
            Some("properties" | "ini" | "cfg" | "conf" | "toml") => Some(Self::Flat),
            Some("xml") => Some(Self::Markup),
            _ => None,
        };
        dialect.ok_or_else(|| LocateError::UnsupportedExtension {
            path: path.to_string(),
        })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indentation" | "yaml" | "yml" => Ok(Self::Indentation),
            "flat" | "properties" | "ini" | "toml" | "cfg" | "conf" => Ok(Self::Flat),
            "markup" | "xml" => Ok(Self::Markup),
            _ => Err(LocateError::UnknownDialect { name: s.to_owned() }),
        }
    }
}

/// A built index over one source text, for whichever dialect it uses.
#[derive(Debug, Clone)]
pub enum SourceIndex {
    /// Index built by [`IndentWalker`].
    Indentation(IndentWalker),
    /// Index built by [`FlatWalker`].
    Flat(FlatWalker),
    /// Index built by [`MarkupWalker`].
    Markup(MarkupWalker),
}

impl SourceIndex {
    /// Scans `content` with the walker for `dialect`.
    ///
    /// # Examples
    ///
    ///     use configspan::locate::{Dialect, Path, SourceIndex};
    ///
    ///     let index = SourceIndex::build(Dialect::Indentation, "database:\n  port: 5432\n");
    ///     let path = Path::parse("database.port").unwrap();
    ///     let location = index.find(&path).unwrap();
    ///     assert_eq!(location.line_number, 2);
    ///     assert_eq!(location.value_column(), Some(8));
    #[must_use]
    pub fn build(dialect: Dialect, content: &str) -> Self {
        match dialect {
            Dialect::Indentation => Self::Indentation(IndentWalker::index(content)),
            Dialect::Flat => Self::Flat(FlatWalker::index(content)),
            Dialect::Markup => Self::Markup(MarkupWalker::index(content)),
        }
    }

    /// Returns the dialect this index was built for.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::Indentation(_) => Dialect::Indentation,
            Self::Flat(_) => Dialect::Flat,
            Self::Markup(_) => Dialect::Markup,
        }
    }

    const fn walker(&self) -> &dyn Walker {
        match self {
            Self::Indentation(walker) => walker,
            Self::Flat(walker) => walker,
            Self::Markup(walker) => walker,
        }
    }

    /// Returns every recorded location.
    #[must_use]
    pub fn locations(&self) -> &LocationIndex {
        self.walker().locations()
    }

    /// Finds `path`, falling back to its nearest resolvable ancestor.
    #[must_use]
    pub fn find(&self, path: &Path) -> Option<Cow<'_, SourceLocation>> {
        self.walker().find(path)
    }

    /// Parses canonical path text and finds it.
    ///
    /// # Errors
    ///
    /// Returns a [`LocateError`] if `path` is not valid canonical path text.
    pub fn find_str(&self, path: &str) -> Result<Option<Cow<'_, SourceLocation>>, LocateError> {
        let parsed = Path::parse(path)?;
        Ok(self.find(&parsed))
    }

    /// Finds `path` and renders it as a diagnostic.
    ///
    /// Returns `None` when neither the path nor any ancestor appears in the
    /// source; callers then report the error without a location.
    #[must_use]
    pub fn render(&self, path: &Path, source: Option<&str>, hint: Option<&str>) -> Option<String> {
        let location = self.find(path)?;
        Some(render_diagnostic(&location, source, hint, None))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::yaml("app.yaml", Dialect::Indentation)]
    #[case::yml_upper("APP.YML", Dialect::Indentation)]
    #[case::properties("app.properties", Dialect::Flat)]
    #[case::ini("php.ini", Dialect::Flat)]
    #[case::toml("Cargo.toml", Dialect::Flat)]
    #[case::conf("nginx.conf", Dialect::Flat)]
    #[case::xml("pom.xml", Dialect::Markup)]
    fn extensions_select_dialects(#[case] path: &str, #[case] expected: Dialect) {
        assert_eq!(Dialect::from_path(Utf8Path::new(path)), Ok(expected));
    }

    #[rstest]
    #[case::unknown("notes.txt")]
    #[case::none("Makefile")]
    fn unknown_extensions_are_rejected(#[case] path: &str) {
        assert_eq!(
            Dialect::from_path(Utf8Path::new(path)),
            Err(LocateError::UnsupportedExtension {
                path: path.to_owned()
            })
        );
    }

    #[rstest]
    #[case::canonical("markup", Dialect::Markup)]
    #[case::alias(" YAML ", Dialect::Indentation)]
    #[case::format("properties", Dialect::Flat)]
    #[case::conf("conf", Dialect::Flat)]
    fn names_parse(#[case] name: &str, #[case] expected: Dialect) {
        assert_eq!(name.parse::<Dialect>(), Ok(expected));
    }

    #[derive(Debug, Deserialize)]
    struct HostConfig {
        format: Dialect,
    }

    #[rstest]
    #[case::canonical("format: flat\n", Dialect::Flat)]
    #[case::alias("format: yml\n", Dialect::Indentation)]
    #[case::format_name("format: xml\n", Dialect::Markup)]
    #[case::conf("format: conf\n", Dialect::Flat)]
    fn names_deserialize_from_host_config(#[case] text: &str, #[case] expected: Dialect) {
        let config: HostConfig =
            serde_saphyr::from_str(text).expect("host config should deserialize");
        assert_eq!(config.format, expected);
    }

    #[rstest]
    #[case::yaml("yaml")]
    #[case::yml("yml")]
    #[case::properties("properties")]
    #[case::ini("ini")]
    #[case::cfg("cfg")]
    #[case::conf("conf")]
    #[case::toml("toml")]
    #[case::xml("xml")]
    fn every_extension_is_also_a_dialect_name(#[case] extension: &str) {
        let from_extension = Dialect::from_path(Utf8Path::new(&format!("app.{extension}")));
        assert_eq!(extension.parse::<Dialect>(), from_extension);
        let config: HostConfig = serde_saphyr::from_str(&format!("format: {extension}\n"))
            .expect("host config should deserialize");
        assert_eq!(Ok(config.format), from_extension);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(
            "json".parse::<Dialect>(),
            Err(LocateError::UnknownDialect { .. })
        ));
    }

    #[test]
    fn display_uses_canonical_names() {
        assert_eq!(Dialect::Flat.to_string(), "flat");
        assert_eq!(SourceIndex::build(Dialect::Markup, "<a/>").dialect(), Dialect::Markup);
    }

    #[test]
    fn find_str_reports_malformed_paths() {
        let index = SourceIndex::build(Dialect::Flat, "a=1");
        assert!(index.find_str("a[").is_err());
        assert_eq!(
            index
                .find_str("a")
                .ok()
                .flatten()
                .and_then(|l| l.value_text().map(str::to_owned)),
            Some("1".to_owned())
        );
    }

    #[test]
    fn render_returns_none_for_unknown_paths() {
        let index = SourceIndex::build(Dialect::Indentation, "a: 1\n");
        assert_eq!(index.render(&Path::root().child("b"), None, None), None);
        assert_eq!(
            index.render(&Path::root().child("a"), Some("x.yaml"), None),
            Some(" --> x.yaml:1:4\n  |\n1 | a: 1\n  |    ^".to_owned())
        );
    }
}
