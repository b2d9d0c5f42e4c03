//! Source-position tracking for configuration paths.
//!
//! A [`Walker`] scans one configuration text and records where every value
//! lives, keyed by canonical [`Path`]. Three dialects are understood:
//! indentation-nested blocks ([`IndentWalker`]), flat `key=value` files with
//! optional sections ([`FlatWalker`]), and tag-nested markup
//! ([`MarkupWalker`]). [`SourceIndex`] picks the walker for a [`Dialect`],
//! and [`Diagnostic`] renders a located error for the terminal.

mod diagnostic;
mod dialect;
mod error;
mod flat;
mod indent;
mod lines;
mod location;
mod markup;
mod path;
mod walker;

pub use diagnostic::{Diagnostic, Highlight, render_diagnostic};
pub use dialect::{Dialect, SourceIndex};
pub use error::LocateError;
pub use flat::FlatWalker;
pub use indent::IndentWalker;
pub use location::{LocationIndex, SourceLocation, Token};
pub use markup::MarkupWalker;
pub use path::{Path, PathSegment};
pub use walker::Walker;
