//! Error types for path parsing and dialect selection.
//!
//! A path that is absent from the source is not an error: lookups report it
//! as `None`. These variants cover malformed caller input only.

/// Errors raised while interpreting caller-supplied paths or dialect names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    /// The canonical path text was empty.
    #[error("path must not be empty")]
    EmptyPath,

    /// The canonical path text could not be parsed.
    #[error("invalid path at character {position}: {reason}")]
    InvalidPath {
        /// 0-based character offset of the offending input.
        position: usize,
        /// A human-readable explanation of the problem.
        reason: String,
    },

    /// A dialect name did not match any known dialect.
    #[error("unknown source dialect '{name}'")]
    UnknownDialect {
        /// The name that failed to match.
        name: String,
    },

    /// A file extension could not be mapped to a dialect.
    #[error("no source dialect is registered for '{path}'")]
    UnsupportedExtension {
        /// The file path whose extension was inspected.
        path: String,
    },
}

impl LocateError {
    pub(crate) fn invalid_path(position: usize, reason: &str) -> Self {
        Self::InvalidPath {
            position,
            reason: reason.to_owned(),
        }
    }
}
