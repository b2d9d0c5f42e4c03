//! The contract shared by the dialect walkers.

use std::borrow::Cow;

use super::location::{LocationIndex, SourceLocation};
use super::path::Path;

/// Builds a path-to-location index from one source snapshot and answers
/// lookups against it.
///
/// A walker scans its input once in [`Walker::index`] and never mutates the
/// resulting index, so a built walker may be shared across threads.
pub trait Walker {
    /// Scans `content` and builds the index.
    fn index(content: &str) -> Self
    where
        Self: Sized;

    /// Returns every location recorded during the scan.
    fn locations(&self) -> &LocationIndex;

    /// Resolves `path` exactly, without falling back to ancestors.
    ///
    /// Walkers that can synthesize locations not stored in the index (such
    /// as elements of a comma-separated value) override this.
    fn resolve(&self, path: &Path) -> Option<Cow<'_, SourceLocation>> {
        self.locations().get(path).map(Cow::Borrowed)
    }

    /// Resolves `path`, falling back to its nearest resolvable ancestor.
    ///
    /// Returns `None` only when neither the path nor any ancestor appears in
    /// the source.
    fn find(&self, path: &Path) -> Option<Cow<'_, SourceLocation>> {
        if let Some(location) = self.resolve(path) {
            return Some(location);
        }
        path.ancestors().find_map(|ancestor| {
            let location = self.resolve(&ancestor)?;
            tracing::trace!(requested = %path, resolved = %ancestor, "falling back to ancestor location");
            Some(location)
        })
    }
}
