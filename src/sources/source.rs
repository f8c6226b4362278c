//! Source traits - where version sets and their history come from.

use crate::resolver::ResolveError;

/// A catalog of known versions, addressed by dependency name.
pub trait VersionSource {
    /// All known version identifiers for `name`, in catalog order.
    ///
    /// Fails with [`ResolveError::NotFound`] when `name` has no descriptor.
    fn versions(&self, name: &str) -> Result<Vec<String>, ResolveError>;
}

/// Per-line change history of a dependency's descriptor.
pub trait HistorySource {
    /// Annotate (`git blame -e`) output for the descriptor of `name`.
    fn annotate(&self, name: &str) -> Result<String, ResolveError>;
}
