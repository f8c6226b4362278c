//! In-memory sources for tests and embedding.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::resolver::ResolveError;
use crate::sources::{HistorySource, VersionSource};

/// A catalog and history held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    versions: HashMap<String, Vec<String>>,
    history: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the known versions of `name`.
    pub fn with_versions<I, S>(mut self, name: &str, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions
            .insert(name.to_string(), versions.into_iter().map(Into::into).collect());
        self
    }

    /// Register annotate output for `name`'s descriptor.
    pub fn with_history(mut self, name: &str, annotate: impl Into<String>) -> Self {
        self.history.insert(name.to_string(), annotate.into());
        self
    }
}

impl VersionSource for MemorySource {
    fn versions(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        self.versions
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                package: name.to_string(),
                path: PathBuf::from("<memory>").join(name),
            })
    }
}

impl HistorySource for MemorySource {
    fn annotate(&self, name: &str) -> Result<String, ResolveError> {
        self.history
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::History {
                package: name.to_string(),
                message: "no history registered".to_string(),
            })
    }
}
