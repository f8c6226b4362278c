//! Version sources.
//!
//! Sources supply the known versions of a dependency and, for free-form
//! version sets, the history used to order them.

pub mod catalog;
pub mod history;
pub mod memory;
pub mod source;

pub use catalog::{RecipeCatalog, RecipeLayout};
pub use history::GitBlameHistory;
pub use memory::MemorySource;
pub use source::{HistorySource, VersionSource};
