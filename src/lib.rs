//! pinbump - refresh pinned dependency versions inside build recipes
//!
//! This crate scans recipe text for `"name/version"` pins, resolves the
//! latest version of each dependency from its catalog, and rewrites the
//! pins in place.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

pub use core::{DependencyDeclaration, ResolvedVersion, Strategy};
pub use ops::{DependencyExtractor, RecipeRewriter};
pub use resolver::{ResolveError, Resolver};
pub use util::context::GlobalContext;
