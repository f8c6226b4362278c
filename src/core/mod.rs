//! Core data types.

pub mod declaration;
pub mod resolved;

pub use declaration::DependencyDeclaration;
pub use resolved::{ResolvedVersion, Strategy};
