//! High-level operations.
//!
//! Scanning recipes, rewriting pins, and the file-level update command.

pub mod extract;
pub mod rewrite;
pub mod update_recipe;

pub use extract::{DependencyExtractor, ExclusionPolicy};
pub use rewrite::{Outcome, RecipeRewriter, Rewrite, RewriteReport};
pub use update_recipe::{
    find_recipes_dir, update_recipe, update_recipe_with, UpdateOptions, UpdateResult,
};
