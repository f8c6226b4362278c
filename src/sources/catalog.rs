//! Recipe catalog - version descriptors on disk.
//!
//! Each dependency has a directory under the recipes root holding a YAML
//! descriptor whose `versions` mapping lists every known version:
//!
//! ```yaml
//! versions:
//!   "1.3.1":
//!     folder: all
//!   "1.2.13":
//!     folder: all
//! ```

use std::path::PathBuf;

use serde_yaml::Value;

use crate::resolver::ResolveError;
use crate::sources::VersionSource;
use crate::util::config::DEFAULT_DESCRIPTOR;

/// How descriptors are laid out under the recipes root.
#[derive(Debug, Clone)]
pub struct RecipeLayout {
    recipes_dir: PathBuf,
    descriptor: String,
}

impl RecipeLayout {
    pub fn new(recipes_dir: impl Into<PathBuf>, descriptor: impl Into<String>) -> Self {
        RecipeLayout {
            recipes_dir: recipes_dir.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Descriptor path for `name`: `<recipes_dir>/<name>/<descriptor>`.
    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.recipes_dir.join(name).join(&self.descriptor)
    }
}

impl Default for RecipeLayout {
    fn default() -> Self {
        RecipeLayout::new("recipes", DEFAULT_DESCRIPTOR)
    }
}

/// Version catalog backed by descriptor files.
#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    layout: RecipeLayout,
}

impl RecipeCatalog {
    pub fn new(layout: RecipeLayout) -> Self {
        RecipeCatalog { layout }
    }
}

impl VersionSource for RecipeCatalog {
    fn versions(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let path = self.layout.descriptor_path(name);
        if !path.is_file() {
            return Err(ResolveError::NotFound {
                package: name.to_string(),
                path,
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ResolveError::Parse {
            package: name.to_string(),
            message: format!("failed to read {}: {}", path.display(), e),
        })?;

        parse_versions(name, &content)
    }
}

/// Extract the keys of the `versions` mapping, in file order.
pub fn parse_versions(name: &str, content: &str) -> Result<Vec<String>, ResolveError> {
    let parse_error = |message: String| ResolveError::Parse {
        package: name.to_string(),
        message,
    };

    let doc: Value = serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

    let versions = doc
        .get("versions")
        .and_then(Value::as_mapping)
        .ok_or_else(|| parse_error("missing `versions` mapping".to_string()))?;

    versions
        .keys()
        .map(|key| match key {
            Value::String(s) => Ok(s.clone()),
            // Unquoted `1.10` reads as the float 1.1, so only integers are safe.
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
            Value::Number(n) => Err(parse_error(format!(
                "version key `{}` must be quoted; unquoted it reads as a float",
                n
            ))),
            other => Err(parse_error(format!("unsupported version key: {:?}", other))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: &str = r#"versions:
  "1.3.1":
    folder: all
  "1.2.13":
    folder: all
  "cci.20201225":
    folder: all
"#;

    #[test]
    fn test_parse_versions_keeps_order() {
        let versions = parse_versions("zlib", CONFIG).unwrap();
        assert_eq!(versions, ["1.3.1", "1.2.13", "cci.20201225"]);
    }

    #[test]
    fn test_numeric_keys_are_rendered() {
        let versions = parse_versions("foo", "versions:\n  2:\n    folder: all\n").unwrap();
        assert_eq!(versions, ["2"]);
    }

    #[test]
    fn test_unquoted_float_keys_are_rejected() {
        let content = "versions:\n  1.9:\n    folder: all\n  1.10:\n    folder: all\n";

        match parse_versions("foo", content).unwrap_err() {
            ResolveError::Parse { package, message } => {
                assert_eq!(package, "foo");
                assert!(message.contains("must be quoted"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_versions_mapping() {
        let err = parse_versions("foo", "sources: {}\n").unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));
    }

    #[test]
    fn test_catalog_reads_descriptor() {
        let tmp = TempDir::new().unwrap();
        let layout = RecipeLayout::new(tmp.path(), "config.yml");
        std::fs::create_dir_all(tmp.path().join("zlib")).unwrap();
        std::fs::write(layout.descriptor_path("zlib"), CONFIG).unwrap();

        let catalog = RecipeCatalog::new(layout);
        assert_eq!(catalog.versions("zlib").unwrap().len(), 3);
    }

    #[test]
    fn test_catalog_missing_descriptor() {
        let tmp = TempDir::new().unwrap();
        let catalog = RecipeCatalog::new(RecipeLayout::new(tmp.path(), "config.yml"));

        match catalog.versions("nope").unwrap_err() {
            ResolveError::NotFound { package, path } => {
                assert_eq!(package, "nope");
                assert_eq!(path, tmp.path().join("nope").join("config.yml"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
