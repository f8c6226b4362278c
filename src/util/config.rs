//! Configuration file support for pinbump.
//!
//! pinbump reads up to three configuration files:
//! - Global: `~/.pinbump/config.toml` - User-wide defaults
//! - Project: `.pinbump/config.toml` - Per-checkout settings
//! - Explicit: `--config <FILE>` on the command line
//!
//! Later files take precedence. Every field is optional; unset fields fall
//! back to the built-in policy. A relative `recipes_dir` is resolved against
//! the directory of the file that sets it.
//!
//! ## Example config.toml
//!
//! ```toml
//! [catalog]
//! recipes_dir = "recipes"
//! descriptor = "config.yml"
//!
//! [extract]
//! excluded_names = ["lib", "include", "bin", "src"]
//! skip_file_like_versions = true
//!
//! [resolve]
//! sentinels = ["system", "cci.latest"]
//! strip_prefixes = ["cci."]
//!
//! [overrides]
//! cmake = { floor = "major-minor" }
//! openssl = { range = "[>=1.1 <4]" }
//! meson = "exact"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ops::extract::ExclusionPolicy;
use crate::resolver::overrides::{FloorPrecision, OverrideRule};
use crate::resolver::ResolvePolicy;

/// Default descriptor file name inside `<recipes_dir>/<name>/`.
pub const DEFAULT_DESCRIPTOR: &str = "config.yml";

/// Names that are common path segments rather than dependencies.
///
/// `cmake` is deliberately absent: it is also a tool dependency with an
/// override rule, so `"cmake/3.24.0"` must stay visible.
pub const DEFAULT_EXCLUDED_NAMES: &[&str] =
    &["lib", "include", "bin", "src", "share", "etc", "doc", "res", ".", ".."];

/// Declared versions that opt a dependency out of resolution.
pub const DEFAULT_SENTINELS: &[&str] = &["system", "cci.latest"];

/// Prefixes ignored when comparing free-form versions.
pub const DEFAULT_STRIP_PREFIXES: &[&str] = &["cci."];

/// pinbump configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where version descriptors live
    pub catalog: CatalogConfig,

    /// Declaration scanning
    pub extract: ExtractConfig,

    /// Ranking
    pub resolve: ResolveConfig,

    /// Per-dependency override rules, merged by name
    pub overrides: BTreeMap<String, OverrideRule>,
}

/// Catalog location settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root containing one directory per dependency
    pub recipes_dir: Option<PathBuf>,

    /// Descriptor file name within each dependency directory
    pub descriptor: Option<String>,
}

/// Declaration scanning settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Names never treated as dependencies (path segments)
    pub excluded_names: Option<Vec<String>>,

    /// Skip versions that look like file names (`readme.txt`)
    pub skip_file_like_versions: Option<bool>,
}

/// Ranking settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Declared versions that skip resolution
    pub sentinels: Option<Vec<String>>,

    /// Prefixes stripped before lenient version comparison
    pub strip_prefixes: Option<Vec<String>>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// A relative `recipes_dir` is taken relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config = Self::parse(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let (Some(dir), Some(base)) = (config.catalog.recipes_dir.as_mut(), path.parent()) {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }

        Ok(config)
    }

    /// Parse configuration from TOML content.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.catalog.recipes_dir.is_some() {
            self.catalog.recipes_dir = other.catalog.recipes_dir;
        }
        if other.catalog.descriptor.is_some() {
            self.catalog.descriptor = other.catalog.descriptor;
        }

        if other.extract.excluded_names.is_some() {
            self.extract.excluded_names = other.extract.excluded_names;
        }
        if other.extract.skip_file_like_versions.is_some() {
            self.extract.skip_file_like_versions = other.extract.skip_file_like_versions;
        }

        if other.resolve.sentinels.is_some() {
            self.resolve.sentinels = other.resolve.sentinels;
        }
        if other.resolve.strip_prefixes.is_some() {
            self.resolve.strip_prefixes = other.resolve.strip_prefixes;
        }

        self.overrides.extend(other.overrides);
    }

    /// Descriptor file name, e.g. `config.yml`.
    pub fn descriptor(&self) -> &str {
        self.catalog.descriptor.as_deref().unwrap_or(DEFAULT_DESCRIPTOR)
    }

    /// Effective exclusion policy for the extractor.
    pub fn exclusion_policy(&self) -> ExclusionPolicy {
        ExclusionPolicy {
            excluded_names: self
                .extract
                .excluded_names
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_EXCLUDED_NAMES))
                .into_iter()
                .collect(),
            skip_file_like_versions: self.extract.skip_file_like_versions.unwrap_or(true),
        }
    }

    /// Effective ranking policy for the resolver.
    pub fn resolve_policy(&self) -> ResolvePolicy {
        ResolvePolicy {
            sentinels: self
                .resolve
                .sentinels
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_SENTINELS)),
            strip_prefixes: self
                .resolve
                .strip_prefixes
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_STRIP_PREFIXES)),
        }
    }

    /// Built-in override rules with configured rules layered on top.
    ///
    /// Rules set to `"exact"` are dropped, which restores plain pinning.
    pub fn override_rules(&self) -> BTreeMap<String, OverrideRule> {
        let mut rules = BTreeMap::from([
            (
                "cmake".to_string(),
                OverrideRule::Floor(FloorPrecision::MajorMinor),
            ),
            (
                "openssl".to_string(),
                OverrideRule::Range("[>=1.1 <4]".to_string()),
            ),
        ]);
        rules.extend(self.overrides.clone());
        rules.retain(|_, rule| *rule != OverrideRule::Exact);
        rules
    }
}

/// Load merged configuration from global, project and explicit locations.
///
/// Order of precedence (highest to lowest):
/// 1. Explicit config (`--config`), which must exist and parse
/// 2. Project config (.pinbump/config.toml)
/// 3. Global config (~/.pinbump/config.toml)
/// 4. Defaults
pub fn load_config(
    global_path: Option<&Path>,
    project_path: &Path,
    explicit_path: Option<&Path>,
) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    if let Some(explicit_path) = explicit_path {
        config.merge(Config::load(explicit_path)?);
    }

    Ok(config)
}

/// Get the global pinbump config directory (~/.pinbump).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".pinbump"))
}

/// Get the global config path (~/.pinbump/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.pinbump/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".pinbump").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.descriptor(), "config.yml");

        let exclusion = config.exclusion_policy();
        assert!(exclusion.excluded_names.contains("include"));
        assert!(exclusion.excluded_names.contains(".."));
        assert!(exclusion.skip_file_like_versions);

        let policy = config.resolve_policy();
        assert_eq!(policy.sentinels, vec!["system", "cci.latest"]);
        assert_eq!(policy.strip_prefixes, vec!["cci."]);

        let rules = config.override_rules();
        assert_eq!(
            rules.get("cmake"),
            Some(&OverrideRule::Floor(FloorPrecision::MajorMinor))
        );
        assert_eq!(
            rules.get("openssl"),
            Some(&OverrideRule::Range("[>=1.1 <4]".to_string()))
        );
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::parse(
            r#"
[overrides]
cmake = { floor = "major" }
meson = { range = "[>=1.2]" }
openssl = "exact"
"#,
        )
        .unwrap();

        let rules = config.override_rules();
        assert_eq!(
            rules.get("cmake"),
            Some(&OverrideRule::Floor(FloorPrecision::Major))
        );
        assert_eq!(
            rules.get("meson"),
            Some(&OverrideRule::Range("[>=1.2]".to_string()))
        );
        assert!(!rules.contains_key("openssl"));
    }

    #[test]
    fn test_merge_precedence() {
        let mut base = Config::parse(
            r#"
[catalog]
recipes_dir = "/srv/recipes"

[resolve]
sentinels = ["system"]
"#,
        )
        .unwrap();

        let other = Config::parse(
            r#"
[catalog]
descriptor = "versions.yml"

[resolve]
sentinels = ["system", "latest"]
"#,
        )
        .unwrap();

        base.merge(other);

        assert_eq!(base.catalog.recipes_dir, Some(PathBuf::from("/srv/recipes")));
        assert_eq!(base.descriptor(), "versions.yml");
        assert_eq!(base.resolve_policy().sentinels, vec!["system", "latest"]);
    }

    #[test]
    fn test_load_config_layers() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());
        let explicit = tmp.path().join("explicit.toml");

        std::fs::write(&global, "[extract]\nskip_file_like_versions = false\n").unwrap();
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[catalog]\ndescriptor = \"project.yml\"\n").unwrap();
        std::fs::write(&explicit, "[catalog]\ndescriptor = \"explicit.yml\"\n").unwrap();

        let config = load_config(Some(&global), &project, Some(&explicit)).unwrap();

        assert!(!config.exclusion_policy().skip_file_like_versions);
        assert_eq!(config.descriptor(), "explicit.yml");
    }

    #[test]
    fn test_relative_recipes_dir_is_anchored_at_the_config_file() {
        let tmp = TempDir::new().unwrap();
        let project = project_config_path(tmp.path());
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[catalog]\nrecipes_dir = \"../recipes\"\n").unwrap();

        let config = Config::load(&project).unwrap();
        assert_eq!(
            config.catalog.recipes_dir,
            Some(tmp.path().join(".pinbump").join("../recipes"))
        );
    }

    #[test]
    fn test_absolute_recipes_dir_is_kept() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("explicit.toml");
        std::fs::write(&explicit, "[catalog]\nrecipes_dir = \"/srv/recipes\"\n").unwrap();

        let config = Config::load(&explicit).unwrap();
        assert_eq!(config.catalog.recipes_dir, Some(PathBuf::from("/srv/recipes")));
    }

    #[test]
    fn test_invalid_optional_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("config.toml");
        std::fs::write(&project, "this is [not toml").unwrap();

        let config = load_config(None, &project, None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_explicit_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("explicit.toml");
        std::fs::write(&explicit, "this is [not toml").unwrap();

        let missing = tmp.path().join("missing.toml");
        assert!(load_config(None, &missing, Some(&explicit)).is_err());
    }
}
