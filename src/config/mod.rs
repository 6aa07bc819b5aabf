//! Project configuration management for `simg.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section    # [assets] and [transform]
//! ├── error      # ConfigError
//! ├── util       # config file lookup, path normalization
//! └── mod.rs     # SimgConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section       | Purpose                                         |
//! |---------------|-------------------------------------------------|
//! | `[assets]`    | Asset namespace and public output directory     |
//! | `[transform]` | Placeholder tag name and excluded module ids    |
//!
//! A missing `simg.toml` is not an error: the project root becomes the
//! current directory and every section takes its defaults.

mod error;
mod section;
mod util;

pub use error::ConfigError;
pub use section::{AssetsConfig, TransformSection};
pub use util::{find_config_file, normalize_path};

use crate::cli::Cli;
use crate::log;
use crate::transform::TransformConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing simg.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimgConfig {
    /// Absolute path to the config file, empty when none was found (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Asset output settings
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Transform settings
    #[serde(default)]
    pub transform: TransformSection,
}

impl SimgConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root is
    /// the config file's parent directory, or cwd when there is none.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = normalize_path(&path);
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                let mut config = Self::default();
                config.root = std::env::current_dir()
                    .map_err(|err| ConfigError::Io(PathBuf::from("."), err))?;
                config
            }
        };

        config.apply_cli(cli);
        config.root = normalize_path(&config.root);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// CLI flags override the file.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.public_dir {
            self.assets.public_dir = dir.clone();
        }
        if let Some(namespace) = &cli.namespace {
            self.assets.namespace = namespace.clone();
        }
    }

    /// Check values that would produce broken paths or match nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let namespace = self.assets.namespace.trim_matches('/');
        if namespace.is_empty() {
            return Err(ConfigError::Validation("[assets] namespace is empty".into()));
        }
        if namespace.contains('/') || namespace.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "[assets] namespace `{}` must be a single path segment",
                self.assets.namespace
            )));
        }
        if self.transform.tag.trim().is_empty() {
            return Err(ConfigError::Validation("[transform] tag is empty".into()));
        }
        Ok(())
    }

    /// Absolute public output directory.
    pub fn public_dir(&self) -> PathBuf {
        self.root.join(&self.assets.public_dir)
    }

    /// Settings handed to the transformer.
    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            root: self.root.clone(),
            public_dir: self.public_dir(),
            namespace: self.assets.namespace.trim_matches('/').to_string(),
            tag: self.transform.tag.clone(),
            exclude: self.transform.exclude.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SimgConfig::from_str("").unwrap();
        assert_eq!(config.assets, AssetsConfig::default());
        assert_eq!(config.transform, TransformSection::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let config = SimgConfig::from_str(
            r#"
            [assets]
            namespace = "images"
            public_dir = "static"

            [transform]
            tag = "Img"
            exclude = ["node_modules", ".cache"]
            "#,
        )
        .unwrap();
        assert_eq!(config.assets.namespace, "images");
        assert_eq!(config.assets.public_dir, PathBuf::from("static"));
        assert_eq!(config.transform.tag, "Img");
        assert_eq!(config.transform.exclude.len(), 2);
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let (config, ignored) = SimgConfig::parse_with_ignored(
            r#"
            [assets]
            namespace = "Simg"
            cache = true
            "#,
        )
        .unwrap();
        assert_eq!(config.assets.namespace, "Simg");
        assert_eq!(ignored, vec!["assets.cache".to_string()]);
    }

    #[test]
    fn test_invalid_toml() {
        let err = SimgConfig::from_str("[assets\nnamespace = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_validate_rejects_nested_namespace() {
        let mut config = SimgConfig::default();
        config.assets.namespace = "a/b".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.assets.namespace = "/".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_empty_tag() {
        let mut config = SimgConfig::default();
        config.transform.tag = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transform_config_paths() {
        let mut config = SimgConfig::default();
        config.root = PathBuf::from("/project");
        config.assets.namespace = "/Simg/".into();

        let transform = config.transform_config();
        assert_eq!(transform.public_dir, PathBuf::from("/project/public"));
        assert_eq!(transform.namespace, "Simg");
        assert_eq!(transform.tag, "Sim");
    }
}
