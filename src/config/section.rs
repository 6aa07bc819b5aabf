//! `[assets]` and `[transform]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! namespace = "Simg"     # /Simg/<name>/<name>.<ext>
//! public_dir = "public"  # relative to the project root
//!
//! [transform]
//! tag = "Sim"
//! exclude = ["node_modules"]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where resolved assets are persisted and served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Path segment grouping every resolved asset, both on disk and in URLs.
    pub namespace: String,

    /// Public output root, resolved against the project root.
    pub public_dir: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            namespace: "Simg".into(),
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Which modules and elements the transform touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSection {
    /// JSX tag name of the placeholder element.
    pub tag: String,

    /// Module ids containing any of these markers are never transformed.
    pub exclude: Vec<String>,
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            tag: "Sim".into(),
            exclude: vec!["node_modules".into()],
        }
    }
}
