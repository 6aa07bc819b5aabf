//! Asset resolution for placeholder elements.
//!
//! # Modules
//!
//! - [`reference`]: `src` classification and location
//! - [`source`]: byte retrieval (disk, HTTP)
//! - [`store`]: on-disk layout and persistence
//!
//! For each element the resolver derives the asset's name and extension,
//! fetches its bytes, persists them and reports where they are served from.
//! Nothing is cached: the same `src` in two elements is fetched twice.

pub mod reference;
pub mod source;
pub mod store;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

pub use reference::{AssetLocation, SourceRef};
pub use source::{AssetSource, DefaultSource, FetchError, FileSource, HttpSource};
pub use store::AssetStore;

/// Name and extension derived from a source reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName {
    /// Basename up to its first `.`.
    pub name: String,
    /// `.`-prefixed extension of the basename, or empty.
    pub extension: String,
}

impl AssetName {
    /// Derive the asset name from a `src` value.
    ///
    /// Query strings and fragments never leak into either part:
    /// `https://x.dev/img/a.min.png?v=2` gives `a` and `.png`.
    pub fn parse(reference: &str) -> Self {
        let path = reference::strip_suffixes(reference);
        let base = path.rsplit(['/', '\\']).next().unwrap_or(path);

        let name = base.split('.').next().unwrap_or_default().to_string();
        let extension = match base.rfind('.') {
            Some(0) | None => String::new(),
            Some(pos) => base[pos..].to_string(),
        };
        Self { name, extension }
    }
}

/// Everything known about a persisted asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub name: String,
    pub extension: String,
    pub local_path: PathBuf,
    /// `/<namespace>/<name>/<name><ext>`
    pub public_url: String,
    namespace: String,
}

impl AssetRecord {
    /// `/<namespace>/<name>/<name>-<W>x<H><ext>`
    pub fn dimensioned_url(&self, width: f64, height: f64) -> String {
        format!(
            "/{}/{}/{}-{}x{}{}",
            self.namespace, self.name, self.name, width, height, self.extension
        )
    }
}

/// Per-element resolution failures.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot derive an asset name from `{0}`")]
    EmptyName(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("cannot write `{0}`")]
    Persist(PathBuf, #[source] std::io::Error),
}

/// Fetches and persists the asset behind a `src` value.
#[derive(Clone)]
pub struct AssetResolver {
    root: PathBuf,
    store: AssetStore,
    source: Arc<dyn AssetSource>,
}

impl AssetResolver {
    pub fn new(root: impl Into<PathBuf>, store: AssetStore, source: Arc<dyn AssetSource>) -> Self {
        Self {
            root: root.into(),
            store,
            source,
        }
    }

    /// Resolve one `src` value found in a module located in `module_dir`.
    pub async fn resolve(&self, src: &str, module_dir: &Path) -> Result<AssetRecord, ResolveError> {
        let name = AssetName::parse(src);
        if name.name.is_empty() {
            return Err(ResolveError::EmptyName(src.to_string()));
        }

        let location = SourceRef::parse(src).locate(&self.root, module_dir)?;
        let bytes = self.source.fetch(&location).await?;

        let record = self.store.record(name);
        self.store
            .persist(&record, &bytes)
            .await
            .map_err(|err| ResolveError::Persist(record.local_path.clone(), err))?;

        crate::debug!("asset"; "{} -> {} ({} bytes)", src, record.public_url, bytes.len());
        Ok(record)
    }
}
