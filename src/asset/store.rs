//! Deterministic on-disk layout for resolved assets.
//!
//! ```text
//! <public_dir>/<namespace>/<name>/<name><ext>          original bytes
//! <public_dir>/<namespace>/<name>/<name>-<W>x<H><ext>  dimensioned variant (URL only)
//! ```
//!
//! The dimensioned variant is addressed but never written: no resized bytes
//! are produced, so that URL points at a file that does not exist.

use std::io;
use std::path::PathBuf;

use super::{AssetName, AssetRecord};

/// Persists fetched bytes and derives public URLs.
#[derive(Debug, Clone)]
pub struct AssetStore {
    public_dir: PathBuf,
    namespace: String,
}

impl AssetStore {
    pub fn new(public_dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            public_dir: public_dir.into(),
            namespace: namespace.into(),
        }
    }

    /// Compute the record for an asset name. No I/O.
    pub fn record(&self, name: AssetName) -> AssetRecord {
        let dir = self.public_dir.join(&self.namespace).join(&name.name);
        let file_name = format!("{}{}", name.name, name.extension);
        let public_url = format!("/{}/{}/{}", self.namespace, name.name, file_name);
        AssetRecord {
            local_path: dir.join(file_name),
            public_url,
            namespace: self.namespace.clone(),
            name: name.name,
            extension: name.extension,
        }
    }

    /// Write `bytes` to the record's local path.
    ///
    /// The directory is created if needed; an existing directory, including
    /// one created concurrently by another invocation, is not an error. The
    /// write is awaited to completion before returning.
    pub async fn persist(&self, record: &AssetRecord, bytes: &[u8]) -> io::Result<()> {
        if let Some(dir) = record.local_path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&record.local_path, bytes).await
    }
}
