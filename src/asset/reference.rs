//! Source reference classification.
//!
//! A `src` value is either a remote locator or a path on disk. Paths are
//! resolved against the project root (`/images/a.png`) or the importing
//! module's directory (`./a.png`, `a.png`).

use std::path::{Path, PathBuf};

use url::Url;

use super::source::FetchError;

/// Syntactic classification of a `src` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRef<'a> {
    /// `http://` or `https://` locator.
    Remote(&'a str),
    /// `file://` URL.
    FileUrl(&'a str),
    /// Project-root path (`/images/a.png`).
    ProjectRoot(&'a str),
    /// Module-relative path (`./a.png`, `../a.png`, `a.png`).
    Relative(&'a str),
    /// Any other scheme (`data:`, `ftp:`, ...).
    Unsupported(&'a str),
}

/// Where the bytes of a source reference live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Remote(Url),
    Local(PathBuf),
}

impl<'a> SourceRef<'a> {
    /// Parse a `src` value into its syntactic kind.
    pub fn parse(reference: &'a str) -> Self {
        if let Some(scheme) = scheme_of(reference) {
            match scheme.to_ascii_lowercase().as_str() {
                "http" | "https" => Self::Remote(reference),
                "file" => Self::FileUrl(reference),
                _ => Self::Unsupported(reference),
            }
        } else if reference.starts_with('/') {
            Self::ProjectRoot(reference)
        } else {
            Self::Relative(reference)
        }
    }

    /// Resolve to a concrete location.
    ///
    /// `module_dir` is the directory of the module containing the element.
    pub fn locate(&self, root: &Path, module_dir: &Path) -> Result<AssetLocation, FetchError> {
        match *self {
            Self::Remote(link) => Url::parse(link)
                .map(AssetLocation::Remote)
                .map_err(|err| FetchError::InvalidReference(link.to_string(), err.to_string())),
            Self::FileUrl(link) => Url::parse(link)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .map(AssetLocation::Local)
                .ok_or_else(|| {
                    FetchError::InvalidReference(link.to_string(), "not a local file URL".into())
                }),
            Self::ProjectRoot(path) => Ok(AssetLocation::Local(
                root.join(strip_suffixes(path).trim_start_matches('/')),
            )),
            Self::Relative(path) => Ok(AssetLocation::Local(module_dir.join(strip_suffixes(path)))),
            Self::Unsupported(link) => Err(FetchError::InvalidReference(
                link.to_string(),
                "unsupported scheme".into(),
            )),
        }
    }
}

/// Scheme of a link (`https` in `https://x`), if it has one.
fn scheme_of(link: &str) -> Option<&str> {
    let pos = link.find(':')?;
    let scheme = &link[..pos];
    (pos > 1
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
    .then_some(scheme)
}

/// Drop `?query` and `#fragment` from a path reference.
pub(super) fn strip_suffixes(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}
