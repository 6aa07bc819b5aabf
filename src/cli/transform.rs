//! `simg transform`: one module to stdout or a file.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::normalize_path;
use crate::debug;
use crate::transform::{TransformOutput, Transformer};

/// Transform `file`, printing the result or writing it to `output`.
///
/// An unchanged module is emitted as-is so the command always produces
/// usable source.
pub async fn transform_file(
    transformer: &Transformer,
    file: &Path,
    output: Option<&Path>,
    with_map: bool,
) -> Result<()> {
    let code = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read `{}`", file.display()))?;
    let id = normalize_path(file).to_string_lossy().into_owned();

    let result = transformer.transform(&code, &id).await?;
    if result.is_none() {
        debug!("transform"; "{}: no change", file.display());
    }
    let TransformOutput { code, map } = result.unwrap_or(TransformOutput { code, map: None });

    match output {
        Some(path) => {
            write_output(path, &code, if with_map { map.as_deref() } else { None }).await?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(code.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Write transformed code and, when given, its source map next to it.
pub(super) async fn write_output(path: &Path, code: &str, map: Option<&str>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create `{}`", parent.display()))?;
    }
    tokio::fs::write(path, code)
        .await
        .with_context(|| format!("Failed to write `{}`", path.display()))?;

    if let Some(map) = map {
        let map_path = map_path(path);
        tokio::fs::write(&map_path, map)
            .await
            .with_context(|| format!("Failed to write `{}`", map_path.display()))?;
    }
    Ok(())
}

/// `out/App.js` -> `out/App.js.map`
pub(super) fn map_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".map");
    PathBuf::from(name)
}
