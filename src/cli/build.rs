//! `simg build`: transform a whole source tree.
//!
//! Every file under the source directory is mirrored into the output
//! directory. Handled modules are transformed (with a sibling `.map`),
//! everything else is copied. Paths matching an exclude marker and the
//! output directory itself are not visited.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;

use super::transform::write_output;
use crate::config::normalize_path;
use crate::logger::ProgressLine;
use crate::transform::Transformer;
use crate::log;

/// Per-run counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub transformed: usize,
    pub unchanged: usize,
    pub copied: usize,
    pub failed: usize,
}

/// Transform `dir` into `output`. Fails at the end if any module failed.
pub async fn build_dir(transformer: &Transformer, dir: &Path, output: &Path) -> Result<()> {
    let stats = build_tree(transformer, dir, output, true).await?;

    log!(
        "build";
        "{} transformed, {} unchanged, {} copied",
        stats.transformed,
        stats.unchanged,
        stats.copied
    );
    if stats.failed > 0 {
        bail!("{} module(s) failed to transform", stats.failed);
    }
    Ok(())
}

/// Walk and process the tree, returning what happened to each file.
pub async fn build_tree(
    transformer: &Transformer,
    dir: &Path,
    output: &Path,
    show_progress: bool,
) -> Result<BuildStats> {
    let dir = normalize_path(dir);
    let output = normalize_path(output);
    if !dir.is_dir() {
        bail!("`{}` is not a directory", dir.display());
    }

    let files = collect_files(&dir, &output, &transformer.config().exclude);
    let (modules, others): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|path| transformer.should_transform(&path.to_string_lossy()));

    let progress = show_progress
        .then(|| ProgressLine::new(&[("modules", modules.len()), ("copied", others.len())]));
    let mut stats = BuildStats::default();

    for path in &modules {
        let target = output.join(path.strip_prefix(&dir)?);
        match transform_module(transformer, path, &target).await {
            Ok(true) => stats.transformed += 1,
            Ok(false) => stats.unchanged += 1,
            Err(err) => {
                stats.failed += 1;
                log!("error"; "{:#}", err);
            }
        }
        if let Some(p) = &progress {
            p.inc("modules");
        }
    }

    for path in &others {
        let target = output.join(path.strip_prefix(&dir)?);
        copy_file(path, &target).await?;
        stats.copied += 1;
        if let Some(p) = &progress {
            p.inc("copied");
        }
    }

    if let Some(p) = progress {
        p.finish();
    }
    Ok(stats)
}

/// Files under `dir`, skipping `output` and excluded paths.
fn collect_files(dir: &Path, output: &Path, exclude: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| !path.starts_with(output))
        .filter(|path| {
            let text = path.to_string_lossy();
            !exclude.iter().any(|marker| text.contains(marker.as_str()))
        })
        .collect();
    files.sort();
    files
}

/// Returns whether the module changed.
async fn transform_module(transformer: &Transformer, path: &Path, target: &Path) -> Result<bool> {
    let code = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read `{}`", path.display()))?;

    match transformer.transform(&code, &path.to_string_lossy()).await? {
        Some(out) => {
            write_output(target, &out.code, out.map.as_deref()).await?;
            Ok(true)
        }
        None => {
            write_output(target, &code, None).await?;
            Ok(false)
        }
    }
}

async fn copy_file(path: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(path, target)
        .await
        .with_context(|| format!("Failed to copy `{}`", path.display()))?;
    Ok(())
}
