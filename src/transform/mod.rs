//! Module transform: resolve `<Sim>` placeholders and rewrite their attributes.
//!
//! # Pipeline
//!
//! ```text
//! source text
//!     │  oxc parser
//!     ▼
//! Program ──► locate ──► [Placeholder, ...]       (read-only, document order)
//!                              │
//!                              ▼  sequentially, per element
//!                       AssetResolver::resolve    fetch + persist
//!                       infer_layout              size, URL, colour
//!                              │
//!                              ▼
//! Program ◄── mutate ◄── {span => Layout}         (failed elements absent)
//!     │  oxc codegen
//!     ▼
//! code + source map
//! ```
//!
//! A parse error aborts the module. Any failure while resolving one element
//! is logged as a warning and leaves that element untouched.

mod error;
mod locate;
mod mutate;
#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use oxc::allocator::Allocator;
use oxc::ast::ast::Program;
use oxc::codegen::{Codegen, CodegenOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use rustc_hash::FxHashMap;

pub use error::{ElementError, TransformError};
pub use locate::{Placeholder, locate};

use crate::asset::{AssetResolver, AssetSource, AssetStore, DefaultSource};
use crate::image::{ImageProbe, Layout, RasterProbe, infer_layout};
use crate::{debug, log};

/// Extensions of modules the transform looks at.
const MODULE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Settings of one [`Transformer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    /// Project root; `/`-prefixed `src` values resolve against it.
    pub root: PathBuf,
    /// Public output directory assets are persisted under.
    pub public_dir: PathBuf,
    /// Path segment grouping all assets (`/Simg/...`).
    pub namespace: String,
    /// Placeholder tag name.
    pub tag: String,
    /// Module ids containing any of these are skipped.
    pub exclude: Vec<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            public_dir: PathBuf::from("public"),
            namespace: "Simg".into(),
            tag: "Sim".into(),
            exclude: vec!["node_modules".into()],
        }
    }
}

/// Rewritten module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub code: String,
    /// Source map (JSON, v3) back to the original text.
    pub map: Option<String>,
}

/// Resolves placeholder elements of JS/TS modules.
///
/// Holds no per-module state: one transformer can serve any number of
/// modules, and separate modules may be transformed concurrently.
pub struct Transformer {
    config: TransformConfig,
    resolver: AssetResolver,
    probe: Arc<dyn ImageProbe>,
}

impl Transformer {
    /// Transformer fetching from disk/HTTP and inspecting images with `image`.
    pub fn new(config: TransformConfig) -> Self {
        Self::with_parts(config, Arc::new(DefaultSource::default()), Arc::new(RasterProbe))
    }

    /// Transformer with custom retrieval and image inspection.
    pub fn with_parts(
        config: TransformConfig,
        source: Arc<dyn AssetSource>,
        probe: Arc<dyn ImageProbe>,
    ) -> Self {
        let store = AssetStore::new(&config.public_dir, &config.namespace);
        let resolver = AssetResolver::new(&config.root, store, source);
        Self {
            config,
            resolver,
            probe,
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Whether `id` names a module this transformer handles.
    pub fn should_transform(&self, id: &str) -> bool {
        source_type(id).is_some()
            && !self
                .config
                .exclude
                .iter()
                .any(|marker| id.contains(marker.as_str()))
    }

    /// Transform one module.
    ///
    /// Returns `Ok(None)` when there is nothing to change: the id is not
    /// handled, the module has no placeholder, or none could be resolved.
    pub async fn transform(
        &self,
        code: &str,
        id: &str,
    ) -> Result<Option<TransformOutput>, TransformError> {
        if !self.should_transform(id) {
            return Ok(None);
        }
        let Some(source_type) = source_type(id) else {
            return Ok(None);
        };

        let allocator = Allocator::default();
        let mut program = parse(&allocator, code, id, source_type)?;

        let placeholders = locate(&program, &self.config.tag);
        if placeholders.is_empty() {
            return Ok(None);
        }
        debug!("transform"; "{}: {} placeholder(s)", id, placeholders.len());

        let module_dir = self.module_dir(id);
        let mut resolved = FxHashMap::default();
        for placeholder in &placeholders {
            match self.resolve(placeholder, &module_dir).await {
                Ok(layout) => {
                    resolved.insert(placeholder.span, layout);
                }
                Err(err) => {
                    log!("warning"; "{}: skipped <{} src=\"{}\">: {}",
                        id, self.config.tag, placeholder.src, err.describe());
                }
            }
        }

        if resolved.is_empty() {
            return Ok(None);
        }

        mutate::apply(&allocator, &mut program, resolved);
        Ok(Some(regenerate(&program, id)))
    }

    /// Fetch, persist and measure the asset of one placeholder.
    async fn resolve(&self, placeholder: &Placeholder, module_dir: &Path) -> Result<Layout, ElementError> {
        let record = self.resolver.resolve(&placeholder.src, module_dir).await?;
        let layout = infer_layout(placeholder.requested, &record, self.probe.as_ref()).await?;
        Ok(layout)
    }

    /// Directory relative `src` values resolve against.
    fn module_dir(&self, id: &str) -> PathBuf {
        match Path::new(id).parent() {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => self.config.root.join(dir),
            None => self.config.root.clone(),
        }
    }
}

/// Parser flavour for a module id; `None` for ids the transform skips.
fn source_type(id: &str) -> Option<SourceType> {
    let ext = Path::new(id).extension()?.to_str()?;
    if !MODULE_EXTENSIONS.contains(&ext) {
        return None;
    }
    Some(match ext {
        "ts" => SourceType::ts(),
        "tsx" => SourceType::tsx(),
        _ => SourceType::jsx(),
    })
}

fn parse<'a>(
    allocator: &'a Allocator,
    code: &'a str,
    id: &str,
    source_type: SourceType,
) -> Result<Program<'a>, TransformError> {
    let ret = Parser::new(allocator, code, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        return Err(TransformError::Parse {
            id: id.to_string(),
            message,
        });
    }
    Ok(ret.program)
}

fn regenerate(program: &Program<'_>, id: &str) -> TransformOutput {
    let ret = Codegen::new()
        .with_options(CodegenOptions {
            source_map_path: Some(PathBuf::from(id)),
            ..CodegenOptions::default()
        })
        .build(program);
    TransformOutput {
        code: ret.code,
        map: ret.map.map(|map| map.to_json_string()),
    }
}
