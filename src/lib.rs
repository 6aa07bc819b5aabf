//! simg - build-time resolution of `<Sim>` image placeholders.
//!
//! Given the source text of a JS/TS module, [`transform::Transformer`] finds
//! every `<Sim src="...">` element, fetches and persists the referenced
//! image under a public directory, and rewrites the element with its final
//! `src`, `width`, `height` and dominant `color`.
//!
//! ```ignore
//! let transformer = Transformer::new(TransformConfig::default());
//! if let Some(out) = transformer.transform(&code, "src/App.tsx").await? {
//!     std::fs::write("dist/App.js", out.code)?;
//! }
//! ```

pub mod asset;
pub mod cli;
pub mod config;
pub mod image;
pub mod logger;
pub mod transform;

pub use transform::{TransformConfig, TransformError, TransformOutput, Transformer};
