//! Command-line interface module.

mod args;
pub mod build;
pub mod transform;

pub use args::{Cli, Commands};

use anyhow::{Context, Result};

use crate::config::SimgConfig;
use crate::transform::Transformer;

/// Run the parsed command line.
///
/// Modules are processed on a current-thread runtime: a module's pipeline
/// keeps its syntax tree across every suspension point.
pub fn run(cli: &Cli) -> Result<()> {
    crate::logger::set_verbose(cli.verbose);

    let config = SimgConfig::load(cli)?;
    crate::debug!("config"; "root {}, public dir {}", config.root.display(), config.public_dir().display());
    let transformer = Transformer::new(config.transform_config());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        match &cli.command {
            Commands::Transform { file, output, map } => {
                transform::transform_file(&transformer, file, output.as_deref(), *map).await
            }
            Commands::Build { dir, output } => build::build_dir(&transformer, dir, output).await,
        }
    })
}
