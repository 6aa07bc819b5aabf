//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Resolve `<Sim>` image placeholders in JS/TS modules
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: simg.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "simg.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Public output directory for resolved assets (relative to project root)
    #[arg(short = 'P', long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub public_dir: Option<PathBuf>,

    /// Path segment grouping resolved assets
    #[arg(short = 'N', long, global = true)]
    pub namespace: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Transform a single module
    #[command(visible_alias = "t")]
    Transform {
        /// Module to transform
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Also write `<output>.map` (requires --output)
        #[arg(short, long, requires = "output")]
        map: bool,
    },

    /// Transform every module under a directory into an output tree
    #[command(visible_alias = "b")]
    Build {
        /// Source directory
        #[arg(value_hint = clap::ValueHint::DirPath)]
        dir: PathBuf,

        /// Output directory (mirrors the source tree)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: PathBuf,
    },
}
