//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Documentation website prerender CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: prerender.toml)
    #[arg(short = 'C', long, default_value = "prerender.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Deploy the processed build after rendering
    #[arg(long)]
    pub deploy: bool,

    /// Deploy destination directory (overrides config)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub directory: Option<PathBuf>,

    /// Public base URL used for redirect stubs (overrides config)
    #[arg(short, long, value_hint = clap::ValueHint::Url)]
    pub base: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}
