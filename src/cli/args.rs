use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub validate: ValidateArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate Task and Pipeline manifests (the default command)
    Validate(ValidateArgs),

    /// Print a default configuration file
    Init,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Manifest files or directories to validate (defaults to the current directory)
    pub paths: Vec<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file applied over ~/.config/pipelint/config.toml and ./pipelint.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Number of files validated at once (1-64)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,
}

impl ValidateArgs {
    /// Paths to walk, falling back to the current directory.
    pub fn targets(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }
}

pub fn validate_validate_args(args: &ValidateArgs) -> Result<()> {
    for path in &args.paths {
        if !path.exists() {
            return Err(anyhow::anyhow!("Path does not exist: {}", path.display()));
        }
    }

    if let Some(output) = &args.output {
        if output.is_dir() {
            return Err(anyhow::anyhow!(
                "Output must be a file, not a directory: {}",
                output.display()
            ));
        }
    }

    Ok(())
}
