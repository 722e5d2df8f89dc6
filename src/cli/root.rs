use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{validate_validate_args, Args, Commands};
use crate::cli::commands::run_validate_command;
use crate::config::PipelintConfig;

pub struct RootCommand;

impl RootCommand {
    pub async fn execute() -> Result<ExitCode> {
        let args = Args::parse();

        match args.command {
            Some(Commands::Init) => {
                init_logging(args.validate.verbosity);
                print!("{}", PipelintConfig::generate_default_config()?);
                Ok(ExitCode::SUCCESS)
            }
            Some(Commands::Validate(validate_args)) => {
                init_logging(validate_args.verbosity);
                validate_validate_args(&validate_args)?;
                run_validate_command(validate_args).await
            }
            None => {
                init_logging(args.validate.verbosity);
                validate_validate_args(&args.validate)?;
                run_validate_command(args.validate).await
            }
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .try_init();
}
