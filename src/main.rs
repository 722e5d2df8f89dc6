use anyhow::Result;
use std::process::ExitCode;

use pipelint::cli::RootCommand;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Handle Ctrl+C gracefully
    tokio::select! {
        result = RootCommand::execute() => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted by user");
            Ok(ExitCode::from(130))
        }
    }
}
