use std::process::ExitCode;

use clap::Parser;
use quadsync::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match quadsync::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "quadsync failed");
            // The subscriber may not be installed yet.
            eprintln!("quadsync: {error}");
            ExitCode::FAILURE
        }
    }
}
