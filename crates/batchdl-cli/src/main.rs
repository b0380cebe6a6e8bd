mod cli;

use std::process::ExitCode;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI and dispatch; logging is set up once the config is known.
    match CliCommand::run_from_args().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("batchdl error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
