//! `bpcatalog` command-line front end.
//!
//! # Responsibility
//! - Parse arguments and run exactly one command on a single-threaded runtime.
//! - Map any failure to a printed message and a non-zero exit code.

mod app;
mod browse;
mod cli;
mod render;

use clap::Parser;
use log::error;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match app::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
