//! Binary crate for the weather lookup HTTP API.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading `.env`
//! - Serving the lookup over HTTP
//! - Mapping lookup errors to JSON responses

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
