use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use kwfilters::cli::Cli;
use kwfilters::config::{Config, RunOptions};
use kwfilters::logging::init_logging;
use kwfilters::utils::OutputStyle;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{} {:#}", OutputStyle::error("Error:"), e);
        return ExitCode::from(1);
    }

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = match &cli.settings {
        Some(path) => Config::load_custom(path)?,
        None => Config::load()?,
    };

    let options = RunOptions::resolve(&cli, &config)?;
    kwfilters::run(&options).await
}
