mod api;
mod cli;
mod config;
mod fetch;
mod flatten;
mod keys;
mod miner;
mod mode;
mod output;
mod tracker;
mod window;

use std::env;

use anyhow::{Error, Result};
use api::HttpApi;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use miner::Miner;
use mode::Mode;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mode = match &cli.command {
        Some(Commands::Hourly {}) => Mode::Hourly,
        Some(Commands::Subhourly {}) => Mode::SubHourly,
        Some(Commands::Forecast {}) => Mode::Forecast,
        None => mode_from_env()?,
    };

    let config = Config::from_env(mode)?;
    let mut miner = Miner::new(config, HttpApi::new())?;

    match miner.run().await {
        Ok(()) => println!("Mining run complete"),
        Err(e) => eprintln!("Error: {}", e),
    }

    Ok(())
}

/// Falls back to the MODE environment variable when no subcommand is given.
fn mode_from_env() -> Result<Mode> {
    match env::var("MODE") {
        Ok(raw) => raw.to_lowercase().parse().map_err(Error::msg),
        Err(_) => Ok(Mode::Hourly),
    }
}
