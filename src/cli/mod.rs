//! Command line interface.

use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::ProgressBar;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mine hourly history
    Hourly {},
    /// Mine sub-hourly history
    Subhourly {},
    /// Mine the hourly forecast
    Forecast {},
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}
