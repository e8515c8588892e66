//! Orchestrates mining across locations, windows and checkpoints.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{error, info, warn};

use crate::{
    api::WeatherApi,
    cli::create_spinner,
    config::{Config, Location},
    fetch::{FetchError, Fetcher},
    flatten::RawRecord,
    mode::Mode,
    output::append_records,
    tracker::{ProgressState, ProgressTracker},
    window::windows,
};

/// How mining one location ended.
#[derive(Debug, PartialEq, Eq)]
pub enum MineOutcome {
    Completed,
    /// A window failed after earlier windows had produced data; everything
    /// collected so far was flushed and the tracker points at the last good
    /// boundary.
    PartiallyCompleted,
}

/// Mines every configured location in turn, one window at a time.
pub struct Miner<A> {
    config: Config,
    fetcher: Fetcher<A>,
    tracker: ProgressTracker,
    state: ProgressState,
}

impl<A: WeatherApi> Miner<A> {
    pub fn new(config: Config, api: A) -> Result<Self> {
        let tracker = ProgressTracker::new(&config.tracker_dir, config.mode);
        let state = tracker.load()?;
        let fetcher = Fetcher::new(api, &config);

        Ok(Miner {
            config,
            fetcher,
            tracker,
            state,
        })
    }

    /// Processes every location sequentially. A location that fails is logged
    /// and skipped; only key exhaustion stops the run, since no later
    /// location could fetch anything either.
    pub async fn run(&mut self) -> Result<()> {
        for location in self.config.locations.clone() {
            let bar = create_spinner(format!("Mining {}...", location.name));
            let end = Utc::now().date_naive();

            match self.mine_location(&location, end).await {
                Ok(MineOutcome::Completed) => {
                    bar.finish_with_message(format!("{} complete", location.name));
                    info!("all data collection completed for {}", location.name);
                }
                Ok(MineOutcome::PartiallyCompleted) => {
                    bar.finish_with_message(format!("{} partially complete", location.name));
                    warn!(
                        "saved partial data for {}; the next run resumes from the last checkpoint",
                        location.name
                    );
                }
                Err(e) => {
                    bar.finish_with_message(format!("{} failed", location.name));
                    if is_key_exhaustion(&e) {
                        error!("all API keys exhausted while processing {}", location.name);
                        return Err(e);
                    }
                    error!(
                        "an error occurred while processing location {}: {:#}",
                        location.name, e
                    );
                }
            }
        }

        Ok(())
    }

    /// Mines one location from its last checkpoint (or the configured oldest
    /// date) up to `end`, checkpointing along the way.
    async fn mine_location(&mut self, location: &Location, end: NaiveDate) -> Result<MineOutcome> {
        let csv_path = self.config.output_dir.join(format!(
            "{}_weather_data_{}.csv",
            location.name, self.config.mode
        ));

        if self.config.mode == Mode::Forecast {
            let records = self.fetcher.fetch(location, None).await?;
            append_records(&records, &csv_path)?;
            info!("forecast saved for {}", location.name);
            return Ok(MineOutcome::Completed);
        }

        let start = self
            .state
            .get(&location.name)
            .copied()
            .unwrap_or(self.config.oldest_date);
        let checkpoint_days = i64::from(self.config.save_checkpoint_months) * 30;
        let mut pending: Vec<RawRecord> = Vec::new();
        let mut flushed = false;

        for window in windows(start, end, self.config.days_per_request) {
            match self.fetcher.fetch(location, Some(window)).await {
                Ok(records) => {
                    pending.extend(records);

                    let since_oldest = (window.end - self.config.oldest_date).num_days();
                    if since_oldest >= checkpoint_days || window.end == end {
                        append_records(&pending, &csv_path)?;
                        pending.clear();
                        flushed = true;
                        self.checkpoint(location, window.end)?;
                    }
                }
                Err(e) => {
                    if pending.is_empty() && !flushed {
                        // nothing collected for this location, nothing to save
                        return Err(e.into());
                    }

                    warn!(
                        "fetch failed for {} [{}..{}), saving collected data and stopping this location",
                        location.name, window.start, window.end
                    );
                    append_records(&pending, &csv_path)?;
                    // the failed window is not included; resume from its start
                    self.checkpoint(location, window.start)?;

                    if matches!(e, FetchError::KeysExhausted) {
                        return Err(e.into());
                    }
                    return Ok(MineOutcome::PartiallyCompleted);
                }
            }
        }

        info!(
            "data saved to {} up to {}",
            csv_path.display(),
            end.format("%Y-%m-%d")
        );

        Ok(MineOutcome::Completed)
    }

    fn checkpoint(&mut self, location: &Location, date: NaiveDate) -> Result<()> {
        if !self.config.mode.is_resumable() {
            return Ok(());
        }

        self.state.insert(location.name.clone(), date);
        self.tracker.save(&self.state)?;

        Ok(())
    }
}

fn is_key_exhaustion(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<FetchError>(),
        Some(FetchError::KeysExhausted)
    )
}

// -- Tests -------------------------------------------------------------------
