//! Mining modes and the API/tracker locations they select.

use std::{fmt, str::FromStr};

/// Selects the API endpoint, time granularity and tracker file for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Hourly,
    SubHourly,
    Forecast,
}

impl Mode {
    /// Path appended to the API base URL for this mode.
    pub fn api_path(&self) -> &'static str {
        match self {
            Mode::Hourly => "/history/hourly",
            Mode::SubHourly => "/history/subhourly",
            Mode::Forecast => "/forecast/hourly",
        }
    }

    /// File name of the progress tracker for this mode.
    pub fn tracker_file(&self) -> &'static str {
        match self {
            Mode::Hourly => "data_tracker_hourly.json",
            Mode::SubHourly => "data_tracker_sub_hourly.json",
            Mode::Forecast => "data_tracker_forecast_hourly.json",
        }
    }

    /// Forecast runs always fetch the current look-ahead window, so there is
    /// no last-completed date to track.
    pub fn is_resumable(&self) -> bool {
        !matches!(self, Mode::Forecast)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Mode::Hourly => "hourly",
            Mode::SubHourly => "sub_hourly",
            Mode::Forecast => "forecast",
        };
        write!(f, "{}", slug)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Mode::Hourly),
            "sub_hourly" | "subhourly" => Ok(Mode::SubHourly),
            "forecast" => Ok(Mode::Forecast),
            other => Err(format!(
                "invalid mode `{}` (expected hourly, sub_hourly or forecast)",
                other
            )),
        }
    }
}

// -- Tests -------------------------------------------------------------------
