//! Runtime configuration, read and validated once at startup.

use std::{collections::HashSet, env, path::PathBuf, str::FromStr, time::Duration};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::mode::Mode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// A place to mine data for. `name` doubles as the tracking key and the
/// output file name stem, so it must be unique.
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Everything the miner needs, collected from the environment in one place
/// so no component ever sees a partially initialised configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_keys: Vec<String>,
    pub mode: Mode,
    pub oldest_date: NaiveDate,
    pub days_per_request: u32,
    pub save_checkpoint_months: u32,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub forecast_hours: u32,
    pub locations: Vec<Location>,
    pub output_dir: PathBuf,
    pub tracker_dir: PathBuf,
}

impl Config {
    pub fn from_env(mode: Mode) -> Result<Self, ConfigError> {
        let base_url = required("BASE_URL")?;
        let api_keys = parse_api_keys(&required("API_KEYS")?)?;
        let oldest_date = parse_date("OLDEST_DATE", &required("OLDEST_DATE")?)?;
        let days_per_request = parsed("DAYS_PER_REQUEST", 28)?;
        let save_checkpoint_months = parsed("SAVE_CHECKPOINT_MONTHS", 6)?;
        let max_retries = parsed("MAX_RETRIES", 3)?;
        let retry_delay = Duration::from_secs(parsed("RETRY_DELAY_SECONDS", 5)?);
        let forecast_hours = parsed("FORECAST_HOURS", 240)?;
        let locations = parse_locations(&required("LOCATIONS")?)?;
        let output_dir = PathBuf::from(optional("OUTPUT_DATA_FOLDER", "data"));
        let tracker_dir = PathBuf::from(optional("TRACKER_FOLDER", "tracker"));

        if days_per_request == 0 {
            return Err(ConfigError::Invalid {
                name: "DAYS_PER_REQUEST",
                reason: "must be at least 1".to_string(),
            });
        }
        if max_retries == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_RETRIES",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Config {
            base_url,
            api_keys,
            mode,
            oldest_date,
            days_per_request,
            save_checkpoint_months,
            max_retries,
            retry_delay,
            forecast_hours,
            locations,
            output_dir,
            tracker_dir,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn optional(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

fn parse_date(name: &'static str, raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_api_keys(raw: &str) -> Result<Vec<String>, ConfigError> {
    let keys: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();

    if keys.is_empty() {
        return Err(ConfigError::Invalid {
            name: "API_KEYS",
            reason: "no keys found".to_string(),
        });
    }

    Ok(keys)
}

fn parse_locations(raw: &str) -> Result<Vec<Location>, ConfigError> {
    let locations: Vec<Location> =
        serde_json::from_str(raw).map_err(|e| ConfigError::Invalid {
            name: "LOCATIONS",
            reason: e.to_string(),
        })?;

    if locations.is_empty() {
        return Err(ConfigError::Invalid {
            name: "LOCATIONS",
            reason: "no locations configured".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for location in &locations {
        if !seen.insert(location.name.as_str()) {
            return Err(ConfigError::Invalid {
                name: "LOCATIONS",
                reason: format!("duplicate location name `{}`", location.name),
            });
        }
    }

    Ok(locations)
}

// -- Tests -------------------------------------------------------------------
