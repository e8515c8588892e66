//! One logical fetch: request building plus retry, backoff and key rotation.

use std::time::Duration;

use log::{error, warn};
use thiserror::Error;
use tokio::time::sleep;

use crate::{
    api::{ApiOutcome, WeatherApi},
    config::{Config, Location},
    flatten::RawRecord,
    keys::KeyRotator,
    mode::Mode,
    window::DateWindow,
};

#[derive(Debug, Error)]
pub enum FetchError {
    /// Every configured key has been rate limited. Terminal for the run.
    #[error("all API keys have been rate limited")]
    KeysExhausted,
    /// Non-429 HTTP error. Not retried.
    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },
    /// The transport kept failing until the retry budget ran out.
    #[error("request failed after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },
}

/// Issues one bounded-range (or forecast) request against the API.
///
/// Retry policy, per logical fetch:
/// - 429: sleep and retry on the same key while attempts remain, then rotate
///   to the next key with a fresh attempt budget; once the rotator is
///   exhausted the whole run is over.
/// - other HTTP errors: fail immediately.
/// - transport errors: sleep and retry on the same key up to `max_retries`
///   attempts, then give up on this window.
pub struct Fetcher<A> {
    api: A,
    keys: KeyRotator,
    base_url: String,
    mode: Mode,
    max_retries: u32,
    retry_delay: Duration,
    forecast_hours: u32,
}

impl<A: WeatherApi> Fetcher<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Fetcher {
            api,
            keys: KeyRotator::new(config.api_keys.clone()),
            base_url: config.base_url.clone(),
            mode: config.mode,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            forecast_hours: config.forecast_hours,
        }
    }

    /// Fetches the records for one window, or the current forecast when
    /// `window` is `None`.
    pub async fn fetch(
        &mut self,
        location: &Location,
        window: Option<DateWindow>,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let mut attempt = 0;

        loop {
            let key = match self.keys.current() {
                Some(key) => key.to_string(),
                None => {
                    error!("all API keys have been rate limited, stopping");
                    return Err(FetchError::KeysExhausted);
                }
            };
            let url = self.build_url(location, window.as_ref(), &key);

            match self.api.get(&url).await {
                ApiOutcome::Data(records) => return Ok(records),
                ApiOutcome::RateLimited => {
                    warn!(
                        "rate limit exceeded for key #{} on {} (attempt {})",
                        self.keys.position(),
                        location.name,
                        attempt + 1
                    );
                    if attempt + 1 < self.max_retries {
                        sleep(self.retry_delay).await;
                        attempt += 1;
                    } else {
                        // this key is spent, give the next one a full budget
                        self.keys.advance();
                        attempt = 0;
                    }
                }
                ApiOutcome::HttpStatus(status) => {
                    warn!("HTTP error {} for URL {}", status, url);
                    return Err(FetchError::Http { status, url });
                }
                ApiOutcome::Transport(reason) => {
                    if attempt + 1 < self.max_retries {
                        sleep(self.retry_delay).await;
                        attempt += 1;
                    } else {
                        error!("request error for URL {}: {}", url, reason);
                        return Err(FetchError::RetriesExhausted {
                            attempts: self.max_retries,
                            reason,
                        });
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn api(&self) -> &A {
        &self.api
    }

    fn build_url(&self, location: &Location, window: Option<&DateWindow>, key: &str) -> String {
        let base = format!(
            "{}{}?tz=local&lat={}&lon={}&key={}",
            self.base_url,
            self.mode.api_path(),
            location.lat,
            location.lon,
            key
        );

        match window {
            Some(window) => format!(
                "{}&start_date={}&end_date={}",
                base,
                window.start.format("%Y-%m-%d"),
                window.end.format("%Y-%m-%d")
            ),
            None => format!("{}&hours={}", base, self.forecast_hours),
        }
    }
}

// -- Tests -------------------------------------------------------------------
