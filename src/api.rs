//! One-shot HTTP calls against the weather API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::flatten::RawRecord;

/// What a single round trip to the API produced, classified for the retry
/// policy in [`crate::fetch`].
#[derive(Debug)]
pub enum ApiOutcome {
    /// 2xx with a parseable body: the records under the `data` field.
    Data(Vec<RawRecord>),
    /// HTTP 429.
    RateLimited,
    /// Any other non-2xx status.
    HttpStatus(u16),
    /// The request never produced a usable response: connection failure,
    /// timeout, or an unparseable body.
    Transport(String),
}

#[async_trait]
pub trait WeatherApi {
    async fn get(&self, url: &str) -> ApiOutcome;
}

#[derive(Deserialize)]
struct ApiBody {
    data: Vec<RawRecord>,
}

/// The real client.
pub struct HttpApi {
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new() -> Self {
        HttpApi {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl WeatherApi for HttpApi {
    async fn get(&self, url: &str) -> ApiOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return ApiOutcome::Transport(e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return ApiOutcome::RateLimited;
        }
        if !status.is_success() {
            return ApiOutcome::HttpStatus(status.as_u16());
        }

        match response.json::<ApiBody>().await {
            Ok(body) => ApiOutcome::Data(body.data),
            Err(e) => ApiOutcome::Transport(e.to_string()),
        }
    }
}

// -- Tests -------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn should_parse_data_field_from_body() {
        let body: ApiBody = serde_json::from_value(json!({
            "city_name": "Schiphol",
            "data": [
                { "temp": 11.4, "weather": { "icon": "c02d" } },
                { "temp": 10.9, "weather": { "icon": "c01d" } }
            ]
        }))
        .unwrap();

        assert_eq!(body.data.len(), 2);
        assert_eq!(body.data[0].get("temp"), Some(&json!(11.4)));
    }

    #[test]
    fn should_reject_body_without_data_field() {
        let result: Result<ApiBody, _> =
            serde_json::from_value(json!({ "error": "No session found" }));

        assert!(result.is_err());
    }
}
