//! ISS pass prediction client
//!
//! Fetches predicted visible passes of the ISS over an observer location from
//! the Open Notify `iss-pass.json` endpoint. The endpoint signals logical
//! failure through its `message` field even on HTTP 200, so that field is
//! checked before the response body is trusted.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Observer, PassPrediction};
use crate::poller::FetchError;

/// Base URL for the Open Notify pass prediction API
const PASSES_BASE_URL: &str = "http://api.open-notify.org";

/// Number of passes requested per call
const DEFAULT_PASS_COUNT: u8 = 5;

/// Errors that can occur when fetching pass predictions
#[derive(Debug, Error)]
pub enum PassesError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The API reported failure in its payload despite HTTP success
    #[error("Pass prediction API reported failure: {0}")]
    ApiFailure(String),

    /// Response was syntactically valid but not usable
    #[error("Malformed pass data: {0}")]
    MalformedResponse(String),
}

impl From<PassesError> for FetchError {
    fn from(err: PassesError) -> Self {
        match err {
            PassesError::RequestFailed(e) => FetchError::from_reqwest(&e),
            other => FetchError::Protocol(other.to_string()),
        }
    }
}

/// Client for fetching ISS pass predictions
#[derive(Debug, Clone)]
pub struct PassPredictionClient {
    client: Client,
    base_url: String,
    pass_count: u8,
}

impl Default for PassPredictionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PassPredictionClient {
    /// Creates a client against the public API
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: PASSES_BASE_URL.to_string(),
            pass_count: DEFAULT_PASS_COUNT,
        }
    }

    /// Creates a client with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            pass_count: DEFAULT_PASS_COUNT,
        }
    }

    /// Overrides how many passes are requested per call
    #[allow(dead_code)]
    pub fn with_pass_count(mut self, count: u8) -> Self {
        self.pass_count = count;
        self
    }

    /// Fetches upcoming passes over the observer's location
    ///
    /// # Arguments
    /// * `observer` - Ground coordinates to predict passes for
    ///
    /// # Returns
    /// * `Ok(Vec<PassPrediction>)` - Upcoming passes, soonest first
    /// * `Err(PassesError)` - If the request, parsing, or the API itself fails
    pub async fn fetch_passes(
        &self,
        observer: Observer,
    ) -> Result<Vec<PassPrediction>, PassesError> {
        let url = format!(
            "{}/iss-pass.json?lat={}&lon={}&alt=0&n={}",
            self.base_url, observer.latitude, observer.longitude, self.pass_count
        );
        tracing::debug!(%url, "requesting pass predictions");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        let api_response: PassResponse = serde_json::from_str(&text)?;

        Self::parse_response(api_response)
    }

    /// Validates the `message` field and converts the raw pass list
    fn parse_response(response: PassResponse) -> Result<Vec<PassPrediction>, PassesError> {
        if response.message != "success" {
            return Err(PassesError::ApiFailure(response.message));
        }

        response
            .response
            .into_iter()
            .map(|raw| {
                let risetime = DateTime::<Utc>::from_timestamp(raw.risetime, 0).ok_or_else(|| {
                    PassesError::MalformedResponse(format!("invalid risetime {}", raw.risetime))
                })?;
                Ok(PassPrediction {
                    risetime,
                    duration_secs: raw.duration,
                })
            })
            .collect()
    }
}

/// Open Notify pass prediction response structure
#[derive(Debug, Deserialize)]
struct PassResponse {
    message: String,
    #[serde(default)]
    response: Vec<RawPass>,
}

/// One pass as reported on the wire
#[derive(Debug, Deserialize)]
struct RawPass {
    /// Pass duration in seconds
    duration: u32,
    /// Rise time as epoch seconds
    risetime: i64,
}
