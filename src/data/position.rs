//! Satellite position providers
//!
//! Two public APIs report the ISS position in different shapes: wheretheiss.at
//! returns flat numeric fields including altitude and velocity, while Open
//! Notify nests string coordinates under `iss_position` and reports no
//! telemetry beyond them. Both remote formats are real and both are kept,
//! as two adapters behind the `LocationProvider` trait that normalize into
//! the shared `IssPosition` model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::IssPosition;
use crate::poller::FetchError;

/// NORAD catalog id of the International Space Station
pub const ISS_SATELLITE_ID: u32 = 25544;

/// Base URL for the wheretheiss.at API
const WHERE_THE_ISS_BASE_URL: &str = "https://api.wheretheiss.at/v1";

/// Base URL for the Open Notify API
const OPEN_NOTIFY_BASE_URL: &str = "http://api.open-notify.org";

/// Errors that can occur when fetching a satellite position
#[derive(Debug, Error)]
pub enum PositionError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Response was syntactically valid but not usable
    #[error("Malformed position data: {0}")]
    MalformedResponse(String),

    /// The API reported failure in its payload despite HTTP success
    #[error("Position API reported failure: {0}")]
    ApiFailure(String),
}

impl From<PositionError> for FetchError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::RequestFailed(e) => FetchError::from_reqwest(&e),
            other => FetchError::Protocol(other.to_string()),
        }
    }
}

/// A source of current satellite positions
///
/// The poller only needs one normalized reading per call; which remote API
/// backs it is the adapter's business.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Short provider label for diagnostics
    fn name(&self) -> &'static str;

    /// Fetches the satellite's position right now
    async fn current_position(&self) -> Result<IssPosition, PositionError>;
}

/// Client for the wheretheiss.at satellite API
///
/// Reports full telemetry: coordinates, altitude (km) and velocity (km/h) as
/// flat numeric fields.
#[derive(Debug, Clone)]
pub struct WhereTheIssClient {
    client: Client,
    base_url: String,
    satellite_id: u32,
}

impl Default for WhereTheIssClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhereTheIssClient {
    /// Creates a client tracking the ISS against the public API
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: WHERE_THE_ISS_BASE_URL.to_string(),
            satellite_id: ISS_SATELLITE_ID,
        }
    }

    /// Creates a client with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            satellite_id: ISS_SATELLITE_ID,
        }
    }

    /// Parses the API response into the shared position model
    fn parse_response(response: WhereTheIssResponse) -> Result<IssPosition, PositionError> {
        let timestamp = DateTime::<Utc>::from_timestamp(response.timestamp, 0).ok_or_else(|| {
            PositionError::MalformedResponse(format!("invalid timestamp {}", response.timestamp))
        })?;

        Ok(IssPosition {
            latitude: response.latitude,
            longitude: response.longitude,
            altitude_km: response.altitude,
            velocity_kmh: response.velocity,
            timestamp,
        })
    }
}

#[async_trait]
impl LocationProvider for WhereTheIssClient {
    fn name(&self) -> &'static str {
        "wheretheiss.at"
    }

    async fn current_position(&self) -> Result<IssPosition, PositionError> {
        let url = format!("{}/satellites/{}", self.base_url, self.satellite_id);
        tracing::debug!(%url, "requesting satellite position");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        let api_response: WhereTheIssResponse = serde_json::from_str(&text)?;

        Self::parse_response(api_response)
    }
}

/// Client for the Open Notify `iss-now.json` API
///
/// Coordinates arrive as strings nested under `iss_position`; altitude and
/// velocity are not reported and default to zero.
#[derive(Debug, Clone)]
pub struct OpenNotifyClient {
    client: Client,
    base_url: String,
}

impl Default for OpenNotifyClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenNotifyClient {
    /// Creates a client against the public API
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: OPEN_NOTIFY_BASE_URL.to_string(),
        }
    }

    /// Creates a client with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Parses the API response into the shared position model
    fn parse_response(response: OpenNotifyResponse) -> Result<IssPosition, PositionError> {
        if response.message != "success" {
            return Err(PositionError::ApiFailure(response.message));
        }

        let latitude = parse_coordinate(&response.iss_position.latitude, "latitude")?;
        let longitude = parse_coordinate(&response.iss_position.longitude, "longitude")?;

        let timestamp = DateTime::<Utc>::from_timestamp(response.timestamp, 0).ok_or_else(|| {
            PositionError::MalformedResponse(format!("invalid timestamp {}", response.timestamp))
        })?;

        Ok(IssPosition {
            latitude,
            longitude,
            // Open Notify does not report these; fall back to 0.
            altitude_km: 0.0,
            velocity_kmh: 0.0,
            timestamp,
        })
    }
}

#[async_trait]
impl LocationProvider for OpenNotifyClient {
    fn name(&self) -> &'static str {
        "open-notify.org"
    }

    async fn current_position(&self) -> Result<IssPosition, PositionError> {
        let url = format!("{}/iss-now.json", self.base_url);
        tracing::debug!(%url, "requesting satellite position");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        let api_response: OpenNotifyResponse = serde_json::from_str(&text)?;

        Self::parse_response(api_response)
    }
}

/// Parses a string coordinate field into a float
fn parse_coordinate(value: &str, field: &str) -> Result<f64, PositionError> {
    value.parse::<f64>().map_err(|_| {
        PositionError::MalformedResponse(format!("{} is not a number: {:?}", field, value))
    })
}

/// wheretheiss.at response structure
#[derive(Debug, Deserialize)]
struct WhereTheIssResponse {
    #[allow(dead_code)]
    name: Option<String>,
    latitude: f64,
    longitude: f64,
    /// Kilometers above sea level
    altitude: f64,
    /// Kilometers per hour
    velocity: f64,
    /// Epoch seconds
    timestamp: i64,
}

/// Open Notify response structure
#[derive(Debug, Deserialize)]
struct OpenNotifyResponse {
    message: String,
    /// Epoch seconds
    timestamp: i64,
    iss_position: OpenNotifyPosition,
}

/// Nested coordinate pair; both values are strings on the wire
#[derive(Debug, Deserialize)]
struct OpenNotifyPosition {
    latitude: String,
    longitude: String,
}
