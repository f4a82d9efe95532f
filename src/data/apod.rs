//! NASA Astronomy Picture of the Day client
//!
//! Fetches the daily picture metadata from `api.nasa.gov`. The endpoint
//! requires an API key; a missing key is a distinguished configuration error
//! surfaced to the user verbatim rather than a failed request. NASA's error
//! bodies carry their own `msg` field, which is preferred over the bare HTTP
//! status text when available.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::poller::FetchError;

/// Base URL for the NASA API
const NASA_BASE_URL: &str = "https://api.nasa.gov";

/// Environment variable holding the NASA API key
pub const NASA_API_KEY_ENV: &str = "NASA_API_KEY";

/// Message shown when no API key is configured
const MISSING_KEY_MESSAGE: &str =
    "NASA API key not configured. Set NASA_API_KEY or pass --api-key.";

/// How the picture of the day should be rendered
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub enum ApodMedia {
    /// A still image; render the image URL directly
    Image,
    /// A video; render inside an embedded frame, not as an image
    Video,
    /// Unrecognized media type; fall back to linking the URL
    Other(String),
}

impl ApodMedia {
    fn from_wire(media_type: &str) -> Self {
        match media_type {
            "image" => ApodMedia::Image,
            "video" => ApodMedia::Video,
            other => ApodMedia::Other(other.to_string()),
        }
    }

    /// True when the payload must be rendered in an embedded frame rather
    /// than as an image
    pub fn is_embedded_frame(&self) -> bool {
        matches!(self, ApodMedia::Video)
    }
}

/// Astronomy picture of the day metadata
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct Apod {
    /// The day this entry is for
    pub date: NaiveDate,
    pub title: String,
    /// NASA's long-form explanation text
    pub explanation: String,
    /// Standard-resolution media URL
    pub url: String,
    /// High-resolution image URL, when available
    pub hdurl: Option<String>,
    pub media: ApodMedia,
    /// Image credit; entries without one are NASA's own
    pub copyright: Option<String>,
}

impl Apod {
    /// Best image URL for display: HD when present, standard otherwise
    pub fn best_image_url(&self) -> &str {
        self.hdurl.as_deref().unwrap_or(&self.url)
    }

    /// Credit line for the footer
    pub fn credit(&self) -> String {
        match &self.copyright {
            Some(owner) => format!("\u{a9} {}", owner.trim()),
            None => "NASA".to_string(),
        }
    }
}

/// Errors that can occur when fetching the picture of the day
#[derive(Debug, Error)]
pub enum ApodError {
    /// No API key is configured
    #[error("NASA API key not configured. Set NASA_API_KEY or pass --api-key.")]
    MissingApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// NASA rejected the request and said why
    #[error("NASA API error ({status}): {message}")]
    ApiRejection { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Invalid date in response
    #[error("Invalid date in response: {0}")]
    InvalidDate(String),
}

impl From<ApodError> for FetchError {
    fn from(err: ApodError) -> Self {
        match err {
            ApodError::MissingApiKey => FetchError::Config(MISSING_KEY_MESSAGE.to_string()),
            ApodError::RequestFailed(e) => FetchError::from_reqwest(&e),
            ApodError::ApiRejection { status, message } => FetchError::Http { status, message },
            other => FetchError::Protocol(other.to_string()),
        }
    }
}

/// Client for fetching NASA's Astronomy Picture of the Day
#[derive(Debug, Clone)]
pub struct ApodClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApodClient {
    /// Creates a client with the given API key; `None` means requests will
    /// fail with the distinguished configuration error until a key is set.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: NASA_BASE_URL.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Creates a client reading the key from the `NASA_API_KEY` environment
    /// variable.
    #[allow(dead_code)]
    pub fn from_env() -> Self {
        Self::new(std::env::var(NASA_API_KEY_ENV).ok())
    }

    /// Creates a client with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    /// Fetches the picture of the day
    ///
    /// # Arguments
    /// * `date` - A specific day to fetch; `None` means today
    ///
    /// # Returns
    /// * `Ok(Apod)` - Picture metadata
    /// * `Err(ApodError)` - Missing key, transport failure, or NASA rejection
    pub async fn fetch_apod(&self, date: Option<NaiveDate>) -> Result<Apod, ApodError> {
        let api_key = self.api_key.as_deref().ok_or(ApodError::MissingApiKey)?;

        let mut url = format!("{}/planetary/apod?api_key={}", self.base_url, api_key);
        if let Some(date) = date {
            url.push_str(&format!("&date={}", date.format("%Y-%m-%d")));
        }
        tracing::debug!("requesting astronomy picture of the day");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApodError::ApiRejection {
                status: status.as_u16(),
                message: extract_error_message(&text, status.as_u16()),
            });
        }

        let api_response: ApodResponse = serde_json::from_str(&text)?;
        Self::parse_response(api_response)
    }

    /// Converts the wire response into the domain model
    fn parse_response(response: ApodResponse) -> Result<Apod, ApodError> {
        let date = NaiveDate::parse_from_str(&response.date, "%Y-%m-%d")
            .map_err(|_| ApodError::InvalidDate(response.date.clone()))?;

        Ok(Apod {
            date,
            title: response.title,
            explanation: response.explanation,
            url: response.url,
            hdurl: response.hdurl,
            media: ApodMedia::from_wire(&response.media_type),
            copyright: response.copyright,
        })
    }
}

/// Pulls NASA's own error message out of a failure body when present.
///
/// NASA uses two shapes: `{"msg": "..."}` for API-level rejections and
/// `{"error": {"code": "...", "message": "..."}}` for key problems.
fn extract_error_message(body: &str, status: u16) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        msg: Option<String>,
        error: Option<InnerError>,
    }
    #[derive(Deserialize)]
    struct InnerError {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.msg.or(parsed.error.and_then(|e| e.message)))
        .unwrap_or_else(|| format!("request failed with status {}", status))
}

/// NASA APOD response structure
#[derive(Debug, Deserialize)]
struct ApodResponse {
    date: String,
    explanation: String,
    hdurl: Option<String>,
    media_type: String,
    title: String,
    url: String,
    copyright: Option<String>,
}
