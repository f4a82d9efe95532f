//! People-in-space client
//!
//! Fetches the current crew roster in orbit from the Open Notify
//! `astros.json` endpoint. Like the other Open Notify endpoints, logical
//! failure is signalled through the `message` field on HTTP 200.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Astronaut, SpaceCrew};
use crate::poller::FetchError;

/// Base URL for the Open Notify API
const ASTROS_BASE_URL: &str = "http://api.open-notify.org";

/// Errors that can occur when fetching the crew roster
#[derive(Debug, Error)]
pub enum AstrosError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The API reported failure in its payload despite HTTP success
    #[error("Crew roster API reported failure: {0}")]
    ApiFailure(String),
}

impl From<AstrosError> for FetchError {
    fn from(err: AstrosError) -> Self {
        match err {
            AstrosError::RequestFailed(e) => FetchError::from_reqwest(&e),
            other => FetchError::Protocol(other.to_string()),
        }
    }
}

/// Client for fetching the current people in space
#[derive(Debug, Clone)]
pub struct AstrosClient {
    client: Client,
    base_url: String,
}

impl Default for AstrosClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AstrosClient {
    /// Creates a client against the public API
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: ASTROS_BASE_URL.to_string(),
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

    /// Fetches the crew roster currently in orbit
    pub async fn fetch_crew(&self) -> Result<SpaceCrew, AstrosError> {
        let url = format!("{}/astros.json", self.base_url);
        tracing::debug!(%url, "requesting crew roster");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        let api_response: AstrosResponse = serde_json::from_str(&text)?;

        Self::parse_response(api_response)
    }

    fn parse_response(response: AstrosResponse) -> Result<SpaceCrew, AstrosError> {
        if response.message != "success" {
            return Err(AstrosError::ApiFailure(response.message));
        }

        Ok(SpaceCrew {
            number: response.number,
            people: response
                .people
                .into_iter()
                .map(|person| Astronaut {
                    name: person.name,
                    craft: person.craft,
                })
                .collect(),
        })
    }
}

/// Open Notify crew roster response structure
#[derive(Debug, Deserialize)]
struct AstrosResponse {
    message: String,
    number: u32,
    #[serde(default)]
    people: Vec<RawAstronaut>,
}

#[derive(Debug, Deserialize)]
struct RawAstronaut {
    name: String,
    craft: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_RESPONSE: &str = r#"{
        "message": "success",
        "number": 3,
        "people": [
            {"name": "Oleg Kononenko", "craft": "ISS"},
            {"name": "Nikolai Chub", "craft": "ISS"},
            {"name": "Tracy Caldwell Dyson", "craft": "ISS"}
        ]
    }"#;

    #[test]
    fn test_parse_valid_response() {
        let response: AstrosResponse =
            serde_json::from_str(VALID_RESPONSE).expect("Failed to parse response");
        let crew = AstrosClient::parse_response(response).expect("Failed to parse");

        assert_eq!(crew.number, 3);
        assert_eq!(crew.people.len(), 3);
        assert_eq!(crew.people[0].name, "Oleg Kononenko");
        assert_eq!(crew.people[2].craft, "ISS");
    }

    #[test]
    fn test_non_success_message_is_an_api_failure() {
        let response: AstrosResponse =
            serde_json::from_str(r#"{"message": "error", "number": 0, "people": []}"#)
                .expect("Failed to parse response");

        match AstrosClient::parse_response(response) {
            Err(AstrosError::ApiFailure(message)) => assert_eq!(message, "error"),
            other => panic!("Expected ApiFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_astros_errors_normalize_into_fetch_errors() {
        let err: FetchError = AstrosError::ApiFailure("error".to_string()).into();
        assert!(matches!(err, FetchError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_normalizes_to_network_error() {
        let client = AstrosClient::with_base_url("http://127.0.0.1:9".to_string());
        let err = client.fetch_crew().await.expect_err("connect should fail");

        let normalized: FetchError = err.into();
        assert!(matches!(normalized, FetchError::Network(_)));
    }
}
