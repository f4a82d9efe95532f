//! Core data models for Skywatch
//!
//! This module contains the data types used throughout the application for
//! representing ISS telemetry, pass predictions, the astronomy picture of the
//! day, celestial events, and space news.

pub mod apod;
pub mod astros;
pub mod events;
pub mod news;
pub mod passes;
pub mod position;

pub use apod::{Apod, ApodClient, ApodError, ApodMedia};
pub use astros::{AstrosClient, AstrosError};
pub use events::{all_events, get_event_by_id};
pub use news::{all_articles, get_article_by_id};
pub use passes::{PassPredictionClient, PassesError};
#[allow(unused_imports)]
pub use position::{LocationProvider, OpenNotifyClient, PositionError, WhereTheIssClient};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A satellite's position at a moment in time
///
/// Both position providers normalize into this shape; providers that do not
/// report altitude or velocity fill in zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssPosition {
    /// Latitude in degrees, positive north
    pub latitude: f64,
    /// Longitude in degrees, positive east
    pub longitude: f64,
    /// Altitude above sea level in kilometers (0 when not reported)
    pub altitude_km: f64,
    /// Ground speed in km/h (0 when not reported)
    pub velocity_kmh: f64,
    /// When the provider computed this position
    pub timestamp: DateTime<Utc>,
}

/// A predicted visible pass of the ISS over an observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassPrediction {
    /// When the satellite rises above the horizon
    pub risetime: DateTime<Utc>,
    /// How long the pass lasts, in seconds
    pub duration_secs: u32,
}

/// A person currently in space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Astronaut {
    pub name: String,
    /// The spacecraft they are aboard
    pub craft: String,
}

/// The current crew roster in orbit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceCrew {
    /// Total number of people in space
    pub number: u32,
    pub people: Vec<Astronaut>,
}

/// A celestial event from the reference catalog
///
/// Uses `&'static str` for string fields to allow static initialization of
/// the events catalog embedded in the binary.
///
/// Note: this struct only implements `Serialize` (not `Deserialize`) because
/// the static string references cannot be safely deserialized. Use
/// `get_event_by_id` to look up events from deserialized event IDs.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CelestialEvent {
    /// Unique identifier for the event
    pub id: &'static str,
    /// Human-readable title
    pub title: &'static str,
    /// Longer description shown in the detail view
    pub description: &'static str,
    /// First day of the event
    pub start_date: NaiveDate,
    /// Last day for multi-day events such as meteor showers
    pub end_date: Option<NaiveDate>,
    /// What kind of event this is
    pub kind: EventKind,
    /// Geographic region, when the event is location-bound
    pub location: Option<&'static str>,
    /// Where and how the event can be observed
    pub visibility: Option<&'static str>,
}

/// Categories of celestial events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Eclipse,
    MeteorShower,
    PlanetConjunction,
    MoonPhase,
    Other,
}

impl EventKind {
    /// Short label used in list rows and filter hints
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Eclipse => "Eclipse",
            EventKind::MeteorShower => "Meteor Shower",
            EventKind::PlanetConjunction => "Conjunction",
            EventKind::MoonPhase => "Moon Phase",
            EventKind::Other => "Other",
        }
    }
}

/// A space news article from the reference list
///
/// Note: `Serialize`-only for the same reason as `CelestialEvent`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NewsArticle {
    /// Unique identifier for the article
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Link to the full story
    pub url: &'static str,
    /// Optional preview image
    pub image_url: Option<&'static str>,
    /// Publisher
    pub source: &'static str,
    pub published_at: NaiveDate,
    pub category: &'static str,
}

/// Errors produced when validating observer coordinates
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObserverError {
    /// Latitude must be within [-90, 90]
    #[error("latitude {0} is out of range (-90 to 90)")]
    LatitudeOutOfRange(String),

    /// Longitude must be within [-180, 180]
    #[error("longitude {0} is out of range (-180 to 180)")]
    LongitudeOutOfRange(String),
}

/// An observer location on the ground
///
/// The terminal analog of a one-shot geolocation reading: provided once via
/// CLI flags, optional, and its absence is a non-fatal condition the
/// pass-prediction view explains to the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub latitude: f64,
    pub longitude: f64,
}

impl Observer {
    /// Validates and builds an observer location.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ObserverError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ObserverError::LatitudeOutOfRange(latitude.to_string()));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ObserverError::LongitudeOutOfRange(longitude.to_string()));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Formats a coordinate with a hemisphere suffix, e.g. `49.2743° N`
pub fn format_coordinate(value: f64, positive_suffix: &str, negative_suffix: &str) -> String {
    let suffix = if value >= 0.0 {
        positive_suffix
    } else {
        negative_suffix
    };
    format!("{:.4}\u{b0} {}", value.abs(), suffix)
}
