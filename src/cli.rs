//! Command-line interface parsing for Skywatch
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --view flag for opening a specific view directly and the observer
//! coordinates used for ISS pass predictions.

use clap::Parser;
use thiserror::Error;

use crate::data::{Observer, ObserverError};

/// Error types for CLI argument parsing
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    /// The specified view name is not recognized
    #[error("Invalid view: '{0}'. Valid views: dashboard, iss, events, news")]
    InvalidView(String),

    /// Only one of --lat/--lon was given
    #[error("Both --lat and --lon are required to set an observer location")]
    IncompleteCoordinates,

    /// Coordinates were given but out of range
    #[error("Invalid observer location: {0}")]
    InvalidCoordinates(#[from] ObserverError),
}

/// The main views the application can open in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// NASA picture of the day plus the ISS position preview
    #[default]
    Dashboard,
    /// Detailed ISS tracking with pass predictions and crew roster
    IssTracker,
    /// Celestial events catalog
    Events,
    /// Space news list
    News,
}

impl View {
    /// Parses a view name as given on the command line.
    ///
    /// Accepts a few aliases per view so users don't need to remember the
    /// canonical spelling.
    pub fn from_str(s: &str) -> Option<View> {
        match s.to_lowercase().as_str() {
            "dashboard" | "home" => Some(View::Dashboard),
            "iss" | "tracker" | "iss-tracker" => Some(View::IssTracker),
            "events" | "celestial-events" => Some(View::Events),
            "news" => Some(View::News),
            _ => None,
        }
    }
}

/// Skywatch - astronomy conditions in your terminal
#[derive(Parser, Debug)]
#[command(name = "skywatch")]
#[command(about = "ISS tracking, NASA picture of the day, celestial events and space news")]
#[command(version)]
pub struct Cli {
    /// Open directly in a specific view
    ///
    /// Examples:
    ///   skywatch --view iss       # Open the ISS tracker
    ///   skywatch --view events    # Open the celestial events catalog
    ///
    /// Valid views: dashboard, iss, events, news
    #[arg(long, value_name = "VIEW")]
    pub view: Option<String>,

    /// Observer latitude in degrees, -90 to 90 (used for pass predictions)
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Observer longitude in degrees, -180 to 180 (used for pass predictions)
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// NASA API key; falls back to the NASA_API_KEY environment variable
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Which view to show first
    pub initial_view: View,
    /// Observer location for pass predictions, when provided
    pub observer: Option<Observer>,
    /// NASA API key override from the command line
    pub api_key: Option<String>,
}

/// Parses a view string argument into a View enum.
///
/// # Arguments
/// * `s` - The view string from CLI
///
/// # Returns
/// * `Ok(View)` if the string matches a valid view
/// * `Err(CliError::InvalidView)` if the string doesn't match
pub fn parse_view_arg(s: &str) -> Result<View, CliError> {
    View::from_str(s).ok_or_else(|| CliError::InvalidView(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid view or location was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_view = match &cli.view {
            None => View::default(),
            Some(view_str) => parse_view_arg(view_str)?,
        };

        let observer = match (cli.lat, cli.lon) {
            (None, None) => None,
            (Some(lat), Some(lon)) => Some(Observer::new(lat, lon)?),
            _ => return Err(CliError::IncompleteCoordinates),
        };

        Ok(StartupConfig {
            initial_view,
            observer,
            api_key: cli.api_key.clone(),
        })
    }
}
