//! Application state management for Skywatch
//!
//! This module contains the main application state, handling keyboard input,
//! poller wiring, and state transitions between the different views.

use std::time::Duration;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};

use crate::cache::Ttl;
use crate::cli::{StartupConfig, View};
use crate::data::events::filter_events;
use crate::data::news::{all_categories, filter_articles};
use crate::data::position::LocationProvider;
use crate::data::{
    Apod, ApodClient, AstrosClient, CelestialEvent, EventKind, IssPosition, NewsArticle, Observer,
    OpenNotifyClient, PassPrediction, PassPredictionClient, SpaceCrew, WhereTheIssClient,
};
use crate::poller::{Backoff, DisplayState, FetchError, Poller, PollerConfig};

/// Resource identifier for the daily astronomy picture
const APOD_RESOURCE: &str = "nasa-apod";
/// Resource identifier for the dashboard position preview
const PREVIEW_RESOURCE: &str = "iss-position-preview";
/// Resource identifier for the tracker position widget
const TRACKER_RESOURCE: &str = "iss-position-tracker";

/// Message shown in the passes panel when no observer location was given
const NO_OBSERVER_MESSAGE: &str =
    "No observer location set. Restart with --lat and --lon to see pass predictions.";

/// Poller settings for the astronomy picture: one entry per calendar day,
/// re-checked hourly so the widget rolls over after midnight.
fn apod_poller_config() -> PollerConfig {
    PollerConfig {
        ttl: Ttl::SameCalendarDay,
        interval: Duration::from_secs(3600),
        retry_cap: 3,
        backoff: Backoff::default(),
    }
}

/// Poller settings for the dashboard preview (5 s freshness, 10 s cadence)
fn preview_poller_config() -> PollerConfig {
    PollerConfig {
        ttl: Ttl::Duration(Duration::from_secs(5)),
        interval: Duration::from_secs(10),
        retry_cap: 3,
        backoff: Backoff::default(),
    }
}

/// Poller settings for the tracker widget (10 s freshness, 10 s cadence)
fn tracker_poller_config() -> PollerConfig {
    PollerConfig {
        ttl: Ttl::Duration(Duration::from_secs(10)),
        interval: Duration::from_secs(10),
        retry_cap: 3,
        backoff: Backoff::default(),
    }
}

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Dashboard with the astronomy picture and the ISS preview
    Dashboard,
    /// Detailed ISS tracking view
    IssTracker,
    /// Celestial events list
    Events,
    /// Detail view for a specific event
    EventDetail(&'static str),
    /// Space news list
    News,
}

impl From<View> for AppState {
    fn from(view: View) -> Self {
        match view {
            View::Dashboard => AppState::Dashboard,
            View::IssTracker => AppState::IssTracker,
            View::Events => AppState::Events,
            View::News => AppState::News,
        }
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,

    /// Observer location for pass predictions, when provided at startup
    pub observer: Option<Observer>,

    /// Poller for the astronomy picture of the day
    pub apod_poller: Poller<Apod>,
    /// Poller for the dashboard position preview (wheretheiss.at)
    pub preview_poller: Poller<IssPosition>,
    /// Poller for the tracker position widget (Open Notify)
    pub tracker_poller: Poller<IssPosition>,

    /// One-shot pass prediction state for the tracker view
    pub passes: DisplayState<Vec<PassPrediction>>,
    /// One-shot crew roster state for the tracker view
    pub crew: DisplayState<SpaceCrew>,
    /// Flag indicating the tracker extras (passes + crew) should be fetched
    pub tracker_extras_requested: bool,

    /// Selected row in the events list
    pub event_selection: usize,
    /// Active kind filter in the events list
    pub event_filter: Option<EventKind>,
    /// Search term typed in the events list
    pub event_search: String,
    /// Whether keystrokes currently feed the event search box
    pub search_active: bool,

    /// Selected row in the news list
    pub news_selection: usize,
    /// Index into `all_categories()` for the active news filter
    pub news_filter: Option<usize>,

    /// NASA API key resolved at startup
    api_key: Option<String>,
    /// Pass prediction client
    passes_client: PassPredictionClient,
    /// Crew roster client
    astros_client: AstrosClient,
}

impl App {
    /// Creates a new App instance from the startup configuration.
    ///
    /// Pollers are created but not started; call `start_pollers` once a
    /// runtime is available.
    pub fn new(config: StartupConfig) -> Self {
        let api_key = config
            .api_key
            .or_else(|| std::env::var(crate::data::apod::NASA_API_KEY_ENV).ok());

        Self {
            state: AppState::from(config.initial_view),
            should_quit: false,
            show_help: false,
            observer: config.observer,
            apod_poller: Poller::new(apod_poller_config()),
            preview_poller: Poller::new(preview_poller_config()),
            tracker_poller: Poller::new(tracker_poller_config()),
            passes: DisplayState::Loading,
            crew: DisplayState::Loading,
            tracker_extras_requested: matches!(
                config.initial_view,
                View::IssTracker
            ),
            event_selection: 0,
            event_filter: None,
            event_search: String::new(),
            search_active: false,
            news_selection: 0,
            news_filter: None,
            api_key,
            passes_client: PassPredictionClient::new(),
            astros_client: AstrosClient::new(),
        }
    }

    /// Creates a new App instance with custom one-shot clients (for testing)
    #[cfg(test)]
    pub fn with_clients(
        config: StartupConfig,
        passes_client: PassPredictionClient,
        astros_client: AstrosClient,
    ) -> Self {
        let mut app = Self::new(config);
        app.passes_client = passes_client;
        app.astros_client = astros_client;
        app
    }

    /// Starts the background pollers for all live widgets.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_pollers(&mut self) {
        let apod_client = ApodClient::new(self.api_key.clone());
        self.apod_poller.start(APOD_RESOURCE, move || {
            let client = apod_client.clone();
            async move { client.fetch_apod(None).await.map_err(FetchError::from) }
        });

        let preview_client = WhereTheIssClient::new();
        tracing::debug!(provider = preview_client.name(), "starting position preview poller");
        self.preview_poller.start(PREVIEW_RESOURCE, move || {
            let client = preview_client.clone();
            async move {
                client
                    .current_position()
                    .await
                    .map_err(FetchError::from)
            }
        });

        let tracker_client = OpenNotifyClient::new();
        tracing::debug!(provider = tracker_client.name(), "starting tracker position poller");
        self.tracker_poller.start(TRACKER_RESOURCE, move || {
            let client = tracker_client.clone();
            async move {
                client
                    .current_position()
                    .await
                    .map_err(FetchError::from)
            }
        });
    }

    /// Stops every poller; used on shutdown
    pub fn stop_pollers(&mut self) {
        self.apod_poller.stop();
        self.preview_poller.stop();
        self.tracker_poller.stop();
    }

    /// Fetches pass predictions and the crew roster concurrently.
    ///
    /// A missing observer location only affects the passes panel; the crew
    /// roster loads either way.
    pub async fn load_tracker_extras(&mut self) {
        self.tracker_extras_requested = false;

        let crew_future = self.astros_client.fetch_crew();

        match self.observer {
            Some(observer) => {
                let passes_future = self.passes_client.fetch_passes(observer);
                let (passes, crew) = futures::future::join(passes_future, crew_future).await;

                self.passes = match passes {
                    Ok(data) => DisplayState::Ready {
                        data,
                        fetched_at: Utc::now(),
                    },
                    Err(err) => DisplayState::Error(FetchError::from(err).to_string()),
                };
                self.crew = match crew {
                    Ok(data) => DisplayState::Ready {
                        data,
                        fetched_at: Utc::now(),
                    },
                    Err(err) => DisplayState::Error(FetchError::from(err).to_string()),
                };
            }
            None => {
                self.passes = DisplayState::Error(NO_OBSERVER_MESSAGE.to_string());
                self.crew = match crew_future.await {
                    Ok(data) => DisplayState::Ready {
                        data,
                        fetched_at: Utc::now(),
                    },
                    Err(err) => DisplayState::Error(FetchError::from(err).to_string()),
                };
            }
        }
    }

    /// Events visible under the current filter and search term
    pub fn filtered_events(&self) -> Vec<&'static CelestialEvent> {
        filter_events(self.event_filter, &self.event_search)
    }

    /// Articles visible under the current category filter
    pub fn filtered_articles(&self) -> Vec<&'static NewsArticle> {
        let category = self
            .news_filter
            .and_then(|index| all_categories().get(index).copied());
        filter_articles(category, "")
    }

    /// Name of the active news category filter, if any
    pub fn news_category_label(&self) -> Option<&'static str> {
        self.news_filter
            .and_then(|index| all_categories().get(index).copied())
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (from any view, unless typing a search)
    /// - `1`-`4`: Switch to Dashboard / ISS Tracker / Events / News
    /// - `r`: Refresh the current view's data
    /// - `?`: Toggle help overlay
    /// - `Up`/`k`, `Down`/`j`: Move selection in lists
    /// - `Enter`: Open the selected event
    /// - `f`: Cycle the event kind filter; `/`: search events
    /// - `c`: Cycle the news category filter
    /// - `Esc`: Close overlay / leave detail / quit from a top-level view
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown.
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        // Search entry mode feeds keystrokes into the search buffer.
        if self.search_active {
            match key_event.code {
                KeyCode::Esc => {
                    self.search_active = false;
                    self.event_search.clear();
                    self.event_selection = 0;
                }
                KeyCode::Enter => {
                    self.search_active = false;
                }
                KeyCode::Backspace => {
                    self.event_search.pop();
                    self.event_selection = 0;
                }
                KeyCode::Char(c) => {
                    self.event_search.push(c);
                    self.event_selection = 0;
                }
                _ => {}
            }
            return;
        }

        // View switching and help work the same everywhere.
        match key_event.code {
            KeyCode::Char('1') => {
                self.state = AppState::Dashboard;
                return;
            }
            KeyCode::Char('2') => {
                self.enter_tracker();
                return;
            }
            KeyCode::Char('3') => {
                self.state = AppState::Events;
                return;
            }
            KeyCode::Char('4') => {
                self.state = AppState::News;
                return;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return;
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        match &self.state {
            AppState::Dashboard => match key_event.code {
                KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Char('r') => {
                    self.apod_poller.manual_retry();
                    self.preview_poller.manual_retry();
                }
                _ => {}
            },
            AppState::IssTracker => match key_event.code {
                KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Char('r') => {
                    self.tracker_poller.manual_retry();
                    self.tracker_extras_requested = true;
                }
                _ => {}
            },
            AppState::Events => match key_event.code {
                KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_event_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_event_selection_down();
                }
                KeyCode::Enter => {
                    let events = self.filtered_events();
                    if let Some(event) = events.get(self.event_selection) {
                        self.state = AppState::EventDetail(event.id);
                    }
                }
                KeyCode::Char('f') => {
                    self.cycle_event_filter();
                }
                KeyCode::Char('/') => {
                    self.search_active = true;
                }
                _ => {}
            },
            AppState::EventDetail(_) => match key_event.code {
                KeyCode::Esc | KeyCode::Backspace => {
                    self.state = AppState::Events;
                }
                _ => {}
            },
            AppState::News => match key_event.code {
                KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_news_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_news_selection_down();
                }
                KeyCode::Char('c') => {
                    self.cycle_news_filter();
                }
                _ => {}
            },
        }
    }

    /// Switches to the tracker view, requesting its one-shot data on first
    /// entry
    fn enter_tracker(&mut self) {
        if self.state != AppState::IssTracker && !self.passes.is_ready() && !self.crew.is_ready() {
            self.tracker_extras_requested = true;
        }
        self.state = AppState::IssTracker;
    }

    /// Moves the event selection up, wrapping to the bottom at the top
    fn move_event_selection_up(&mut self) {
        let count = self.filtered_events().len();
        if count == 0 {
            return;
        }
        if self.event_selection == 0 {
            self.event_selection = count - 1;
        } else {
            self.event_selection -= 1;
        }
    }

    /// Moves the event selection down, wrapping to the top at the bottom
    fn move_event_selection_down(&mut self) {
        let count = self.filtered_events().len();
        if count == 0 {
            return;
        }
        self.event_selection = (self.event_selection + 1) % count;
    }

    /// Moves the news selection up, wrapping to the bottom at the top
    fn move_news_selection_up(&mut self) {
        let count = self.filtered_articles().len();
        if count == 0 {
            return;
        }
        if self.news_selection == 0 {
            self.news_selection = count - 1;
        } else {
            self.news_selection -= 1;
        }
    }

    /// Moves the news selection down, wrapping to the top at the bottom
    fn move_news_selection_down(&mut self) {
        let count = self.filtered_articles().len();
        if count == 0 {
            return;
        }
        self.news_selection = (self.news_selection + 1) % count;
    }

    /// Cycles the event kind filter: all kinds, then each kind in turn
    fn cycle_event_filter(&mut self) {
        self.event_filter = match self.event_filter {
            None => Some(EventKind::Eclipse),
            Some(EventKind::Eclipse) => Some(EventKind::MeteorShower),
            Some(EventKind::MeteorShower) => Some(EventKind::PlanetConjunction),
            Some(EventKind::PlanetConjunction) => Some(EventKind::MoonPhase),
            Some(EventKind::MoonPhase) => Some(EventKind::Other),
            Some(EventKind::Other) => None,
        };
        self.event_selection = 0;
    }

    /// Cycles the news category filter: all categories, then each in turn
    fn cycle_news_filter(&mut self) {
        let count = all_categories().len();
        self.news_filter = match self.news_filter {
            None if count > 0 => Some(0),
            Some(index) if index + 1 < count => Some(index + 1),
            _ => None,
        };
        self.news_selection = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        App::new(StartupConfig::default())
    }

    #[test]
    fn test_new_app_starts_on_configured_view() {
        let app = test_app();
        assert_eq!(app.state, AppState::Dashboard);
        assert!(!app.should_quit);

        let config = StartupConfig {
            initial_view: View::News,
            ..Default::default()
        };
        assert_eq!(App::new(config).state, AppState::News);
    }

    #[test]
    fn test_opening_in_tracker_requests_extras() {
        let config = StartupConfig {
            initial_view: View::IssTracker,
            ..Default::default()
        };
        let app = App::new(config);
        assert!(app.tracker_extras_requested);
        assert!(!test_app().tracker_extras_requested);
    }

    #[test]
    fn test_number_keys_switch_views() {
        let mut app = test_app();

        app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(app.state, AppState::IssTracker);
        assert!(app.tracker_extras_requested, "entering the tracker loads extras");

        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.state, AppState::Events);

        app.handle_key(key(KeyCode::Char('4')));
        assert_eq!(app.state, AppState::News);

        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.state, AppState::Dashboard);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = test_app();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay_intercepts_keys() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.show_help);

        // Keys other than the dismiss keys are swallowed.
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.state, AppState::Dashboard);
        assert!(app.show_help);

        app.handle_key(key(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit, "Esc only closes the overlay");
    }

    #[test]
    fn test_event_selection_wraps() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('3')));
        let count = app.filtered_events().len();
        assert!(count > 0);

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.event_selection, count - 1, "wraps to the bottom");

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.event_selection, 0, "wraps back to the top");
    }

    #[test]
    fn test_enter_opens_event_detail_and_esc_returns() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('3')));
        app.handle_key(key(KeyCode::Down));
        let expected = app.filtered_events()[1].id;

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::EventDetail(expected));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Events);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_event_filter_cycles_through_kinds_and_back() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('3')));

        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.event_filter, Some(EventKind::Eclipse));
        assert!(app
            .filtered_events()
            .iter()
            .all(|e| e.kind == EventKind::Eclipse));

        // Cycle all the way around.
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Char('f')));
        }
        assert_eq!(app.event_filter, None);
    }

    #[test]
    fn test_event_search_narrows_the_list() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('3')));
        app.handle_key(key(KeyCode::Char('/')));
        assert!(app.search_active);

        for c in "perseid".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.filtered_events().len(), 1);
        assert_eq!(app.filtered_events()[0].id, "perseid-meteor-shower");

        // 'q' is typed into the search box, not quit.
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Backspace));

        app.handle_key(key(KeyCode::Enter));
        assert!(!app.search_active);
        assert_eq!(app.event_search, "perseid");

        // Re-entering search and hitting Esc clears the term.
        app.handle_key(key(KeyCode::Char('/')));
        app.handle_key(key(KeyCode::Esc));
        assert!(app.event_search.is_empty());
    }

    #[test]
    fn test_news_filter_cycles_categories() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('4')));
        assert_eq!(app.news_category_label(), None);

        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.news_category_label(), Some("Astronomy"));
        assert!(app
            .filtered_articles()
            .iter()
            .all(|a| a.category == "Astronomy"));

        // Cycling past the last category clears the filter.
        for _ in 0..all_categories().len() {
            app.handle_key(key(KeyCode::Char('c')));
        }
        assert_eq!(app.news_category_label(), None);
    }

    #[test]
    fn test_refresh_key_requests_tracker_extras() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('2')));
        app.tracker_extras_requested = false;

        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.tracker_extras_requested);
    }

    #[tokio::test]
    async fn test_load_tracker_extras_without_observer() {
        // Clients pointed at a closed local port fail fast and
        // deterministically; no real network is touched.
        let unroutable = "http://127.0.0.1:9".to_string();
        let mut app = App::with_clients(
            StartupConfig::default(),
            PassPredictionClient::with_base_url(unroutable.clone()),
            AstrosClient::with_base_url(unroutable),
        );
        app.tracker_extras_requested = true;
        app.observer = None;

        app.load_tracker_extras().await;

        assert!(!app.tracker_extras_requested);
        // Missing location is the distinguished non-fatal notice, not a
        // network error.
        assert_eq!(app.passes.error(), Some(NO_OBSERVER_MESSAGE));
        // The crew fetch still ran (and failed against the closed port).
        assert!(app.crew.error().is_some());
    }

    #[tokio::test]
    async fn test_load_tracker_extras_with_observer_fetches_both() {
        let unroutable = "http://127.0.0.1:9".to_string();
        let mut app = App::with_clients(
            StartupConfig::default(),
            PassPredictionClient::with_base_url(unroutable.clone()),
            AstrosClient::with_base_url(unroutable),
        );
        app.observer = Some(Observer::new(49.2743, -123.1544).unwrap());
        app.tracker_extras_requested = true;

        app.load_tracker_extras().await;

        assert!(!app.tracker_extras_requested);
        // Both fetches were attempted; both surface normalized errors rather
        // than the missing-location notice.
        assert_ne!(app.passes.error(), Some(NO_OBSERVER_MESSAGE));
        assert!(app.passes.error().is_some());
        assert!(app.crew.error().is_some());
    }
}
