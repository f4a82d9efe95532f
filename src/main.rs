//! Skywatch - astronomy conditions in your terminal
//!
//! A terminal UI application that tracks the ISS, shows NASA's astronomy
//! picture of the day, and lists celestial events and space news.

mod app;
mod cache;
mod cli;
mod data;
mod logging;
mod poller;
mod ui;

use std::io;
use std::panic;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::{App, AppState};

/// Sets up a panic hook that restores the terminal before printing the panic
/// message. This ensures the terminal is usable even if the application
/// panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match &app.state {
        AppState::Dashboard => {
            ui::render_dashboard(frame, app);
        }
        AppState::IssTracker => {
            ui::render_iss_tracker(frame, app);
        }
        AppState::Events => {
            ui::render_event_list(frame, app);
        }
        AppState::EventDetail(event_id) => {
            ui::render_event_detail(frame, app, event_id);
        }
        AppState::News => {
            ui::render_news(frame, app);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments before touching the terminal so errors print
    // normally.
    let cli = cli::Cli::parse();
    let config = match cli::StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    // Optional file logging; the TUI owns stdout.
    let _log_guard = logging::init_logging();

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app instance and begin polling live data
    let mut app = App::new(config);
    app.start_pollers();

    // Main event loop
    loop {
        // Render UI
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // One-shot loads requested by the tracker view
        if app.tracker_extras_requested {
            app.load_tracker_extras().await;
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Stop pollers and restore terminal
    app.stop_pollers();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
