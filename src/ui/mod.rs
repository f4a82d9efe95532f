//! UI rendering module for Skywatch
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod dashboard;
pub mod events;
pub mod help_overlay;
pub mod iss_tracker;
pub mod news;

pub use dashboard::render as render_dashboard;
pub use events::{render_event_detail, render_event_list};
pub use help_overlay::render as render_help_overlay;
pub use iss_tracker::render as render_iss_tracker;
pub use news::render as render_news;

use chrono::{DateTime, Utc};
use ratatui::style::{Color, Style};
use ratatui::text::Span;

use crate::poller::{PollerPhase, RetryState};

/// Compact "how old is this data" label, e.g. `12s ago` or `3m ago`
pub(crate) fn format_age(fetched_at: DateTime<Utc>) -> String {
    let age = Utc::now().signed_duration_since(fetched_at);
    let seconds = age.num_seconds().max(0);
    if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else {
        format!("{}h ago", seconds / 3600)
    }
}

/// Live/updating indicator for a poller-backed widget
pub(crate) fn phase_span(phase: PollerPhase, retry: &RetryState) -> Span<'static> {
    match phase {
        PollerPhase::Polling => Span::styled("\u{25cf} Updating", Style::default().fg(Color::Yellow)),
        PollerPhase::Retrying => Span::styled(
            format!("\u{25cf} Retrying (attempt {})", retry.attempts),
            Style::default().fg(Color::Yellow),
        ),
        PollerPhase::Idle => Span::styled("\u{25cf} Live", Style::default().fg(Color::Green)),
        PollerPhase::Stopped => Span::styled("\u{25cf} Stopped", Style::default().fg(Color::DarkGray)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_age_buckets() {
        assert_eq!(format_age(Utc::now()), "0s ago");
        assert_eq!(format_age(Utc::now() - Duration::seconds(45)), "45s ago");
        assert_eq!(format_age(Utc::now() - Duration::seconds(180)), "3m ago");
        assert_eq!(format_age(Utc::now() - Duration::hours(2)), "2h ago");
    }

    #[test]
    fn test_phase_span_labels() {
        let retry = RetryState {
            attempts: 2,
            last_error: None,
        };
        assert!(phase_span(PollerPhase::Idle, &retry).content.contains("Live"));
        assert!(phase_span(PollerPhase::Polling, &retry)
            .content
            .contains("Updating"));
        assert!(phase_span(PollerPhase::Retrying, &retry)
            .content
            .contains("attempt 2"));
    }
}
