//! Dashboard screen rendering
//!
//! Renders the main dashboard: NASA's picture of the day on the left and the
//! live ISS position preview on the right, each driven by its poller status.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{format_age, phase_span};
use crate::app::App;
use crate::data::{format_coordinate, Apod, ApodMedia, IssPosition};
use crate::poller::DisplayState;

/// Renders the dashboard view
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_title(frame, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(chunks[1]);

    render_apod_panel(frame, body[0], app);
    render_preview_panel(frame, body[1], app);

    render_footer(frame, chunks[2]);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "Skywatch",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  \u{2014}  astronomy conditions in your terminal"),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);

    frame.render_widget(title, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " 1 Dashboard \u{b7} 2 ISS Tracker \u{b7} 3 Events \u{b7} 4 News \u{b7} r refresh \u{b7} ? help \u{b7} q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, area);
}

/// Renders the astronomy picture panel from the APOD poller status
fn render_apod_panel(frame: &mut Frame, area: Rect, app: &App) {
    let status = app.apod_poller.status();
    let block = Block::default()
        .title(" NASA Picture of the Day ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = match &status.display {
        DisplayState::Loading => Paragraph::new("Loading cosmic wonders...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        DisplayState::Error(message) => match app.apod_poller.last_known() {
            // Keep showing the last good picture; the failure only blocks
            // updates.
            Some(last) => Paragraph::new(stale_apod_lines(&last.data, message, last.fetched_at))
                .wrap(Wrap { trim: true }),
            None => Paragraph::new(error_lines(message)).wrap(Wrap { trim: true }),
        },
        DisplayState::Ready { data, fetched_at } => {
            let mut lines = apod_lines(data);
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Fetched {}", format_age(*fetched_at)),
                Style::default().fg(Color::DarkGray),
            )));
            Paragraph::new(lines).wrap(Wrap { trim: true })
        }
    };

    frame.render_widget(paragraph.block(block), area);
}

/// Content lines for a picture-of-the-day payload
fn apod_lines(apod: &Apod) -> Vec<Line<'static>> {
    let media_badge = match &apod.media {
        ApodMedia::Image => Span::styled("[image]", Style::default().fg(Color::Green)),
        // Videos cannot be drawn in a terminal cell grid; mark them for the
        // embedded-player URL instead of pretending they are images.
        ApodMedia::Video => Span::styled("[video \u{2014} embedded player]", Style::default().fg(Color::Magenta)),
        ApodMedia::Other(kind) => Span::styled(
            format!("[{}]", kind),
            Style::default().fg(Color::Yellow),
        ),
    };

    vec![
        Line::from(Span::styled(
            apod.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                apod.date.format("%B %e, %Y").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  "),
            media_badge,
        ]),
        Line::from(""),
        Line::from(apod.explanation.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled(apod.credit(), Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            Span::styled(
                apod.best_image_url().to_string(),
                Style::default().fg(Color::Blue),
            ),
        ]),
    ]
}

/// Last-known payload plus a refresh-failure banner
fn stale_apod_lines(
    apod: &Apod,
    message: &str,
    fetched_at: chrono::DateTime<chrono::Utc>,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "Refresh failing: {} \u{2014} showing data from {} (press r to retry)",
                message,
                format_age(fetched_at)
            ),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
    ];
    lines.extend(apod_lines(apod));
    lines
}

/// Error panel with a manual-retry hint
fn error_lines(message: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to try again",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

/// Renders the ISS position preview panel
fn render_preview_panel(frame: &mut Frame, area: Rect, app: &App) {
    let status = app.preview_poller.status();
    let block = Block::default()
        .title(" ISS Live Tracker ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = match &status.display {
        DisplayState::Loading => Paragraph::new("Acquiring satellite signal...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        DisplayState::Error(message) => match app.preview_poller.last_known() {
            Some(last) => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        format!(
                            "Refresh failing \u{2014} last known position from {}",
                            format_age(last.fetched_at)
                        ),
                        Style::default().fg(Color::Yellow),
                    )),
                    Line::from(""),
                ];
                lines.extend(position_lines(&last.data));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )));
                Paragraph::new(lines).wrap(Wrap { trim: true })
            }
            None => Paragraph::new(error_lines(message)).wrap(Wrap { trim: true }),
        },
        DisplayState::Ready { data, .. } => {
            let mut lines = position_lines(data);
            lines.push(Line::from(""));
            lines.push(Line::from(phase_span(status.phase, &status.retry)));
            Paragraph::new(lines)
        }
    };

    frame.render_widget(paragraph.block(block), area);
}

/// Telemetry lines for a position payload
fn position_lines(position: &IssPosition) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Latitude   ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format_coordinate(position.latitude, "N", "S"),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Longitude  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format_coordinate(position.longitude, "E", "W"),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    if position.altitude_km > 0.0 {
        lines.push(Line::from(vec![
            Span::styled("Altitude   ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!(
                "{:.0} km ({:.0} mi)",
                position.altitude_km,
                position.altitude_km * 0.621_371
            )),
        ]));
    }
    if position.velocity_kmh > 0.0 {
        lines.push(Line::from(vec![
            Span::styled("Velocity   ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!(
                "{:.0} km/h ({:.0} mph)",
                position.velocity_kmh,
                position.velocity_kmh * 0.621_371
            )),
        ]));
    }

    lines.push(Line::from(vec![
        Span::styled("Measured   ", Style::default().fg(Color::DarkGray)),
        Span::raw(position.timestamp.format("%H:%M:%S UTC").to_string()),
    ]));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StartupConfig;
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_content(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_dashboard_renders_loading_states_before_data() {
        let app = App::new(StartupConfig::default());
        let content = buffer_content(&app);

        assert!(content.contains("Skywatch"));
        assert!(content.contains("NASA Picture of the Day"));
        assert!(content.contains("Loading cosmic wonders"));
        assert!(content.contains("Acquiring satellite signal"));
    }

    #[test]
    fn test_apod_lines_flag_video_for_embedded_player() {
        let apod = Apod {
            date: chrono::NaiveDate::from_ymd_opt(2023, 7, 2).unwrap(),
            title: "Aurora Australis".to_string(),
            explanation: "A time-lapse from orbit.".to_string(),
            url: "https://www.youtube.com/embed/x".to_string(),
            hdurl: None,
            media: ApodMedia::Video,
            copyright: None,
        };

        let lines = apod_lines(&apod);
        let text: String = lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .map(|span| span.content.as_ref())
            .collect();

        assert!(text.contains("embedded player"));
        assert!(!text.contains("[image]"));
    }

    #[test]
    fn test_position_lines_skip_missing_telemetry() {
        let sparse = IssPosition {
            latitude: -47.37,
            longitude: 151.74,
            altitude_km: 0.0,
            velocity_kmh: 0.0,
            timestamp: Utc::now(),
        };

        let text: String = position_lines(&sparse)
            .iter()
            .flat_map(|line| line.spans.iter())
            .map(|span| span.content.as_ref())
            .collect();

        assert!(text.contains("47.3700"));
        assert!(!text.contains("Altitude"), "zero altitude is not rendered");
        assert!(!text.contains("Velocity"), "zero velocity is not rendered");
    }
}
