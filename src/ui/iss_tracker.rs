//! ISS tracker screen rendering
//!
//! Renders the detailed tracking view: current position, upcoming passes over
//! the observer location, and the crew roster currently in orbit.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{format_age, phase_span};
use crate::app::App;
use crate::data::{format_coordinate, PassPrediction, SpaceCrew};
use crate::poller::DisplayState;

/// Renders the ISS tracker view
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Paragraph::new(Line::from(Span::styled(
        "International Space Station Tracker",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_position_panel(frame, body[0], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(body[1]);

    render_passes_panel(frame, right[0], app);
    render_crew_panel(frame, right[1], app);

    let footer = Paragraph::new(Line::from(Span::styled(
        " 1 Dashboard \u{b7} 2 ISS Tracker \u{b7} 3 Events \u{b7} 4 News \u{b7} r refresh \u{b7} ? help \u{b7} q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, chunks[2]);
}

/// Renders the current position panel from the tracker poller
fn render_position_panel(frame: &mut Frame, area: Rect, app: &App) {
    let status = app.tracker_poller.status();
    let block = Block::default()
        .title(" Current Position ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = match &status.display {
        DisplayState::Loading => Paragraph::new("Locating ISS...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        DisplayState::Error(message) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press r to try again",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            // The last fix stays available even while refreshes fail.
            if let Some(last) = app.tracker_poller.last_known() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(
                        "Last known ({}): {}  {}",
                        format_age(last.fetched_at),
                        format_coordinate(last.data.latitude, "N", "S"),
                        format_coordinate(last.data.longitude, "E", "W"),
                    ),
                    Style::default().fg(Color::Yellow),
                )));
            }
            Paragraph::new(lines).wrap(Wrap { trim: true })
        }
        DisplayState::Ready { data, fetched_at } => {
            let lines = vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled("Latitude    ", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format_coordinate(data.latitude, "N", "S"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Longitude   ", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format_coordinate(data.longitude, "E", "W"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Updated     ", Style::default().fg(Color::DarkGray)),
                    Span::raw(format_age(*fetched_at)),
                ]),
                Line::from(""),
                Line::from(phase_span(status.phase, &status.retry)),
                Line::from(""),
                Line::from(Span::styled(
                    "The ISS orbits at ~28,000 km/h, completing one orbit every 90 minutes.",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            Paragraph::new(lines).wrap(Wrap { trim: true })
        }
    };

    frame.render_widget(paragraph.block(block), area);
}

/// Renders the upcoming passes panel
fn render_passes_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Upcoming Passes ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = match &app.passes {
        DisplayState::Loading => Paragraph::new("Predicting passes...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        DisplayState::Error(message) => Paragraph::new(vec![
            Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Yellow),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press r to try again",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .wrap(Wrap { trim: true }),
        DisplayState::Ready { data, fetched_at } => {
            let mut lines: Vec<Line> = if data.is_empty() {
                vec![Line::from("No visible passes predicted.")]
            } else {
                data.iter().map(pass_line).collect()
            };
            if let Some(observer) = &app.observer {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(
                        "Observer: {}  {}  (fetched {})",
                        format_coordinate(observer.latitude, "N", "S"),
                        format_coordinate(observer.longitude, "E", "W"),
                        format_age(*fetched_at),
                    ),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            Paragraph::new(lines)
        }
    };

    frame.render_widget(paragraph.block(block), area);
}

/// One row of the passes table
fn pass_line(pass: &PassPrediction) -> Line<'static> {
    let minutes = pass.duration_secs / 60;
    let seconds = pass.duration_secs % 60;
    Line::from(vec![
        Span::styled(
            pass.risetime.format("%b %e %H:%M UTC").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{}m {:02}s overhead", minutes, seconds),
            Style::default().fg(Color::Green),
        ),
    ])
}

/// Renders the people-in-space panel
fn render_crew_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" People in Space ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = match &app.crew {
        DisplayState::Loading => Paragraph::new("Fetching crew roster...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        DisplayState::Error(message) => Paragraph::new(Span::styled(
            message.clone(),
            Style::default().fg(Color::Yellow),
        ))
        .wrap(Wrap { trim: true }),
        DisplayState::Ready { data, .. } => Paragraph::new(crew_lines(data)),
    };

    frame.render_widget(paragraph.block(block), area);
}

/// Crew roster lines, grouped one astronaut per row
fn crew_lines(crew: &SpaceCrew) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("{} people are in space right now", crew.number),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(""));
    for astronaut in &crew.people {
        lines.push(Line::from(vec![
            Span::raw(format!("  {}", astronaut.name)),
            Span::styled(
                format!("  ({})", astronaut.craft),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    lines
}
