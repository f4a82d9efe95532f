//! Celestial events screens
//!
//! Renders the events catalog list (with kind filter and search) and the
//! per-event detail view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::{get_event_by_id, CelestialEvent, EventKind};

/// Color used for each event kind badge
fn kind_color(kind: EventKind) -> Color {
    match kind {
        EventKind::Eclipse => Color::Magenta,
        EventKind::MeteorShower => Color::Yellow,
        EventKind::PlanetConjunction => Color::Cyan,
        EventKind::MoonPhase => Color::Blue,
        EventKind::Other => Color::Gray,
    }
}

/// Renders the events list view
pub fn render_event_list(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_filter_bar(frame, chunks[0], app);

    let events = app.filtered_events();
    let items: Vec<ListItem> = events.iter().map(|event| event_row(event)).collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Celestial Events ({}) ", events.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{25b8} ");

    let mut state = ListState::default();
    if !events.is_empty() {
        state.select(Some(app.event_selection.min(events.len() - 1)));
    }
    frame.render_stateful_widget(list, chunks[1], &mut state);

    let footer = Paragraph::new(Line::from(Span::styled(
        " \u{2191}\u{2193} select \u{b7} Enter details \u{b7} f filter kind \u{b7} / search \u{b7} ? help \u{b7} q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, chunks[2]);
}

/// Filter/search header above the list
fn render_filter_bar(frame: &mut Frame, area: Rect, app: &App) {
    let filter_label = match app.event_filter {
        Some(kind) => kind.label(),
        None => "All",
    };

    let mut spans = vec![
        Span::styled("Filter: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            filter_label,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ];

    if app.search_active || !app.event_search.is_empty() {
        spans.push(Span::styled("   Search: ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            app.event_search.clone(),
            Style::default().fg(Color::Yellow),
        ));
        if app.search_active {
            spans.push(Span::styled("\u{2588}", Style::default().fg(Color::Yellow)));
        }
    }

    let bar = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}

/// One row of the events list
fn event_row(event: &CelestialEvent) -> ListItem<'static> {
    let date = match event.end_date {
        Some(end) => format!(
            "{} \u{2013} {}",
            event.start_date.format("%b %e"),
            end.format("%b %e, %Y")
        ),
        None => event.start_date.format("%b %e, %Y").to_string(),
    };

    ListItem::new(Line::from(vec![
        Span::styled(format!("{:<22}", date), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:<14}", event.kind.label()),
            Style::default().fg(kind_color(event.kind)),
        ),
        Span::raw(event.title),
    ]))
}

/// Renders the detail view for one event
pub fn render_event_detail(frame: &mut Frame, _app: &App, event_id: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let Some(event) = get_event_by_id(event_id) else {
        let missing = Paragraph::new("Event not found.")
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(missing, chunks[0]);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            event.title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            event.kind.label(),
            Style::default().fg(kind_color(event.kind)),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("When: ", Style::default().fg(Color::DarkGray)),
            Span::raw(match event.end_date {
                Some(end) => format!(
                    "{} to {}",
                    event.start_date.format("%B %e, %Y"),
                    end.format("%B %e, %Y")
                ),
                None => event.start_date.format("%B %e, %Y").to_string(),
            }),
        ]),
    ];

    if let Some(location) = event.location {
        lines.push(Line::from(vec![
            Span::styled("Where: ", Style::default().fg(Color::DarkGray)),
            Span::raw(location),
        ]));
    }
    if let Some(visibility) = event.visibility {
        lines.push(Line::from(vec![
            Span::styled("Visibility: ", Style::default().fg(Color::DarkGray)),
            Span::raw(visibility),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(event.description));

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Event Details ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(detail, chunks[0]);

    let footer = Paragraph::new(Line::from(Span::styled(
        " Esc back \u{b7} q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StartupConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw<F: Fn(&mut Frame)>(draw_fn: F) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw_fn(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_event_list_renders_catalog() {
        let app = App::new(StartupConfig::default());
        let content = draw(|frame| render_event_list(frame, &app));

        assert!(content.contains("Celestial Events (6)"));
        assert!(content.contains("Total Solar Eclipse"));
        assert!(content.contains("Filter: All"));
    }

    #[test]
    fn test_event_list_shows_active_filter() {
        let mut app = App::new(StartupConfig::default());
        app.event_filter = Some(EventKind::MeteorShower);
        let content = draw(|frame| render_event_list(frame, &app));

        assert!(content.contains("Celestial Events (2)"));
        assert!(content.contains("Lyrid Meteor Shower"));
        assert!(!content.contains("Total Solar Eclipse"));
    }

    #[test]
    fn test_event_detail_renders_fields() {
        let app = App::new(StartupConfig::default());
        let content = draw(|frame| render_event_detail(frame, &app, "total-solar-eclipse"));

        assert!(content.contains("Total Solar Eclipse"));
        assert!(content.contains("North America"));
        assert!(content.contains("April"));
    }

    #[test]
    fn test_event_detail_handles_unknown_id() {
        let app = App::new(StartupConfig::default());
        let content = draw(|frame| render_event_detail(frame, &app, "nope"));
        assert!(content.contains("Event not found"));
    }
}
