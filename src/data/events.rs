//! Static celestial events catalog
//!
//! This module contains the reference list of upcoming celestial events shown
//! in the events view, with lookup and filtering helpers.

use std::sync::OnceLock;

use chrono::NaiveDate;

use super::{CelestialEvent, EventKind};

static EVENTS: OnceLock<Vec<CelestialEvent>> = OnceLock::new();

/// Builds a date from catalog literals; every entry below is a valid date.
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid catalog date")
}

fn build_catalog() -> Vec<CelestialEvent> {
    vec![
        CelestialEvent {
            id: "total-solar-eclipse",
            title: "Total Solar Eclipse",
            description: "A total solar eclipse occurs when the Moon completely blocks the Sun, \
                revealing the Sun's outer atmosphere known as the corona.",
            start_date: date(2024, 4, 8),
            end_date: None,
            kind: EventKind::Eclipse,
            location: Some("North America"),
            visibility: Some("Visible from parts of Mexico, United States, and Canada"),
        },
        CelestialEvent {
            id: "lyrid-meteor-shower",
            title: "Lyrid Meteor Shower",
            description: "The Lyrids are an annual meteor shower that peaks in April. They are \
                caused by the Earth passing through the debris left by Comet C/1861 G1 Thatcher.",
            start_date: date(2024, 4, 16),
            end_date: Some(date(2024, 4, 25)),
            kind: EventKind::MeteorShower,
            location: None,
            visibility: Some("Best viewed from the Northern Hemisphere"),
        },
        CelestialEvent {
            id: "venus-jupiter-conjunction",
            title: "Venus-Jupiter Conjunction",
            description: "A close approach of Venus and Jupiter in the night sky, appearing less \
                than 0.5 degrees apart.",
            start_date: date(2024, 5, 23),
            end_date: None,
            kind: EventKind::PlanetConjunction,
            location: None,
            visibility: Some("Visible worldwide shortly after sunset"),
        },
        CelestialEvent {
            id: "strawberry-moon",
            title: "Full Moon (Strawberry Moon)",
            description: "The full moon in June is known as the Strawberry Moon because it \
                coincides with the ripening of strawberries in North America.",
            start_date: date(2024, 6, 21),
            end_date: None,
            kind: EventKind::MoonPhase,
            location: None,
            visibility: Some("Visible worldwide"),
        },
        CelestialEvent {
            id: "perseid-meteor-shower",
            title: "Perseid Meteor Shower",
            description: "One of the most popular meteor showers, the Perseids are known for \
                producing numerous bright meteors. They are associated with the comet \
                Swift-Tuttle.",
            start_date: date(2024, 7, 17),
            end_date: Some(date(2024, 8, 24)),
            kind: EventKind::MeteorShower,
            location: None,
            visibility: Some("Best viewed from the Northern Hemisphere"),
        },
        CelestialEvent {
            id: "partial-lunar-eclipse",
            title: "Partial Lunar Eclipse",
            description: "A partial lunar eclipse occurs when the Earth moves between the Sun and \
                the Moon, but they are not precisely aligned. Only part of the Moon's visible \
                surface moves into the Earth's shadow.",
            start_date: date(2024, 9, 18),
            end_date: None,
            kind: EventKind::Eclipse,
            location: None,
            visibility: Some("Visible from Europe, Africa, Asia, and Australia"),
        },
    ]
}

/// All events in the catalog, in chronological order
pub fn all_events() -> &'static [CelestialEvent] {
    EVENTS.get_or_init(build_catalog).as_slice()
}

/// Get an event by its ID
///
/// # Arguments
///
/// * `id` - The unique identifier for the event (e.g., "total-solar-eclipse")
///
/// # Returns
///
/// Returns `Some(&CelestialEvent)` if found, `None` otherwise
pub fn get_event_by_id(id: &str) -> Option<&'static CelestialEvent> {
    all_events().iter().find(|event| event.id == id)
}

/// Filters events by kind and a case-insensitive search term
///
/// `kind = None` matches every kind; an empty search term matches every
/// event. The term is checked against both title and description, mirroring
/// the events page this catalog came from.
pub fn filter_events(kind: Option<EventKind>, search: &str) -> Vec<&'static CelestialEvent> {
    let term = search.to_lowercase();
    all_events()
        .iter()
        .filter(|event| kind.map_or(true, |k| event.kind == k))
        .filter(|event| {
            term.is_empty()
                || event.title.to_lowercase().contains(&term)
                || event.description.to_lowercase().contains(&term)
        })
        .collect()
}
