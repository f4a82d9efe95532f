//! Static space news reference list
//!
//! This module contains the sample news articles shown in the news view,
//! with lookup and filtering helpers.

use std::sync::OnceLock;

use chrono::NaiveDate;

use super::NewsArticle;

static ARTICLES: OnceLock<Vec<NewsArticle>> = OnceLock::new();

/// Builds a date from catalog literals; every entry below is a valid date.
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid article date")
}

fn build_articles() -> Vec<NewsArticle> {
    vec![
        NewsArticle {
            id: "webb-new-discoveries",
            title: "James Webb Space Telescope Reveals New Discoveries",
            description: "The James Webb Space Telescope continues to revolutionize our \
                understanding of the universe with its latest observations of distant galaxies.",
            url: "https://science.nasa.gov/mission/webb/latestnews/",
            image_url: Some(
                "https://www.nasa.gov/wp-content/uploads/2022/07/web_first_images_release.png",
            ),
            source: "NASA",
            published_at: date(2023, 10, 15),
            category: "Astronomy",
        },
        NewsArticle {
            id: "perseverance-ancient-lake",
            title: "NASA's Perseverance Rover Finds Evidence of Ancient Martian Lake",
            description: "The Perseverance rover has discovered compelling evidence that the \
                Jezero Crater on Mars was once a lake environment that could have supported \
                ancient microbial life.",
            url: "https://www.nasa.gov/missions/mars-2020-perseverance/perseverance-rover/nasas-perseverance-rover-deciphers-ancient-history-of-martian-lake/",
            image_url: Some("https://images-assets.nasa.gov/image/PIA23239/PIA23239~orig.jpg"),
            source: "NASA",
            published_at: date(2023, 9, 28),
            category: "Space Exploration",
        },
        NewsArticle {
            id: "starship-prototype-launch",
            title: "SpaceX Successfully Launches Starship Prototype",
            description: "SpaceX has successfully launched and landed a prototype of its \
                Starship vehicle, designed to eventually carry humans to Mars.",
            url: "https://www.spacex.com/launches/",
            image_url: None,
            source: "SpaceX",
            published_at: date(2023, 9, 15),
            category: "Space Technology",
        },
        NewsArticle {
            id: "earthlike-exoplanet",
            title: "Astronomers Discover Earth-like Exoplanet in Habitable Zone",
            description: "Astronomers have discovered a new exoplanet that is similar in size to \
                Earth and orbits its star in the habitable zone, where liquid water could exist \
                on its surface.",
            url: "https://science.nasa.gov/universe/exoplanets/discovery-alert-a-super-earth-in-the-habitable-zone/",
            image_url: Some("https://science.nasa.gov/wp-content/uploads/2024/01/toi715b1280-illo.jpg"),
            source: "NASA",
            published_at: date(2023, 8, 22),
            category: "Astronomy",
        },
        NewsArticle {
            id: "artemis-moon-mission",
            title: "NASA's Artemis Program Prepares for Moon Mission",
            description: "NASA's Artemis program is making significant progress as it prepares \
                to return humans to the Moon for the first time since the Apollo missions.",
            url: "https://www.nasa.gov/humans-in-space/artemis/",
            image_url: None,
            source: "NASA",
            published_at: date(2023, 8, 10),
            category: "Space Exploration",
        },
        NewsArticle {
            id: "dark-matter-insights",
            title: "New Study Reveals Insights into Dark Matter",
            description: "A new study using data from multiple telescopes has provided new \
                insights into the nature of dark matter, the mysterious substance that makes up \
                a significant portion of the universe.",
            url: "https://www.sciencedaily.com/news/space_time/dark_matter/",
            image_url: None,
            source: "ScienceDaily",
            published_at: date(2023, 7, 28),
            category: "Astrophysics",
        },
    ]
}

/// All articles, newest first
pub fn all_articles() -> &'static [NewsArticle] {
    ARTICLES.get_or_init(build_articles).as_slice()
}

/// Get an article by its ID
pub fn get_article_by_id(id: &str) -> Option<&'static NewsArticle> {
    all_articles().iter().find(|article| article.id == id)
}

/// Distinct categories present in the article list, in first-seen order
pub fn all_categories() -> Vec<&'static str> {
    let mut categories = Vec::new();
    for article in all_articles() {
        if !categories.contains(&article.category) {
            categories.push(article.category);
        }
    }
    categories
}

/// Filters articles by category and a case-insensitive search term
///
/// `category = None` matches every category; an empty search term matches
/// every article.
pub fn filter_articles(category: Option<&str>, search: &str) -> Vec<&'static NewsArticle> {
    let term = search.to_lowercase();
    all_articles()
        .iter()
        .filter(|article| category.map_or(true, |c| article.category == c))
        .filter(|article| {
            term.is_empty()
                || article.title.to_lowercase().contains(&term)
                || article.description.to_lowercase().contains(&term)
        })
        .collect()
}
