use serde::{Deserialize, Serialize};
use site_common::{Article, Event, PageMarker};
use std::str::FromStr;

/// Which side of "today" the events page shows
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    All,
    Upcoming,
    Past,
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(EventType::All),
            "upcoming" => Ok(EventType::Upcoming),
            "past" => Ok(EventType::Past),
            other => Err(format!("Unknown event type: {}", other)),
        }
    }
}

impl EventType {
    pub fn includes_upcoming(self) -> bool {
        matches!(self, EventType::All | EventType::Upcoming)
    }

    pub fn includes_past(self) -> bool {
        matches!(self, EventType::All | EventType::Past)
    }
}

/// User-controlled filters of one list view.
///
/// Empty strings mean "not set". Only `society` is mirrored in the URL.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FilterState {
    /// Client-side text search over the loaded page
    pub search_term: String,
    /// Society display name, matched exactly
    pub society: String,
    /// Four-digit year
    pub year: String,
    /// Two-digit month, only effective together with `year`
    pub month: String,
    /// Exact `YYYY-MM-DD`
    pub date: String,
    /// Events page only
    pub event_type: EventType,
    /// 1-based
    pub current_page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            society: String::new(),
            year: String::new(),
            month: String::new(),
            date: String::new(),
            event_type: EventType::All,
            current_page: 1,
        }
    }
}

impl FilterState {
    /// The month dropdown is disabled until a year is picked
    pub fn month_enabled(&self) -> bool {
        !self.year.is_empty()
    }
}

/// Connection settings of the remote table service, passed in from JS
#[derive(Deserialize, Clone, Debug)]
pub struct DataServiceConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Public (anon) API key
    pub anon_key: String,
    /// Path of the REST endpoint below `base_url`
    #[serde(default = "default_rest_path")]
    pub rest_path: String,
}

fn default_rest_path() -> String {
    "/rest/v1".to_string()
}

/// Event as handed to the event card renderer
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EventCard {
    #[serde(flatten)]
    pub event: Event,
    /// Preformatted by the page's date formatter
    pub display_date: String,
    pub is_upcoming: bool,
}

/// Everything the events page renders
#[derive(Serialize, Clone, Debug)]
pub struct EventsPageView {
    pub upcoming: Vec<EventCard>,
    pub past: Vec<EventCard>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub loading: bool,
    pub pagination: Vec<PageMarker>,
    pub filters: FilterState,
    pub month_enabled: bool,
}

/// Everything the articles page renders
#[derive(Serialize, Clone, Debug)]
pub struct ArticlesPageView {
    pub articles: Vec<Article>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub loading: bool,
    pub pagination: Vec<PageMarker>,
    pub filters: FilterState,
    pub month_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_start_on_first_page() {
        let filters = FilterState::default();
        assert_eq!(filters.current_page, 1);
        assert_eq!(filters.event_type, EventType::All);
        assert!(!filters.month_enabled());
    }

    #[test]
    fn filters_decode_from_partial_json() {
        let filters: FilterState =
            serde_json::from_str(r#"{"society":"Photonics Society","event_type":"past"}"#).unwrap();
        assert_eq!(filters.society, "Photonics Society");
        assert_eq!(filters.event_type, EventType::Past);
        assert_eq!(filters.current_page, 1);
    }

    #[test]
    fn event_type_parses_dropdown_values() {
        assert_eq!("upcoming".parse::<EventType>(), Ok(EventType::Upcoming));
        assert_eq!("all".parse::<EventType>(), Ok(EventType::All));
        assert!("future".parse::<EventType>().is_err());
    }

    #[test]
    fn event_card_carries_event_columns_at_top_level() {
        let card = EventCard {
            event: Event {
                title: "Robotics Night".to_string(),
                description: "Demos".to_string(),
                date: site_common::parse_timestamp("2025-03-05T18:00:00Z").unwrap(),
                venue: None,
                image_url: Some("https://example.org/r.png".to_string()),
                society: "Robotics and Automation Society".to_string(),
            },
            display_date: "05 March 2025 • 6:00 PM".to_string(),
            is_upcoming: true,
        };

        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            serde_json::json!({
                "title": "Robotics Night",
                "description": "Demos",
                "date": "2025-03-05T18:00:00Z",
                "venue": null,
                "image_url": "https://example.org/r.png",
                "society": "Robotics and Automation Society",
                "display_date": "05 March 2025 • 6:00 PM",
                "is_upcoming": true,
            })
        );
    }

    #[test]
    fn config_defaults_rest_path() {
        let config: DataServiceConfig =
            serde_json::from_str(r#"{"base_url":"https://x.supabase.co","anon_key":"k"}"#).unwrap();
        assert_eq!(config.rest_path, "/rest/v1");
    }
}
