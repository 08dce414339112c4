//! The two list pages of the site: events and articles.

use chrono::{DateTime, Utc};
use site_common::{Article, Event};

use crate::builder::{QueryBuilder, TableQuery};
use crate::controller::{split_by_event_type, ListController, ListEntity};
use crate::models::{ArticlesPageView, EventCard, EventsPageView, FilterState};

impl ListEntity for Event {
    const TABLE: &'static str = "events";
    const COLUMNS: &'static [&'static str] = Event::COLUMNS;
    const DATE_COLUMN: &'static str = "date";

    fn date(&self) -> &DateTime<Utc> {
        &self.date
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            Some(self.society.as_str()),
            self.venue.as_deref(),
        ]
    }

    /// Upcoming events soonest first, then past events most recent first
    fn plan(base: QueryBuilder, filters: &FilterState, today: &str) -> Vec<TableQuery> {
        split_by_event_type(base, filters.event_type, Self::DATE_COLUMN, today)
    }
}

impl ListEntity for Article {
    const TABLE: &'static str = "articles";
    const COLUMNS: &'static [&'static str] = Article::COLUMNS;
    const DATE_COLUMN: &'static str = "publication_date";

    fn date(&self) -> &DateTime<Utc> {
        &self.publication_date
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.title.as_str()),
            self.author.as_deref(),
            Some(self.publication.as_str()),
            Some(self.short_description.as_str()),
        ]
    }

    fn plan(base: QueryBuilder, _filters: &FilterState, _today: &str) -> Vec<TableQuery> {
        vec![base.order(Self::DATE_COLUMN, false).build()]
    }
}

/// Events page view; `format_date` renders the card date
pub fn events_page_view<F>(controller: &ListController<Event>, format_date: F) -> EventsPageView
where
    F: Fn(&DateTime<Utc>) -> String,
{
    let to_card = |event: Event, is_upcoming: bool| EventCard {
        display_date: format_date(&event.date),
        event,
        is_upcoming,
    };
    let (upcoming, past) = controller.partition();

    EventsPageView {
        upcoming: upcoming.into_iter().map(|e| to_card(e, true)).collect(),
        past: past.into_iter().map(|e| to_card(e, false)).collect(),
        total: controller.total(),
        total_pages: controller.total_pages(),
        current_page: controller.filters().current_page,
        loading: controller.is_loading(),
        pagination: controller.pagination(),
        filters: controller.filters().clone(),
        month_enabled: controller.filters().month_enabled(),
    }
}

pub fn articles_page_view(controller: &ListController<Article>) -> ArticlesPageView {
    ArticlesPageView {
        articles: controller.visible_items(),
        total: controller.total(),
        total_pages: controller.total_pages(),
        current_page: controller.filters().current_page,
        loading: controller.is_loading(),
        pagination: controller.pagination(),
        filters: controller.filters().clone(),
        month_enabled: controller.filters().month_enabled(),
    }
}
