//! Filter state, remote query derivation and pagination of one list page.
//!
//! A refresh is split in two so the browser bindings never hold a borrow of
//! the controller across an await point:
//!
//! 1. [`ListController::begin_refresh`] snapshots the filters, derives the
//!    queries and hands out a [`RefreshTicket`] carrying a generation number.
//! 2. The caller runs the queries (see [`crate::source::fetch_all`]).
//! 3. [`ListController::complete_refresh`] applies the outcome, unless a newer
//!    refresh has started in the meantime.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use site_common::dates::{day_string, is_upcoming};
use site_common::pagination::paginate;
use site_common::{
    console_debug, console_error, console_warn, pagination_numbers, total_pages, PageMarker, PAGE_SIZE,
};

use crate::builder::{QueryBuilder, TableQuery};
use crate::models::{EventType, FilterState};
use crate::source::{fetch_all, DataSource, FetchError, QueryResponse};
use crate::url_sync;

/// A record type a list page can show
pub trait ListEntity: Clone + Serialize + DeserializeOwned {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Column the year, month and date filters apply to
    const DATE_COLUMN: &'static str;

    fn date(&self) -> &DateTime<Utc>;

    /// Fields the client-side search looks at; `None` for absent optional ones
    fn search_fields(&self) -> Vec<Option<&str>>;

    /// Queries for one refresh. `base` already carries the table, columns,
    /// exact count and the remote filters; `today` is `YYYY-MM-DD`.
    fn plan(base: QueryBuilder, filters: &FilterState, today: &str) -> Vec<TableQuery>;
}

/// Work order of one refresh
#[derive(Clone, Debug)]
pub struct RefreshTicket {
    generation: u64,
    page: usize,
    now: DateTime<Utc>,
    queries: Vec<TableQuery>,
}

impl RefreshTicket {
    pub fn queries(&self) -> &[TableQuery] {
        &self.queries
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// State of one list page: filters, the loaded page of rows and its totals
#[derive(Clone, Debug)]
pub struct ListController<E: ListEntity> {
    filters: FilterState,
    items: Vec<E>,
    total: usize,
    total_pages: usize,
    loading: bool,
    generation: u64,
    /// Clock of the refresh that produced `items`
    clock: DateTime<Utc>,
}

impl<E: ListEntity> Default for ListController<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ListEntity> ListController<E> {
    pub fn new() -> Self {
        Self {
            filters: FilterState::default(),
            items: Vec::new(),
            total: 0,
            total_pages: 0,
            loading: false,
            generation: 0,
            clock: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Rows of the current page, before the text search
    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn clock(&self) -> DateTime<Utc> {
        self.clock
    }

    //===== Filter updates =====
    //
    // Every setter returns whether the remote result is now stale. Changing
    // any filter also moves back to the first page.

    /// Text search runs on the loaded page only. It is stale only when the
    /// page reset leaves a page other than the first one loaded.
    pub fn set_search_term(&mut self, term: &str) -> bool {
        if !replace(&mut self.filters.search_term, term) {
            return false;
        }
        let was_first = self.filters.current_page == 1;
        self.filters.current_page = 1;
        !was_first
    }

    pub fn set_society(&mut self, society: &str) -> bool {
        let changed = replace(&mut self.filters.society, society);
        self.reset_page_if(changed)
    }

    pub fn set_year(&mut self, year: &str) -> bool {
        let changed = replace(&mut self.filters.year, year);
        self.reset_page_if(changed)
    }

    /// The month only narrows the query once a year is set. Without one the
    /// change is stale only when the page reset leaves a later page.
    pub fn set_month(&mut self, month: &str) -> bool {
        if !replace(&mut self.filters.month, month) {
            return false;
        }
        let was_first = self.filters.current_page == 1;
        self.filters.current_page = 1;
        !self.filters.year.is_empty() || !was_first
    }

    pub fn set_date(&mut self, date: &str) -> bool {
        let changed = replace(&mut self.filters.date, date);
        self.reset_page_if(changed)
    }

    pub fn set_event_type(&mut self, event_type: EventType) -> bool {
        let changed = self.filters.event_type != event_type;
        self.filters.event_type = event_type;
        self.reset_page_if(changed)
    }

    /// Jump to a page. Page 0 and pages past the end are rejected.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == 0 || (self.total_pages > 0 && page > self.total_pages) {
            return false;
        }
        if page == self.filters.current_page {
            return false;
        }
        self.filters.current_page = page;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        let page = self.filters.current_page.saturating_sub(1).max(1);
        self.go_to_page(page)
    }

    pub fn next_page(&mut self) -> bool {
        let page = (self.filters.current_page + 1).min(self.total_pages.max(1));
        self.go_to_page(page)
    }

    /// Reset every filter and go back to the first page
    pub fn clear_filters(&mut self) -> bool {
        let cleared = FilterState::default();
        let stale = FilterState {
            search_term: String::new(),
            ..self.filters.clone()
        } != cleared;
        self.filters = cleared;
        stale
    }

    fn reset_page_if(&mut self, changed: bool) -> bool {
        if changed {
            self.filters.current_page = 1;
        }
        changed
    }

    //===== URL synchronization =====

    /// Seed the society filter from the page's query string on mount
    pub fn seed_from_query(&mut self, query: &str) -> bool {
        match url_sync::society_from_query(query) {
            Some(society) => self.set_society(&society),
            None => false,
        }
    }

    /// New query string for the address bar, or `None` when it already
    /// matches the society filter
    pub fn sync_query(&self, query: &str) -> Option<String> {
        url_sync::sync_society_param(query, &self.filters.society)
    }

    //===== Refresh =====

    /// Queries for the current filters, with `now` as the refresh clock
    pub fn plan(&self, now: &DateTime<Utc>) -> Vec<TableQuery> {
        let base = QueryBuilder::from(E::TABLE)
            .select(E::COLUMNS)
            .exact_count()
            .apply_filters(&self.filters, E::DATE_COLUMN);
        E::plan(base, &self.filters, &day_string(now))
    }

    pub fn begin_refresh(&mut self, now: DateTime<Utc>) -> RefreshTicket {
        self.generation += 1;
        self.loading = true;
        RefreshTicket {
            generation: self.generation,
            page: self.filters.current_page,
            queries: self.plan(&now),
            now,
        }
    }

    /// Apply the outcome of a refresh. Returns `false` when the ticket was
    /// superseded by a newer refresh and nothing changed.
    ///
    /// Failures are logged and shown as an empty result.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        outcome: Result<Vec<QueryResponse>, FetchError>,
    ) -> bool {
        if ticket.generation != self.generation {
            console_debug!(
                "Dropping stale {} result (generation {}, latest {})",
                E::TABLE,
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.loading = false;
        self.clock = ticket.now;

        match outcome.and_then(combine::<E>) {
            Ok((rows, total)) => {
                if total > rows.len() {
                    console_warn!(
                        "{}: service reported {} rows but returned {}",
                        E::TABLE,
                        total,
                        rows.len()
                    );
                }
                self.total = total;
                self.total_pages = total_pages(total, PAGE_SIZE);
                self.items = paginate(&rows, ticket.page, PAGE_SIZE);
            }
            Err(err) => {
                console_error!("Error fetching {}: {}", E::TABLE, err);
                self.items.clear();
                self.total = 0;
                self.total_pages = 0;
            }
        }
        true
    }

    /// Run a full refresh against `source`
    pub async fn refresh<S: DataSource>(&mut self, source: &S, now: DateTime<Utc>) -> bool {
        let ticket = self.begin_refresh(now);
        let outcome = fetch_all(source, ticket.queries()).await;
        self.complete_refresh(ticket, outcome)
    }

    //===== Derived views =====

    /// Current page narrowed by the search term
    pub fn visible_items(&self) -> Vec<E> {
        apply_text_filter(&self.items, &self.filters.search_term)
    }

    /// Visible rows split into (upcoming, past) against the refresh clock
    pub fn partition(&self) -> (Vec<E>, Vec<E>) {
        self.visible_items()
            .into_iter()
            .partition(|item| is_upcoming(item.date(), &self.clock))
    }

    pub fn pagination(&self) -> Vec<PageMarker> {
        pagination_numbers(self.filters.current_page, self.total_pages)
    }
}

fn replace(slot: &mut String, value: &str) -> bool {
    if slot == value {
        return false;
    }
    *slot = value.to_string();
    true
}

// Decode and concatenate the responses in plan order; the total is the sum of
// the reported counts (row count where none was reported)
fn combine<E: ListEntity>(responses: Vec<QueryResponse>) -> Result<(Vec<E>, usize), FetchError> {
    let mut rows = Vec::new();
    let mut total = 0;
    for response in responses {
        total += response.count.unwrap_or(response.rows.len());
        for row in response.rows {
            rows.push(serde_json::from_value::<E>(row)?);
        }
    }
    Ok((rows, total))
}

/// Case-insensitive substring search over each item's search fields.
/// An empty term keeps everything.
pub fn apply_text_filter<E: ListEntity>(items: &[E], term: &str) -> Vec<E> {
    if term.is_empty() {
        return items.to_vec();
    }
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.search_fields()
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

pub(crate) fn split_by_event_type(
    base: QueryBuilder,
    event_type: EventType,
    date_column: &str,
    today: &str,
) -> Vec<TableQuery> {
    let mut queries = Vec::new();
    if event_type.includes_upcoming() {
        queries.push(
            base.clone()
                .gte(date_column, today)
                .order(date_column, true)
                .build(),
        );
    }
    if event_type.includes_past() {
        queries.push(base.lt(date_column, today).order(date_column, false).build());
    }
    queries
}
