#[macro_use]
pub mod log;
pub mod dates;
pub mod models;
pub mod pagination;
pub mod query;
pub mod routes;

// Re-exported so the view crates can pull the common pieces from one place
pub use dates::{format_date_time, is_upcoming, parse_timestamp};
pub use models::{Article, Event, Society};
pub use pagination::{pagination_numbers, total_pages, PageMarker, PAGE_SIZE};
pub use routes::Route;
