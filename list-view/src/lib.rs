use wasm_bindgen::prelude::*;

pub mod builder;
pub mod controller;
pub mod entities;
pub mod models;
pub mod source;
pub mod url_sync;

#[cfg(target_arch = "wasm32")]
mod bindings;
#[cfg(target_arch = "wasm32")]
pub mod rest;

#[cfg(target_arch = "wasm32")]
pub use bindings::{filter_options, ArticlesPage, EventsPage};

pub use builder::{QueryBuilder, TableQuery};
pub use controller::{apply_text_filter, ListController, ListEntity, RefreshTicket};
pub use models::{DataServiceConfig, EventType, FilterState};
pub use source::{fetch_all, DataSource, FetchError, MemoryTable, QueryResponse};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Set up panic reporting once the module is instantiated
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
