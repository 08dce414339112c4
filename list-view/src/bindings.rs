//! `wasm-bindgen` surface of the list pages.
//!
//! Each page object owns its controller and the REST source. Filter setters
//! start a refresh when the remote result goes stale; every state change calls
//! the subscribed JS listener so the page can re-render from `view()`.

use chrono::{Local, Utc};
use std::cell::RefCell;
use std::rc::Rc;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use site_common::dates::{month_options, year_of, year_options};
use site_common::{console_error, console_log, format_date_time, Article, Event, Society};

use crate::controller::{ListController, ListEntity};
use crate::entities::{articles_page_view, events_page_view};
use crate::models::{DataServiceConfig, EventType};
use crate::rest::RestSource;
use crate::source::fetch_all;

struct PageHandle<E: ListEntity> {
    controller: Rc<RefCell<ListController<E>>>,
    source: Rc<RestSource>,
    listener: Rc<RefCell<Option<js_sys::Function>>>,
}

impl<E: ListEntity + 'static> PageHandle<E> {
    fn new(config: JsValue) -> Result<Self, JsValue> {
        let config: DataServiceConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid data service config: {}", e)))?;
        Ok(Self {
            controller: Rc::new(RefCell::new(ListController::new())),
            source: Rc::new(RestSource::new(config)),
            listener: Rc::new(RefCell::new(None)),
        })
    }

    fn subscribe(&self, callback: js_sys::Function) {
        *self.listener.borrow_mut() = Some(callback);
    }

    fn notify(listener: &RefCell<Option<js_sys::Function>>) {
        // cloned so the callback may resubscribe
        let callback = listener.borrow().clone();
        if let Some(callback) = callback {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                console_error!("List view listener failed: {:?}", err);
            }
        }
    }

    /// Apply a state change and refresh when it made the result stale
    fn update(&self, change: impl FnOnce(&mut ListController<E>) -> bool) {
        let stale = change(&mut self.controller.borrow_mut());
        if stale {
            self.refresh();
        } else {
            Self::notify(&self.listener);
        }
    }

    fn refresh(&self) {
        let ticket = self.controller.borrow_mut().begin_refresh(Utc::now());
        Self::notify(&self.listener);

        let controller = Rc::clone(&self.controller);
        let source = Rc::clone(&self.source);
        let listener = Rc::clone(&self.listener);
        spawn_local(async move {
            let outcome = fetch_all(source.as_ref(), ticket.queries()).await;
            let applied = controller.borrow_mut().complete_refresh(ticket, outcome);
            if applied {
                Self::notify(&listener);
            }
        });
    }

    fn sync_url(&self, query: &str) -> Option<String> {
        self.controller.borrow().sync_query(query)
    }
}

// Maps (flattened cards among them) become plain objects, not ES2015 `Map`s
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize view: {}", e)))
}

/// Dropdown contents shared by both pages
#[wasm_bindgen]
pub fn filter_options() -> Result<JsValue, JsValue> {
    #[derive(Serialize)]
    struct FilterOptions {
        societies: Vec<&'static str>,
        years: Vec<i32>,
        months: Vec<site_common::dates::MonthOption>,
    }

    to_js(&FilterOptions {
        societies: Society::names(),
        years: year_options(year_of(&Local::now())),
        months: month_options(),
    })
}

macro_rules! page_bindings {
    ($name:ident, $entity:ty) => {
        #[wasm_bindgen]
        impl $name {
            #[wasm_bindgen(constructor)]
            pub fn new(config: JsValue) -> Result<$name, JsValue> {
                Ok(Self {
                    handle: PageHandle::<$entity>::new(config)?,
                })
            }

            /// Register the callback invoked after every state change
            pub fn subscribe(&self, callback: js_sys::Function) {
                self.handle.subscribe(callback);
            }

            /// Seed filters from `location.search` and load the first page
            pub fn mount(&self, query: &str) {
                self.handle.controller.borrow_mut().seed_from_query(query);
                console_log!("Mounting {} list view", <$entity as ListEntity>::TABLE);
                self.handle.refresh();
            }

            /// Query string to write back to the address bar, if it changed
            pub fn sync_url(&self, query: &str) -> Option<String> {
                self.handle.sync_url(query)
            }

            pub fn set_search_term(&self, term: &str) {
                self.handle.update(|c| c.set_search_term(term));
            }

            pub fn set_society(&self, society: &str) {
                self.handle.update(|c| c.set_society(society));
            }

            pub fn set_year(&self, year: &str) {
                self.handle.update(|c| c.set_year(year));
            }

            pub fn set_month(&self, month: &str) {
                self.handle.update(|c| c.set_month(month));
            }

            pub fn set_date(&self, date: &str) {
                self.handle.update(|c| c.set_date(date));
            }

            pub fn go_to_page(&self, page: usize) {
                self.handle.update(|c| c.go_to_page(page));
            }

            pub fn prev_page(&self) {
                self.handle.update(|c| c.prev_page());
            }

            pub fn next_page(&self) {
                self.handle.update(|c| c.next_page());
            }

            pub fn clear_filters(&self) {
                self.handle.update(|c| c.clear_filters());
            }

            pub fn is_loading(&self) -> bool {
                self.handle.controller.borrow().is_loading()
            }
        }
    };
}

/// Events page: upcoming and past event cards
#[wasm_bindgen]
pub struct EventsPage {
    handle: PageHandle<Event>,
}

page_bindings!(EventsPage, Event);

#[wasm_bindgen]
impl EventsPage {
    /// `"all"`, `"upcoming"` or `"past"`
    pub fn set_event_type(&self, event_type: &str) -> Result<(), JsValue> {
        let event_type: EventType = event_type.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.handle.update(|c| c.set_event_type(event_type));
        Ok(())
    }

    /// Card data, dates in the browser's time zone
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let controller = self.handle.controller.borrow();
        let view = events_page_view(&controller, |date| format_date_time(&date.with_timezone(&Local)));
        to_js(&view)
    }
}

/// Articles page
#[wasm_bindgen]
pub struct ArticlesPage {
    handle: PageHandle<Article>,
}

page_bindings!(ArticlesPage, Article);

#[wasm_bindgen]
impl ArticlesPage {
    pub fn view(&self) -> Result<JsValue, JsValue> {
        to_js(&articles_page_view(&self.handle.controller.borrow()))
    }
}
