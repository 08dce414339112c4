//! PostgREST client on top of the browser's `fetch`.

use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::builder::TableQuery;
use crate::models::DataServiceConfig;
use crate::source::{parse_content_range, DataSource, FetchError, QueryResponse};

pub struct RestSource {
    config: DataServiceConfig,
}

impl RestSource {
    pub fn new(config: DataServiceConfig) -> Self {
        Self { config }
    }

    fn url(&self, query: &TableQuery) -> String {
        format!(
            "{}{}/{}?{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.rest_path,
            query.table,
            query.to_query_string()
        )
    }

    fn request(&self, query: &TableQuery) -> Result<Request, JsValue> {
        let headers = Headers::new()?;
        headers.set("apikey", &self.config.anon_key)?;
        headers.set("Authorization", &format!("Bearer {}", self.config.anon_key))?;
        headers.set("Accept", "application/json")?;
        if query.count_exact {
            headers.set("Prefer", "count=exact")?;
        }

        let init = RequestInit::new();
        init.set_method("GET");
        init.set_headers(&headers);
        Request::new_with_str_and_init(&self.url(query), &init)
    }
}

fn network_error(err: JsValue) -> FetchError {
    FetchError::Network(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

impl DataSource for RestSource {
    async fn select(&self, query: &TableQuery) -> Result<QueryResponse, FetchError> {
        let window = web_sys::window().ok_or_else(|| FetchError::Network("no window".to_string()))?;
        let request = self.request(query).map_err(network_error)?;

        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network_error)?;
        let response: Response = response.dyn_into().map_err(network_error)?;

        if !response.ok() {
            return Err(FetchError::Status(response.status()));
        }

        let count = response
            .headers()
            .get("content-range")
            .ok()
            .flatten()
            .and_then(|range| parse_content_range(&range));

        let body = JsFuture::from(response.text().map_err(network_error)?)
            .await
            .map_err(network_error)?
            .as_string()
            .unwrap_or_default();
        let rows: Vec<Value> = serde_json::from_str(&body)?;

        Ok(QueryResponse { rows, count })
    }
}
