//! Read access to the remote table service.
//!
//! [`DataSource`] is the seam between the list controller and the network. The
//! browser build talks to PostgREST (see `rest`), host builds and the preview
//! CLI use [`MemoryTable`], which evaluates the same [`TableQuery`] locally.

use serde_json::{Map, Value};
use site_common::parse_timestamp;
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

use crate::builder::{Condition, TableQuery};

/// Failure of one remote query
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("data service answered with HTTP {0}")]
    Status(u16),

    #[error("could not decode rows: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unknown table: {0}")]
    UnknownTable(String),
}

/// Rows of one query plus the exact match count when it was requested
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResponse {
    pub rows: Vec<Value>,
    pub count: Option<usize>,
}

/// A queryable, read-only table service
#[allow(async_fn_in_trait)]
pub trait DataSource {
    async fn select(&self, query: &TableQuery) -> Result<QueryResponse, FetchError>;
}

/// Run queries one after another, stopping at the first failure
pub async fn fetch_all<S: DataSource>(
    source: &S,
    queries: &[TableQuery],
) -> Result<Vec<QueryResponse>, FetchError> {
    let mut responses = Vec::with_capacity(queries.len());
    for query in queries {
        responses.push(source.select(query).await?);
    }
    Ok(responses)
}

/// Total from a `Content-Range` header such as `0-11/25` or `*/0`
pub fn parse_content_range(header: &str) -> Option<usize> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// In-memory tables evaluated with the service's filter semantics
#[derive(Clone, Debug, Default)]
pub struct MemoryTable {
    tables: HashMap<String, Vec<Value>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.entry(table.to_string()).or_default().extend(rows);
        self
    }

    /// Load a fixture shaped as `{ "events": [..], "articles": [..] }`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tables: HashMap<String, Vec<Value>> = serde_json::from_str(json)?;
        Ok(Self { tables })
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, Vec::len)
    }

    fn evaluate(&self, query: &TableQuery) -> Result<QueryResponse, FetchError> {
        let rows = self
            .tables
            .get(&query.table)
            .ok_or_else(|| FetchError::UnknownTable(query.table.clone()))?;

        let mut matching: Vec<&Value> = rows
            .iter()
            .filter(|row| {
                query.filters.iter().all(|filter| {
                    let cell = row.get(&filter.column).unwrap_or(&Value::Null);
                    condition_holds(cell, &filter.condition)
                })
            })
            .collect();

        if let Some(order) = &query.order {
            matching.sort_by(|a, b| {
                let a = a.get(&order.column).unwrap_or(&Value::Null);
                let b = b.get(&order.column).unwrap_or(&Value::Null);
                // nulls stay last in either direction
                match (a.is_null(), b.is_null()) {
                    (false, false) if order.ascending => compare_cells(a, b),
                    (false, false) => compare_cells(b, a),
                    (a_null, b_null) => a_null.cmp(&b_null),
                }
            });
        }

        let count = query.count_exact.then_some(matching.len());
        let rows = matching
            .into_iter()
            .map(|row| project(row, &query.columns))
            .collect();

        Ok(QueryResponse { rows, count })
    }
}

impl DataSource for MemoryTable {
    async fn select(&self, query: &TableQuery) -> Result<QueryResponse, FetchError> {
        self.evaluate(query)
    }
}

// Keep only the selected columns; an empty selection keeps the whole row
fn project(row: &Value, columns: &[String]) -> Value {
    match row {
        Value::Object(object) if !columns.is_empty() => {
            let projected: Map<String, Value> = columns
                .iter()
                .filter_map(|column| object.get(column).map(|v| (column.clone(), v.clone())))
                .collect();
            Value::Object(projected)
        }
        other => other.clone(),
    }
}

fn condition_holds(cell: &Value, condition: &Condition) -> bool {
    let ordering = compare_literal(cell, condition.value());
    match condition {
        Condition::Eq(_) => ordering == Some(Ordering::Equal),
        Condition::Gte(_) => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        Condition::Lt(_) => ordering == Some(Ordering::Less),
    }
}

// Null never matches, like SQL comparisons against NULL
fn compare_literal(cell: &Value, literal: &str) -> Option<Ordering> {
    match cell {
        Value::String(text) => Some(compare_text(text, literal)),
        Value::Number(number) => {
            let literal: f64 = literal.parse().ok()?;
            number.as_f64()?.partial_cmp(&literal)
        }
        Value::Bool(flag) => literal.parse::<bool>().ok().map(|l| flag.cmp(&l)),
        _ => None,
    }
}

// Timestamps compare as instants, so `2025-03-14` equals midnight of that day
fn compare_text(left: &str, right: &str) -> Ordering {
    match (parse_timestamp(left), parse_timestamp(right)) {
        (Some(l), Some(r)) => l.cmp(&r),
        _ => left.cmp(right),
    }
}

// Sort classes: timestamps, other text, numbers, then anything else
fn sort_class(value: &Value) -> u8 {
    match value {
        Value::String(text) if parse_timestamp(text).is_some() => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        _ => 3,
    }
}

// Total order over non-null cells; values compare within their class
fn compare_cells(a: &Value, b: &Value) -> Ordering {
    sort_class(a).cmp(&sort_class(b)).then_with(|| match (a, b) {
        (Value::String(a), Value::String(b)) => match (parse_timestamp(a), parse_timestamp(b)) {
            (Some(l), Some(r)) => l.cmp(&r).then_with(|| a.cmp(b)),
            _ => a.cmp(b),
        },
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    })
}
