use serde::Serialize;
use site_common::dates::{is_valid_iso_date, is_valid_month, is_valid_year, month_range, year_range};
use site_common::console_warn;
use site_common::query;

use crate::models::FilterState;

/// Comparison applied to one column
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Condition {
    /// `column = value`
    Eq(String),
    /// `column >= value`, the inclusive lower bound of a date range
    Gte(String),
    /// `column < value`, the exclusive upper bound of a date range
    Lt(String),
}

impl Condition {
    fn operator(&self) -> &'static str {
        match self {
            Condition::Eq(_) => "eq",
            Condition::Gte(_) => "gte",
            Condition::Lt(_) => "lt",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Condition::Eq(v) | Condition::Gte(v) | Condition::Lt(v) => v,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub condition: Condition,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub column: String,
    /// Nulls come last either way
    pub ascending: bool,
}

/// A read query against one table of the data service
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TableQuery {
    /// Table name, `events` or `articles`
    pub table: String,
    /// Columns to return, in order
    pub columns: Vec<String>,
    /// All filters must hold for a row to be returned
    pub filters: Vec<ColumnFilter>,
    /// Unordered when `None`
    pub order: Option<Order>,
    /// Ask the service for the exact number of matching rows
    pub count_exact: bool,
}

impl TableQuery {
    /// Render the query in PostgREST syntax, e.g.
    /// `select=title,date&society=eq.Computer+Society&order=date.asc`
    pub fn to_query_string(&self) -> String {
        let mut pairs = vec![("select".to_string(), self.columns.join(","))];

        for filter in &self.filters {
            let value = format!("{}.{}", filter.condition.operator(), filter.condition.value());
            pairs.push((filter.column.clone(), value));
        }

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }

        query::serialize(&pairs)
    }
}

/// Fluent builder for [`TableQuery`]
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    query: TableQuery,
}

impl QueryBuilder {
    pub fn from(table: &str) -> Self {
        Self {
            query: TableQuery {
                table: table.to_string(),
                columns: Vec::new(),
                filters: Vec::new(),
                order: None,
                count_exact: false,
            },
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.query.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn exact_count(mut self) -> Self {
        self.query.count_exact = true;
        self
    }

    pub fn eq(self, column: &str, value: &str) -> Self {
        self.filter(column, Condition::Eq(value.to_string()))
    }

    pub fn gte(self, column: &str, value: &str) -> Self {
        self.filter(column, Condition::Gte(value.to_string()))
    }

    pub fn lt(self, column: &str, value: &str) -> Self {
        self.filter(column, Condition::Lt(value.to_string()))
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.query.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    fn filter(mut self, column: &str, condition: Condition) -> Self {
        self.query.filters.push(ColumnFilter {
            column: column.to_string(),
            condition,
        });
        self
    }

    /// Apply the remote part of the filter state: society equality, year and
    /// month ranges on `date_column`, and exact date equality.
    ///
    /// The month only counts together with a year. Malformed year, month or
    /// date values are skipped.
    pub fn apply_filters(self, filters: &FilterState, date_column: &str) -> Self {
        let mut builder = self;

        if !filters.society.is_empty() {
            builder = builder.eq("society", &filters.society);
        }

        let year = if filters.year.is_empty() {
            None
        } else if is_valid_year(&filters.year) {
            filters.year.parse::<i32>().ok()
        } else {
            console_warn!("Ignoring malformed year filter: {}", filters.year);
            None
        };

        if let Some(year) = year {
            let (start, end) = year_range(year);
            builder = builder.gte(date_column, &start).lt(date_column, &end);

            if !filters.month.is_empty() {
                match filters.month.parse::<u32>() {
                    Ok(month) if is_valid_month(&filters.month) => {
                        let (start, end) = month_range(year, month);
                        builder = builder.gte(date_column, &start).lt(date_column, &end);
                    }
                    _ => console_warn!("Ignoring malformed month filter: {}", filters.month),
                }
            }
        }

        if !filters.date.is_empty() {
            if is_valid_iso_date(&filters.date) {
                builder = builder.eq(date_column, &filters.date);
            } else {
                console_warn!("Ignoring malformed date filter: {}", filters.date);
            }
        }

        builder
    }

    pub fn build(self) -> TableQuery {
        self.query
    }
}
