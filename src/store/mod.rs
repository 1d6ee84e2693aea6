//! Query-builder interface to the remote data store.
//!
//! Handlers describe what they want with [`Select`] and [`Filter`]; a [`Store`] turns that into
//! store-native calls. `postgres` talks to the hosted database, `memory` backs tests and demos.

pub mod memory;
pub mod postgres;

use crate::schema::Table;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::{ensure_tables, PgStore};

/// One row as returned by the store, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Error raised by the store. Diagnostic fields are passed through to API clients untouched.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) => {
                let mut err = StoreError::new(db.message());
                err.code = db.code().map(|c| c.into_owned());
                if let Some(pg) = db.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
                    err.details = pg.detail().map(String::from);
                    err.hint = pg.hint().map(String::from);
                }
                err
            }
            _ => StoreError::new(e.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// Inclusive row range, zero-based: `from..=to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowRange {
    pub from: u64,
    pub to: u64,
}

impl RowRange {
    /// Number of rows the range can hold.
    pub fn limit(&self) -> u64 {
        self.to.saturating_sub(self.from).saturating_add(1)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: Value },
    /// Case-insensitive substring match against any of the columns. The needle is literal.
    AnyContains { columns: Vec<String>, needle: String },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// A read against one table.
#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    pub table: Table,
    /// `None` selects every column.
    pub columns: Option<Vec<String>>,
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub range: Option<RowRange>,
    /// Also compute the exact number of rows matching the filters, ignoring the range.
    pub count: bool,
}

impl Select {
    pub fn from(table: Table) -> Self {
        Select {
            table,
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            range: None,
            count: false,
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(OrderBy {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn range(mut self, range: RowRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fetched {
    pub rows: Vec<Row>,
    /// Present when the select asked for a count.
    pub total: Option<u64>,
}

/// A client bound to the remote store. Every call is an independent round trip.
#[async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, query: &Select) -> Result<Fetched, StoreError>;

    /// Exact number of rows matching all filters.
    async fn count(&self, table: Table, filters: &[Filter]) -> Result<u64, StoreError>;

    /// Insert one row; the store assigns `id` and timestamps. Returns the stored row.
    async fn insert(&self, table: Table, values: Row) -> Result<Row, StoreError>;

    /// Set the given columns on the row with this id. `None` when no row matched.
    async fn update(&self, table: Table, id: i64, values: Row) -> Result<Option<Row>, StoreError>;

    /// Physically delete the row with this id. `None` when no row matched.
    async fn delete(&self, table: Table, id: i64) -> Result<Option<Row>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Fetch a single row by primary key.
pub async fn find_by_id(store: &dyn Store, table: Table, id: i64) -> Result<Option<Row>, StoreError> {
    let query = Select::from(table).eq(Table::PRIMARY_KEY, id);
    let fetched = store.select(&query).await?;
    Ok(fetched.rows.into_iter().next())
}
