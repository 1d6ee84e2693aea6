//! Query normalization: `page`, `pageSize`, `sort`, `order`, `id`, `q` into store calls.

use crate::error::AppError;
use crate::schema::Table;
use crate::store::{Direction, Filter, OrderBy, RowRange, Select};
use serde::Deserialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Raw list query string. Everything stays text until normalized so bad input falls back
/// instead of failing extraction.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ListParams {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub id: Option<String>,
    pub q: Option<String>,
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ListParams {
    /// True when the caller asked for a page at all.
    pub fn wants_page(&self) -> bool {
        non_empty(&self.page).is_some() || non_empty(&self.page_size).is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

fn positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

impl Pagination {
    pub fn from_params(params: &ListParams) -> Self {
        Pagination {
            page: positive(non_empty(&params.page), DEFAULT_PAGE),
            page_size: positive(non_empty(&params.page_size), DEFAULT_PAGE_SIZE),
        }
    }

    pub fn range(&self) -> RowRange {
        let from = (self.page - 1).saturating_mul(self.page_size);
        RowRange {
            from,
            to: from.saturating_add(self.page_size - 1),
        }
    }
}

/// Default sort of a resource's listings.
#[derive(Clone, Copy, Debug)]
pub struct ListDefaults {
    pub sort: &'static str,
    pub order: Direction,
}

pub const PRODUCT_DEFAULTS: ListDefaults = ListDefaults {
    sort: "id",
    order: Direction::Desc,
};
pub const PRODUCT_TYPE_DEFAULTS: ListDefaults = ListDefaults {
    sort: "sort",
    order: Direction::Asc,
};
pub const LEAVE_MESSAGE_DEFAULTS: ListDefaults = ListDefaults {
    sort: "created_at",
    order: Direction::Desc,
};
pub const ECLUB_DEFAULTS: ListDefaults = ListDefaults {
    sort: "created_at",
    order: Direction::Desc,
};

/// Listing defaults of a table.
pub fn list_defaults(table: Table) -> ListDefaults {
    match table {
        Table::Products => PRODUCT_DEFAULTS,
        Table::ProductTypes => PRODUCT_TYPE_DEFAULTS,
        Table::LeaveMessages => LEAVE_MESSAGE_DEFAULTS,
        Table::Eclub => ECLUB_DEFAULTS,
    }
}

/// Sort column must belong to the table; an unknown order word means the default direction.
pub fn resolve_sort(table: Table, params: &ListParams, defaults: ListDefaults) -> Result<OrderBy, AppError> {
    let column = non_empty(&params.sort).unwrap_or(defaults.sort);
    if !table.has_column(column) {
        return Err(AppError::validation(format!("invalid sort field: {}", column)));
    }
    let direction = match non_empty(&params.order).map(str::to_ascii_lowercase).as_deref() {
        Some("asc") => Direction::Asc,
        Some("desc") => Direction::Desc,
        _ => defaults.order,
    };
    Ok(OrderBy {
        column: column.to_string(),
        direction,
    })
}

pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::validation("invalid id format"))
}

/// Sorted, counted listing. With `id` the page is skipped and the exact row is returned.
pub fn list_select(table: Table, params: &ListParams, defaults: ListDefaults) -> Result<Select, AppError> {
    let order = resolve_sort(table, params, defaults)?;
    let select = Select::from(table)
        .order(&order.column, order.direction)
        .with_count();
    Ok(match non_empty(&params.id) {
        Some(id) => select.eq(Table::PRIMARY_KEY, parse_id(id)?),
        None => select.range(Pagination::from_params(params).range()),
    })
}

pub const SEARCH_COLUMNS: [&str; 3] = ["image_keywords", "name", "describe"];

/// Trimmed search text; blank is a validation error.
pub fn search_text(params: &ListParams) -> Result<String, AppError> {
    non_empty(&params.q)
        .map(String::from)
        .ok_or_else(|| AppError::validation("search query is required"))
}

pub fn search_select(params: &ListParams, needle: &str) -> Result<Select, AppError> {
    let order = resolve_sort(Table::Products, params, PRODUCT_DEFAULTS)?;
    Ok(Select::from(Table::Products)
        .filter(Filter::AnyContains {
            columns: SEARCH_COLUMNS.iter().map(|c| c.to_string()).collect(),
            needle: needle.to_string(),
        })
        .order(&order.column, order.direction)
        .range(Pagination::from_params(params).range())
        .with_count())
}
