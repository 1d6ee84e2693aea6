//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE from the static table catalog.

use crate::schema::{ColumnDef, Table};
use crate::store::{Direction, Filter, Row, Select};
use serde_json::Value;

const BIGINT_MAX: u64 = i64::MAX as u64;

/// Quote identifier for PostgreSQL (safe: only from the table catalog).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Placeholder for a bound value, cast to the column's type when it has one.
    fn placeholder(&mut self, column: Option<&ColumnDef>, v: Value) -> String {
        let n = self.push_param(v);
        column
            .and_then(|c| c.pg_type)
            .map(|t| format!("${}::{}", n, t))
            .unwrap_or_else(|| format!("${}", n))
    }
}

/// SELECT list: numeric columns as col::text so precision survives as a string.
fn select_column_list<'a>(table: Table, names: impl Iterator<Item = &'a str>) -> String {
    names
        .filter_map(|name| table.column(name))
        .map(|c| {
            let q = quoted(c.name);
            if c.pg_type == Some("numeric") {
                format!("{}::text AS {}", q, q)
            } else {
                q
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn all_columns(table: Table) -> String {
    select_column_list(table, table.columns().iter().map(|c| c.name))
}

/// Escape LIKE metacharacters so the needle matches literally (default escape is backslash).
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// WHERE clause for filters; filters naming unknown columns are skipped.
fn where_clause(q: &mut QueryBuf, table: Table, filters: &[Filter]) -> String {
    let mut parts = Vec::new();
    for f in filters {
        match f {
            Filter::Eq { column, value } => {
                let Some(c) = table.column(column) else { continue };
                let ph = q.placeholder(Some(c), value.clone());
                parts.push(format!("{} = {}", quoted(c.name), ph));
            }
            Filter::AnyContains { columns, needle } => {
                let known: Vec<&ColumnDef> = columns.iter().filter_map(|c| table.column(c)).collect();
                if known.is_empty() {
                    continue;
                }
                let n = q.push_param(Value::String(like_pattern(needle)));
                let ors: Vec<String> = known
                    .iter()
                    .map(|c| format!("{} ILIKE ${}", quoted(c.name), n))
                    .collect();
                parts.push(format!("({})", ors.join(" OR ")));
            }
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// SELECT with filters, ORDER BY and LIMIT/OFFSET derived from the inclusive range.
pub fn select(query: &Select) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = query.table;
    let cols = match &query.columns {
        Some(names) => select_column_list(table, names.iter().map(String::as_str)),
        None => all_columns(table),
    };
    let where_sql = where_clause(&mut q, table, &query.filters);
    let order: Vec<String> = query
        .order
        .iter()
        .filter(|o| table.has_column(&o.column))
        .map(|o| {
            let dir = match o.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("{} {}", quoted(&o.column), dir)
        })
        .collect();
    let order_clause = if order.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", order.join(", "))
    };
    // LIMIT and OFFSET are bigint; a page past i64::MAX is simply empty.
    let range_clause = query
        .range
        .map(|r| format!(" LIMIT {} OFFSET {}", r.limit().min(BIGINT_MAX), r.from.min(BIGINT_MAX)))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}",
        cols,
        quoted(table.name()),
        where_sql,
        order_clause,
        range_clause
    );
    q
}

/// SELECT COUNT(*) with the same filter semantics as [`select`].
pub fn count(table: Table, filters: &[Filter]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, table, filters);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(table.name()), where_sql);
    q
}

/// INSERT: only columns present in values and known to the table; `id` is always store-assigned.
pub fn insert(table: Table, values: &Row) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in table.columns() {
        if c.name == Table::PRIMARY_KEY {
            continue;
        }
        let Some(v) = values.get(c.name) else { continue };
        placeholders.push(q.placeholder(Some(c), v.clone()));
        cols.push(quoted(c.name));
    }
    let returning = all_columns(table);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", quoted(table.name()), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(table.name()),
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id: SET only columns present in values (and known to the table).
/// Tables with `updated_at` get it refreshed on every update.
pub fn update(table: Table, id: i64, values: &Row) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (k, v) in values {
        if k == Table::PRIMARY_KEY || k == "updated_at" || k == "created_at" {
            continue;
        }
        let Some(c) = table.column(k) else { continue };
        let rhs = q.placeholder(Some(c), v.clone());
        sets.push(format!("{} = {}", quoted(k), rhs));
    }
    if table.has_column("updated_at") {
        sets.push(format!("{} = NOW()", quoted("updated_at")));
    }
    let returning = all_columns(table);
    if sets.is_empty() {
        let n = q.push_param(Value::from(id));
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = ${}",
            returning,
            quoted(table.name()),
            quoted(Table::PRIMARY_KEY),
            n
        );
        return q;
    }
    let n = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quoted(table.name()),
        sets.join(", "),
        quoted(Table::PRIMARY_KEY),
        n,
        returning
    );
    q
}

/// DELETE by id, returning the removed row.
pub fn delete(table: Table, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::from(id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        quoted(table.name()),
        quoted(Table::PRIMARY_KEY),
        n,
        all_columns(table)
    );
    q
}
