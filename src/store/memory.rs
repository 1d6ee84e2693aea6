//! In-process [`Store`] with the same observable semantics as the Postgres one:
//! store-assigned ids and timestamps, numeric columns returned as strings, NULLS LAST on ascending sorts.

use super::{Direction, Fetched, Filter, OrderBy, Row, Select, Store, StoreError};
use crate::schema::Table;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Tables {
    rows: HashMap<Table, Vec<Row>>,
    next_id: HashMap<Table, i64>,
    fail_next: Option<StoreError>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call fail with this error.
    pub fn fail_next(&self, err: StoreError) {
        self.lock().fail_next = Some(err);
    }

    /// Number of rows currently in a table.
    pub fn len(&self, table: Table) -> usize {
        self.lock().rows.get(&table).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, table: Table) -> bool {
        self.len(table) == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_failure(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        let mut guard = self.lock();
        match guard.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(guard),
        }
    }
}

fn now() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, false))
}

/// Coerce a bound value to what the column type would return when read back.
fn normalize(table: Table, column: &str, v: Value) -> Value {
    let pg_type = table.column(column).and_then(|c| c.pg_type);
    match (pg_type, v) {
        (Some("numeric"), Value::Number(n)) => Value::String(n.to_string()),
        (Some("integer"), Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(s)),
        (_, v) => v,
    }
}

fn text_of(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches(table: Table, row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => {
            if !table.has_column(column) {
                return true;
            }
            let cell = row.get(column).unwrap_or(&Value::Null);
            let wanted = normalize(table, column, value.clone());
            match (cell, &wanted) {
                (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
                (a, b) => a == b,
            }
        }
        Filter::AnyContains { columns, needle } => {
            let needle = needle.to_lowercase();
            let known: Vec<&String> = columns.iter().filter(|c| table.has_column(c)).collect();
            if known.is_empty() {
                return true;
            }
            known.iter().any(|c| {
                row.get(c.as_str())
                    .and_then(text_of)
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
        }
    }
}

fn compare_cells(table: Table, column: &str, a: &Value, b: &Value) -> Ordering {
    let numeric = table.column(column).and_then(|c| c.pg_type) == Some("numeric");
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) if numeric => {
            match (x.parse::<f64>(), y.parse::<f64>()) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => x.cmp(y),
            }
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}

fn compare_rows(table: Table, order: &[OrderBy], a: &Row, b: &Row) -> Ordering {
    for o in order {
        let null = Value::Null;
        let x = a.get(&o.column).unwrap_or(&null);
        let y = b.get(&o.column).unwrap_or(&null);
        let ord = compare_cells(table, &o.column, x, y);
        let ord = match o.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn project(row: &Row, columns: &Option<Vec<String>>) -> Row {
    match columns {
        None => row.clone(),
        Some(cols) => cols
            .iter()
            .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
            .collect(),
    }
}

fn check_unique(table: Table, rows: &[Row], candidate: &Row, skip_id: Option<i64>) -> Result<(), StoreError> {
    for c in table.columns().iter().filter(|c| c.unique) {
        let Some(v) = candidate.get(c.name) else { continue };
        let clash = rows.iter().any(|r| {
            r.get(Table::PRIMARY_KEY).and_then(Value::as_i64) != skip_id && r.get(c.name) == Some(v)
        });
        if clash {
            return Err(StoreError::new(format!(
                "duplicate key value violates unique constraint \"{}_{}_key\"",
                table.name(),
                c.name
            ))
            .with_code("23505")
            .with_details(format!("Key ({})=({}) already exists.", c.name, text_of(v).unwrap_or_default())));
        }
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, query: &Select) -> Result<Fetched, StoreError> {
        let guard = self.take_failure()?;
        let table = query.table;
        let mut rows: Vec<&Row> = guard
            .rows
            .get(&table)
            .map(|rows| rows.iter().filter(|r| query.filters.iter().all(|f| matches(table, r, f))).collect())
            .unwrap_or_default();
        let total = query.count.then_some(rows.len() as u64);
        if !query.order.is_empty() {
            let mut order = query.order.clone();
            if order.iter().all(|o| o.column != Table::PRIMARY_KEY) {
                order.push(OrderBy {
                    column: Table::PRIMARY_KEY.to_string(),
                    direction: order[0].direction,
                });
            }
            rows.sort_by(|a, b| compare_rows(table, &order, a, b));
        }
        let rows = match query.range {
            Some(r) => rows
                .into_iter()
                .skip(r.from as usize)
                .take(r.limit() as usize)
                .collect(),
            None => rows,
        };
        Ok(Fetched {
            rows: rows.into_iter().map(|r| project(r, &query.columns)).collect(),
            total,
        })
    }

    async fn count(&self, table: Table, filters: &[Filter]) -> Result<u64, StoreError> {
        let guard = self.take_failure()?;
        Ok(guard
            .rows
            .get(&table)
            .map_or(0, |rows| rows.iter().filter(|r| filters.iter().all(|f| matches(table, r, f))).count())
            as u64)
    }

    async fn insert(&self, table: Table, values: Row) -> Result<Row, StoreError> {
        let mut guard = self.take_failure()?;
        let mut row = Row::new();
        for c in table.columns() {
            let v = match c.name {
                "id" => continue,
                "created_at" | "updated_at" => now(),
                name => values
                    .get(name)
                    .cloned()
                    .map(|v| normalize(table, name, v))
                    .unwrap_or(Value::Null),
            };
            row.insert(c.name.to_string(), v);
        }
        let existing = guard.rows.get(&table).map(Vec::as_slice).unwrap_or(&[]);
        check_unique(table, existing, &row, None)?;
        let next = guard.next_id.entry(table).or_insert(0);
        *next += 1;
        row.insert(Table::PRIMARY_KEY.to_string(), Value::from(*next));
        guard.rows.entry(table).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: i64, values: Row) -> Result<Option<Row>, StoreError> {
        let mut guard = self.take_failure()?;
        let rows = guard.rows.entry(table).or_default();
        let Some(pos) = rows
            .iter()
            .position(|r| r.get(Table::PRIMARY_KEY).and_then(Value::as_i64) == Some(id))
        else {
            return Ok(None);
        };
        let mut updated = rows[pos].clone();
        for (k, v) in values {
            if k == Table::PRIMARY_KEY || k == "created_at" || k == "updated_at" || !table.has_column(&k) {
                continue;
            }
            let v = normalize(table, &k, v);
            updated.insert(k, v);
        }
        if table.has_column("updated_at") {
            updated.insert("updated_at".to_string(), now());
        }
        check_unique(table, rows, &updated, Some(id))?;
        rows[pos] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, table: Table, id: i64) -> Result<Option<Row>, StoreError> {
        let mut guard = self.take_failure()?;
        let rows = guard.rows.entry(table).or_default();
        let pos = rows
            .iter()
            .position(|r| r.get(Table::PRIMARY_KEY).and_then(Value::as_i64) == Some(id));
        Ok(pos.map(|p| rows.remove(p)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.take_failure().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RowRange;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_stringifies_price() {
        let store = MemoryStore::new();
        let a = store
            .insert(Table::Products, row(json!({"name": "A", "price": 12.5, "id": 40})))
            .await
            .unwrap();
        let b = store.insert(Table::Products, row(json!({"name": "B"}))).await.unwrap();
        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));
        assert_eq!(a["price"], json!("12.5"));
        assert!(a["created_at"].is_string());
        assert_eq!(b["main_image"], Value::Null);
    }

    #[tokio::test]
    async fn range_and_count_are_independent() {
        let store = MemoryStore::new();
        for i in 0..12 {
            store
                .insert(Table::Eclub, row(json!({"email": format!("u{}@x.io", i)})))
                .await
                .unwrap();
        }
        let q = Select::from(Table::Eclub)
            .order("id", Direction::Desc)
            .range(RowRange { from: 5, to: 9 })
            .with_count();
        let fetched = store.select(&q).await.unwrap();
        assert_eq!(fetched.total, Some(12));
        let ids: Vec<i64> = fetched.rows.iter().filter_map(|r| r["id"].as_i64()).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[tokio::test]
    async fn contains_is_case_insensitive_and_literal() {
        let store = MemoryStore::new();
        store
            .insert(Table::Products, row(json!({"name": "Oak Stair Tread", "describe": "100% solid"})))
            .await
            .unwrap();
        store.insert(Table::Products, row(json!({"name": "Corner guard"}))).await.unwrap();
        let search = |needle: &str| {
            Select::from(Table::Products).filter(Filter::AnyContains {
                columns: vec!["name".into(), "describe".into()],
                needle: needle.into(),
            })
        };
        assert_eq!(store.select(&search("stair")).await.unwrap().rows.len(), 1);
        assert_eq!(store.select(&search("0% s")).await.unwrap().rows.len(), 1);
        assert_eq!(store.select(&search("%")).await.unwrap().rows.len(), 1);
    }

    #[tokio::test]
    async fn unique_type_key_is_enforced() {
        let store = MemoryStore::new();
        store
            .insert(Table::ProductTypes, row(json!({"type_key": "treads", "type_label": "Treads"})))
            .await
            .unwrap();
        let err = store
            .insert(Table::ProductTypes, row(json!({"type_key": "treads", "type_label": "Again"})))
            .await
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("23505"));
        assert_eq!(store.len(Table::ProductTypes), 1);
    }

    #[tokio::test]
    async fn nulls_sort_last_ascending() {
        let store = MemoryStore::new();
        store.insert(Table::LeaveMessages, row(json!({"topic": "b"}))).await.unwrap();
        store.insert(Table::LeaveMessages, row(json!({}))).await.unwrap();
        store.insert(Table::LeaveMessages, row(json!({"topic": "a"}))).await.unwrap();
        let q = Select::from(Table::LeaveMessages).order("topic", Direction::Asc);
        let topics: Vec<Value> = store.select(&q).await.unwrap().rows.into_iter().map(|r| r["topic"].clone()).collect();
        assert_eq!(topics, vec![json!("a"), json!("b"), Value::Null]);
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let store = MemoryStore::new();
        store.fail_next(StoreError::new("boom").with_code("XX000"));
        assert_eq!(store.ping().await.unwrap_err().message, "boom");
        assert!(store.ping().await.is_ok());
    }
}
