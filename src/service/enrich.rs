//! Join product rows with their product type in memory.

use crate::error::AppError;
use crate::schema::Table;
use crate::store::{Row, Select, Store};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Add `type_info: { type_key, type_label }` to each product. Unknown keys echo the key as label.
pub async fn attach_type_info(store: &dyn Store, rows: Vec<Row>) -> Result<Vec<Row>, AppError> {
    if rows.is_empty() {
        return Ok(rows);
    }
    let types = store
        .select(&Select::from(Table::ProductTypes).columns(&["type_key", "type_label"]))
        .await?;
    let labels: HashMap<String, Value> = types
        .rows
        .into_iter()
        .filter_map(|t| {
            let key = t.get("type_key")?.as_str()?.to_string();
            Some((key, t.get("type_label").cloned().unwrap_or(Value::Null)))
        })
        .collect();
    Ok(rows
        .into_iter()
        .map(|mut row| {
            let info = match row.get("type").and_then(Value::as_str) {
                Some(key) => {
                    let label = labels.get(key).cloned().unwrap_or_else(|| Value::String(key.to_string()));
                    json!({ "type_key": key, "type_label": label })
                }
                None => Value::Null,
            };
            row.insert("type_info".to_string(), info);
            row
        })
        .collect())
}
