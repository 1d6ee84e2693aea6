//! Product type handlers. Deleting a type still referenced by products is refused.

use super::decode;
use crate::error::AppError;
use crate::extractors::{Client, JsonBody, Params, RecordId};
use crate::models::{ProductTypePatch, PRODUCT_TYPE_REQUIRED};
use crate::query::{resolve_sort, ListParams, PRODUCT_TYPE_DEFAULTS};
use crate::response::{success_many, success_one, success_one_ok};
use crate::schema::Table;
use crate::service::{CrudService, RequestValidator};
use crate::store::{Filter, Select};
use axum::response::IntoResponse;
use serde_json::Value;

/// GET /api/product-types
///
/// Without `page`/`pageSize` (and without `id`) this is the dropdown listing: every type as
/// `type_key, type_label, sort`, sorted, and no total.
pub async fn list(
    Client(store): Client,
    Params(params): Params<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let wants_all = !params.wants_page() && params.id.as_deref().map_or(true, |id| id.trim().is_empty());
    if wants_all {
        let order = resolve_sort(Table::ProductTypes, &params, PRODUCT_TYPE_DEFAULTS)?;
        let select = Select::from(Table::ProductTypes)
            .columns(&["type_key", "type_label", "sort"])
            .order(&order.column, order.direction);
        let fetched = store.select(&select).await?;
        return Ok(success_many(fetched.rows, None));
    }
    let (rows, total) =
        CrudService::list(store.as_ref(), Table::ProductTypes, &params, PRODUCT_TYPE_DEFAULTS).await?;
    Ok(success_many(rows, total))
}

pub async fn read(Client(store): Client, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    let row = CrudService::read(store.as_ref(), Table::ProductTypes, id).await?;
    Ok(success_one_ok(row))
}

pub async fn create(Client(store): Client, JsonBody(body): JsonBody) -> Result<impl IntoResponse, AppError> {
    let patch: ProductTypePatch = decode(body)?;
    let row = patch.into_row(true);
    RequestValidator::require(&row, &PRODUCT_TYPE_REQUIRED)?;
    let created = CrudService::create(store.as_ref(), Table::ProductTypes, row).await?;
    Ok(success_one(created))
}

pub async fn update(
    Client(store): Client,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let patch: ProductTypePatch = decode(body)?;
    let row = patch.into_row(false);
    RequestValidator::require_present(&row, &PRODUCT_TYPE_REQUIRED)?;
    let updated = CrudService::update(store.as_ref(), Table::ProductTypes, id, row).await?;
    Ok(success_one_ok(updated))
}

/// Lookup, count, then delete as three separate store calls. Not atomic: a product created
/// between the count and the delete is not caught.
pub async fn delete(Client(store): Client, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    let existing = CrudService::read(store.as_ref(), Table::ProductTypes, id).await?;
    if let Some(type_key) = existing.get("type_key").and_then(Value::as_str) {
        let in_use = store
            .count(Table::Products, &[Filter::eq("type", type_key)])
            .await?;
        if in_use > 0 {
            tracing::info!(type_key, in_use, "refused to delete referenced product type");
            return Err(AppError::Integrity(format!(
                "product type is used by {} product{}",
                in_use,
                if in_use == 1 { "" } else { "s" }
            )));
        }
    }
    let deleted = CrudService::delete(store.as_ref(), Table::ProductTypes, id).await?;
    Ok(success_one_ok(deleted))
}
