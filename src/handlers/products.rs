//! Product handlers: list, search, read, create, update, delete.

use super::decode;
use crate::error::AppError;
use crate::extractors::{Client, JsonBody, Params, RecordId};
use crate::models::{ProductPatch, PRODUCT_REQUIRED};
use crate::query::{search_select, search_text, ListParams, PRODUCT_DEFAULTS};
use crate::response::{success_many, success_one, success_one_ok, success_search};
use crate::schema::Table;
use crate::service::enrich::attach_type_info;
use crate::service::{CrudService, RequestValidator};
use axum::response::IntoResponse;

/// GET /api/products
pub async fn list(
    Client(store): Client,
    Params(params): Params<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let (rows, total) = CrudService::list(store.as_ref(), Table::Products, &params, PRODUCT_DEFAULTS).await?;
    let rows = attach_type_info(store.as_ref(), rows).await?;
    Ok(success_many(rows, total))
}

/// GET /api/products/search?q=
pub async fn search(
    Client(store): Client,
    Params(params): Params<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let text = search_text(&params)?;
    let select = search_select(&params, &text)?;
    let fetched = store.select(&select).await?;
    let rows = attach_type_info(store.as_ref(), fetched.rows).await?;
    tracing::debug!(query = %text, hits = rows.len(), "product search");
    Ok(success_search(rows, fetched.total, text))
}

pub async fn read(Client(store): Client, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    let row = CrudService::read(store.as_ref(), Table::Products, id).await?;
    let mut rows = attach_type_info(store.as_ref(), vec![row]).await?;
    Ok(success_one_ok(rows.pop()))
}

pub async fn create(Client(store): Client, JsonBody(body): JsonBody) -> Result<impl IntoResponse, AppError> {
    let mut patch: ProductPatch = decode(body)?;
    patch.curate(true);
    let row = patch.into_row();
    RequestValidator::require(&row, &PRODUCT_REQUIRED)?;
    RequestValidator::decimal(&row, "price")?;
    let created = CrudService::create(store.as_ref(), Table::Products, row).await?;
    Ok(success_one(created))
}

/// PUT /api/products/:id writes only the fields present in the body.
pub async fn update(
    Client(store): Client,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let mut patch: ProductPatch = decode(body)?;
    patch.curate(false);
    let row = patch.into_row();
    RequestValidator::require_present(&row, &PRODUCT_REQUIRED)?;
    RequestValidator::decimal(&row, "price")?;
    let updated = CrudService::update(store.as_ref(), Table::Products, id, row).await?;
    Ok(success_one_ok(updated))
}

pub async fn delete(Client(store): Client, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    let deleted = CrudService::delete(store.as_ref(), Table::Products, id).await?;
    Ok(success_one_ok(deleted))
}
