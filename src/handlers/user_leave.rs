//! Leave-message handlers.

use super::decode;
use crate::error::AppError;
use crate::extractors::{Client, JsonBody, Params, RecordId};
use crate::models::{LeaveMessagePatch, LEAVE_MESSAGE_REQUIRED};
use crate::query::{ListParams, LEAVE_MESSAGE_DEFAULTS};
use crate::response::{success_many, success_one, success_one_ok};
use crate::schema::Table;
use crate::service::{CrudService, RequestValidator};
use axum::response::IntoResponse;

pub async fn list(
    Client(store): Client,
    Params(params): Params<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let (rows, total) =
        CrudService::list(store.as_ref(), Table::LeaveMessages, &params, LEAVE_MESSAGE_DEFAULTS).await?;
    Ok(success_many(rows, total))
}

pub async fn read(Client(store): Client, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    let row = CrudService::read(store.as_ref(), Table::LeaveMessages, id).await?;
    Ok(success_one_ok(row))
}

pub async fn create(Client(store): Client, JsonBody(body): JsonBody) -> Result<impl IntoResponse, AppError> {
    let mut patch: LeaveMessagePatch = decode(body)?;
    if patch.phone.is_none() {
        patch.phone = Some(None);
    }
    let row = patch.into_row();
    RequestValidator::require(&row, &LEAVE_MESSAGE_REQUIRED)?;
    let created = CrudService::create(store.as_ref(), Table::LeaveMessages, row).await?;
    Ok(success_one(created))
}

pub async fn update(
    Client(store): Client,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let patch: LeaveMessagePatch = decode(body)?;
    let row = patch.into_row();
    RequestValidator::require_present(&row, &LEAVE_MESSAGE_REQUIRED)?;
    let updated = CrudService::update(store.as_ref(), Table::LeaveMessages, id, row).await?;
    Ok(success_one_ok(updated))
}

pub async fn delete(Client(store): Client, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    let deleted = CrudService::delete(store.as_ref(), Table::LeaveMessages, id).await?;
    Ok(success_one_ok(deleted))
}
