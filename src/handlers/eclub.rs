//! E-club subscription handlers: list, delete by `?id=`, CSV export.

use crate::error::AppError;
use crate::extractors::{Client, Params};
use crate::query::{parse_id, ListParams, ECLUB_DEFAULTS};
use crate::response::{success_many, success_one_ok};
use crate::schema::Table;
use crate::service::export::{eclub_csv, export_filename, offset_hours, EXPORT_LIMIT};
use crate::service::CrudService;
use crate::state::AppState;
use crate::store::{Direction, RowRange, Select};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

pub async fn list(
    Client(store): Client,
    Params(params): Params<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let (rows, total) = CrudService::list(store.as_ref(), Table::Eclub, &params, ECLUB_DEFAULTS).await?;
    Ok(success_many(rows, total))
}

#[derive(Deserialize, Debug, Default)]
pub struct IdParam {
    pub id: Option<String>,
}

/// DELETE /api/eclub?id=
pub async fn delete(
    Client(store): Client,
    Params(param): Params<IdParam>,
) -> Result<impl IntoResponse, AppError> {
    let raw = param
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("id is required"))?;
    let id = parse_id(raw)?;
    let deleted = CrudService::delete(store.as_ref(), Table::Eclub, id).await?;
    Ok(success_one_ok(deleted))
}

#[derive(Deserialize, Debug, Default)]
pub struct ActionParam {
    pub action: Option<String>,
}

/// POST /api/eclub?action=export
pub async fn action(
    Client(store): Client,
    State(state): State<AppState>,
    Params(param): Params<ActionParam>,
) -> Result<Response, AppError> {
    if param.action.as_deref().map(str::trim) != Some("export") {
        return Err(AppError::validation("invalid action"));
    }
    let select = Select::from(Table::Eclub)
        .order("created_at", Direction::Desc)
        .range(RowRange {
            from: 0,
            to: EXPORT_LIMIT - 1,
        });
    let fetched = store.select(&select).await?;
    let offset = offset_hours(state.settings.export_utc_offset_hours);
    let csv = eclub_csv(&fetched.rows, offset);
    let today = chrono::Utc::now().with_timezone(&offset).date_naive();
    tracing::info!(rows = fetched.rows.len(), "eclub export");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_filename(today)),
            ),
        ],
        csv,
    )
        .into_response())
}
