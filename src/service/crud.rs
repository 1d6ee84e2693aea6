//! Generic CRUD execution against a [`Store`].

use crate::error::AppError;
use crate::query::{list_select, ListDefaults, ListParams};
use crate::schema::Table;
use crate::store::{find_by_id, Row, Store};

pub struct CrudService;

impl CrudService {
    /// Normalized listing: one page (or the exact `id` match) plus the total matching count.
    pub async fn list(
        store: &dyn Store,
        table: Table,
        params: &ListParams,
        defaults: ListDefaults,
    ) -> Result<(Vec<Row>, Option<u64>), AppError> {
        let select = list_select(table, params, defaults)?;
        let fetched = store.select(&select).await?;
        Ok((fetched.rows, fetched.total))
    }

    /// Fetch one row by primary key; 404 when absent.
    pub async fn read(store: &dyn Store, table: Table, id: i64) -> Result<Row, AppError> {
        find_by_id(store, table, id)
            .await?
            .ok_or_else(|| AppError::not_found(table.noun()))
    }

    pub async fn create(store: &dyn Store, table: Table, body: Row) -> Result<Row, AppError> {
        let row = store.insert(table, body).await?;
        tracing::info!(table = %table, id = ?row.get(Table::PRIMARY_KEY), "created");
        Ok(row)
    }

    /// Update one row by id. Returns the updated row; 404 when no row matched.
    pub async fn update(store: &dyn Store, table: Table, id: i64, body: Row) -> Result<Row, AppError> {
        let row = store
            .update(table, id, body)
            .await?
            .ok_or_else(|| AppError::not_found(table.noun()))?;
        tracing::info!(table = %table, id, "updated");
        Ok(row)
    }

    /// Physically delete one row by id. Returns the deleted row; 404 when no row matched.
    pub async fn delete(store: &dyn Store, table: Table, id: i64) -> Result<Row, AppError> {
        let row = store
            .delete(table, id)
            .await?
            .ok_or_else(|| AppError::not_found(table.noun()))?;
        tracing::info!(table = %table, id, "deleted");
        Ok(row)
    }
}
