use super::{ListRequest, ListResponse, ProviderError, ResourceHandler};
use crate::error::AppError;
use crate::query::{list_defaults, resolve_sort, ListParams};
use crate::schema::Table;
use crate::service::CrudService;
use crate::store::{Row, Select, Store};
use async_trait::async_trait;
use std::sync::Arc;

/// Generic CRUD straight against a store client, without the API's curation or guards.
pub struct StoreResource {
    store: Arc<dyn Store>,
    table: Table,
}

impl From<AppError> for ProviderError {
    fn from(e: AppError) -> Self {
        ProviderError::Http {
            status: e.status().as_u16(),
            message: e.to_string(),
        }
    }
}

impl StoreResource {
    pub fn new(store: Arc<dyn Store>, table: Table) -> Self {
        StoreResource { store, table }
    }

    fn params(req: &ListRequest) -> ListParams {
        let sorter = req.sorters.first();
        ListParams {
            page: req.pagination.map(|p| p.current.to_string()),
            page_size: req.pagination.map(|p| p.page_size.to_string()),
            sort: sorter.map(|s| s.field.clone()),
            order: sorter.map(|s| s.order.as_str().to_string()),
            ..ListParams::default()
        }
    }
}

#[async_trait]
impl ResourceHandler for StoreResource {
    async fn list(&self, req: &ListRequest) -> Result<ListResponse, ProviderError> {
        let params = Self::params(req);
        let defaults = list_defaults(self.table);
        let (data, total) = if req.pagination.is_some() {
            CrudService::list(self.store.as_ref(), self.table, &params, defaults).await?
        } else {
            let order = resolve_sort(self.table, &params, defaults)?;
            let select = Select::from(self.table)
                .order(&order.column, order.direction)
                .with_count();
            let fetched = self.store.select(&select).await.map_err(AppError::from)?;
            (fetched.rows, fetched.total)
        };
        let total = total.unwrap_or(data.len() as u64);
        Ok(ListResponse { data, total })
    }

    async fn get_one(&self, id: i64) -> Result<Row, ProviderError> {
        Ok(CrudService::read(self.store.as_ref(), self.table, id).await?)
    }

    async fn create(&self, body: Row) -> Result<Row, ProviderError> {
        Ok(CrudService::create(self.store.as_ref(), self.table, body).await?)
    }

    async fn update(&self, id: i64, body: Row) -> Result<Row, ProviderError> {
        Ok(CrudService::update(self.store.as_ref(), self.table, id, body).await?)
    }

    async fn delete(&self, id: i64) -> Result<Row, ProviderError> {
        Ok(CrudService::delete(self.store.as_ref(), self.table, id).await?)
    }
}
