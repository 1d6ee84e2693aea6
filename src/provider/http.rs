use super::{ListRequest, ListResponse, ProviderError, ResourceHandler};
use crate::store::Row;
use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

/// One API resource reached over HTTP. Every request opts out of caches.
pub struct HttpResource {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct One {
    data: Row,
}

#[derive(Deserialize)]
struct Many {
    data: Vec<Row>,
    total: Option<u64>,
}

/// Pass 2xx responses through; otherwise surface the server's `error` field.
pub(super) async fn error_for_status(res: Response) -> Result<Response, ProviderError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| if text.is_empty() { status.to_string() } else { text });
    Err(ProviderError::Http {
        status: status.as_u16(),
        message,
    })
}

impl HttpResource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        HttpResource {
            client,
            url: url.into(),
        }
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}", self.url, id)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ProviderError> {
        let res = req.header(CACHE_CONTROL, "no-store").send().await?;
        error_for_status(res).await
    }

    async fn one(&self, req: RequestBuilder) -> Result<Row, ProviderError> {
        let res = self.send(req).await?;
        let body: One = res.json().await.map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(body.data)
    }
}

#[async_trait]
impl ResourceHandler for HttpResource {
    async fn list(&self, req: &ListRequest) -> Result<ListResponse, ProviderError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(page) = req.pagination {
            query.push(("page", page.current.to_string()));
            query.push(("pageSize", page.page_size.to_string()));
        }
        if let Some(sorter) = req.sorters.first() {
            query.push(("sort", sorter.field.clone()));
            query.push(("order", sorter.order.as_str().to_string()));
        }
        let res = self.send(self.client.get(&self.url).query(&query)).await?;
        let body: Many = res.json().await.map_err(|e| ProviderError::Decode(e.to_string()))?;
        let total = body.total.unwrap_or(body.data.len() as u64);
        Ok(ListResponse {
            data: body.data,
            total,
        })
    }

    async fn get_one(&self, id: i64) -> Result<Row, ProviderError> {
        self.one(self.client.get(self.item_url(id))).await
    }

    async fn create(&self, body: Row) -> Result<Row, ProviderError> {
        self.one(self.client.post(&self.url).json(&body)).await
    }

    async fn update(&self, id: i64, body: Row) -> Result<Row, ProviderError> {
        self.one(self.client.put(self.item_url(id)).json(&body)).await
    }

    async fn delete(&self, id: i64) -> Result<Row, ProviderError> {
        self.one(self.client.delete(self.item_url(id))).await
    }
}
