#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use catalog_admin::store::Row;
use catalog_admin::{
    app, AppState, MemoryObjectStorage, MemoryStore, Settings, StaticClientFactory, Store, Table,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryObjectStorage>,
}

pub fn configured_settings() -> Settings {
    Settings {
        store_url: Some("postgres://catalog.test.local:5432/catalog".into()),
        store_service_key: Some("service-role-key".into()),
        store_anon_key: Some("anon-key".into()),
        export_utc_offset_hours: 8,
        ..Settings::default()
    }
}

pub fn setup() -> TestApp {
    setup_with(configured_settings())
}

pub fn setup_with(settings: Settings) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let storage = Arc::new(MemoryObjectStorage::new());
    let state = AppState {
        settings: Arc::new(settings),
        clients: Arc::new(StaticClientFactory(store.clone())),
        storage: storage.clone(),
    };
    TestApp {
        router: app(state),
        store,
        storage,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers.get(name).unwrap().to_str().unwrap()
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_empty(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn json(&self, method: Method, uri: &str, body: Value) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
    }

    /// Insert straight into the store, bypassing the API.
    pub async fn seed(&self, table: Table, values: Value) -> Row {
        self.store
            .insert(table, values.as_object().cloned().unwrap())
            .await
            .unwrap()
    }
}

/// A product body with every required field.
pub fn product_body(name: &str, product_type: &str) -> Value {
    serde_json::json!({
        "name": name,
        "sku": format!("SKU-{}", name.to_uppercase().replace(' ', "-")),
        "price": "19.90",
        "type": product_type,
        "seo_name": name.to_lowercase().replace(' ', "-"),
    })
}
