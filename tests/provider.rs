use catalog_admin::provider::Page;
use catalog_admin::store::{Direction, Row};
use catalog_admin::{DataProvider, ListRequest, ProviderError, Store, Table};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

mod common;
use common::{product_body, TestApp};

/// Serve the app on an ephemeral port; returns its base URL.
async fn serve(app: &TestApp) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn row(v: Value) -> Row {
    v.as_object().cloned().unwrap()
}

async fn provider() -> (TestApp, DataProvider) {
    let app = common::setup();
    let base = serve(&app).await;
    let fallback: Arc<dyn Store> = app.store.clone();
    let provider = DataProvider::hybrid(&base, fallback);
    (app, provider)
}

#[tokio::test]
async fn managed_resources_go_through_the_api() {
    let (app, provider) = provider().await;
    let mut body = row(product_body("oak", "stair_treads"));
    body.insert("images".into(), json!(["a.png", "b.png"]));

    let created = provider.create("tb_product", body).await.unwrap();
    // Server-side curation ran.
    assert_eq!(created["main_image"], "a.png");
    let id = created["id"].as_i64().unwrap();

    let fetched = provider.get_one("tb_product", id).await.unwrap();
    assert_eq!(fetched["type_info"]["type_key"], "stair_treads");

    let updated = provider
        .update("tb_product", id, row(json!({"name": "oak tread"})))
        .await
        .unwrap();
    assert_eq!(updated["name"], "oak tread");

    for name in ["ash", "elm"] {
        provider.create("tb_product", row(product_body(name, "accessories"))).await.unwrap();
    }
    let page = provider
        .list("tb_product", &ListRequest::page(1, 2).sort("name", Direction::Asc))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    let names: Vec<&str> = page.data.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["ash", "elm"]);

    provider.delete("tb_product", id).await.unwrap();
    assert_eq!(app.store.len(Table::Products), 2);
}

#[tokio::test]
async fn api_errors_surface_the_server_message() {
    let (_app, provider) = provider().await;

    match provider.create("tb_product", row(json!({"name": "oak"}))).await {
        Err(ProviderError::Http { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "missing required fields: name, sku, price, type, seo_name");
        }
        other => panic!("unexpected: {:?}", other),
    }

    let err = provider.get_one("tb_product_type", 77).await.unwrap_err();
    assert_eq!(err.to_string(), "product type not found");
}

#[tokio::test]
async fn dropdown_listing_counts_what_it_returns() {
    let (app, provider) = provider().await;
    for (key, sort) in [("b", 2), ("a", 1)] {
        app.seed(Table::ProductTypes, json!({"type_key": key, "type_label": key, "sort": sort}))
            .await;
    }
    let all = provider.list("tb_product_type", &ListRequest::default()).await.unwrap();
    assert_eq!(all.total, 2);
    assert_eq!(all.data[0]["type_key"], "a");
}

#[tokio::test]
async fn unpaged_api_listing_returns_the_default_page() {
    let (app, provider) = provider().await;
    for i in 1..=12 {
        app.seed(Table::Products, product_body(&format!("tread {}", i), "stair_treads"))
            .await;
    }
    let first = provider.list("tb_product", &ListRequest::default()).await.unwrap();
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.total, 12);
    assert_eq!(first.data[0]["id"], json!(12));
}

#[tokio::test]
async fn other_tables_fall_back_to_the_store() {
    let (app, provider) = provider().await;
    app.seed(Table::Eclub, json!({"email": "a@example.com"})).await;
    app.seed(Table::Eclub, json!({"email": "b@example.com"})).await;

    let req = ListRequest {
        pagination: Some(Page {
            current: 1,
            page_size: 1,
        }),
        sorters: Vec::new(),
    };
    let page = provider.list("tb_eclub", &req).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.data[0]["email"], "b@example.com");

    let created = provider
        .create("tb_eclub", row(json!({"email": "c@example.com"})))
        .await
        .unwrap();
    assert_eq!(created["id"], json!(3));
    assert_eq!(app.store.len(Table::Eclub), 3);

    assert!(matches!(
        provider.list("tb_orders", &ListRequest::default()).await,
        Err(ProviderError::UnknownResource(_))
    ));
}

#[tokio::test]
async fn export_downloads_the_csv() {
    let (app, provider) = provider().await;
    app.seed(Table::Eclub, json!({"email": "a@example.com"})).await;
    let csv = provider.export_eclub().await.unwrap();
    assert!(csv.starts_with("\u{feff}ID,Email,Subscribed At\n"));
    assert!(csv.contains("\n1,a@example.com,"));
}
