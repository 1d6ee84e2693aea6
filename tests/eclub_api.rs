use axum::http::{header, StatusCode};
use catalog_admin::Table;
use serde_json::json;

mod common;

async fn subscribe(app: &common::TestApp, emails: &[&str]) {
    for email in emails {
        app.seed(Table::Eclub, json!({ "email": email })).await;
    }
}

#[tokio::test]
async fn export_is_a_csv_attachment() {
    let app = common::setup();
    subscribe(&app, &["a@example.com", "b@example.com", "c,d@example.com"]).await;

    let res = app.post_empty("/api/eclub?action=export").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header(header::CONTENT_TYPE), "text/csv; charset=utf-8");
    let disposition = res.header(header::CONTENT_DISPOSITION);
    assert!(disposition.starts_with("attachment; filename=\"eclub-subscribers-"), "{}", disposition);
    assert!(disposition.ends_with(".csv\""), "{}", disposition);

    let text = res.text();
    assert!(text.starts_with('\u{feff}'));
    let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "ID,Email,Subscribed At");
    assert!(lines[1].starts_with("3,\"c,d@example.com\","), "{}", lines[1]);
    assert!(lines[2].starts_with("2,b@example.com,"), "{}", lines[2]);
    assert!(lines[3].starts_with("1,a@example.com,"), "{}", lines[3]);

    let stamp = lines[3].rsplit(',').next().unwrap();
    let (date, time) = stamp.split_once(' ').unwrap();
    assert_eq!(date.split('/').count(), 3, "{}", stamp);
    assert_eq!(time.len(), 8, "{}", stamp);
}

#[tokio::test]
async fn export_of_nothing_is_just_the_header() {
    let app = common::setup();
    let res = app.post_empty("/api/eclub?action=export").await;
    assert_eq!(res.text(), "\u{feff}ID,Email,Subscribed At\n");
}

#[tokio::test]
async fn unknown_actions_are_rejected() {
    let app = common::setup();
    for uri in ["/api/eclub", "/api/eclub?action=import"] {
        let res = app.post_empty(uri).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(res.json()["error"], "invalid action");
    }
}

#[tokio::test]
async fn list_is_paginated_newest_first() {
    let app = common::setup();
    subscribe(&app, &["a@example.com", "b@example.com", "c@example.com"]).await;
    let body = app.get("/api/eclub?pageSize=2").await.json();
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["data"][0]["email"], "c@example.com");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn delete_takes_the_id_from_the_query() {
    let app = common::setup();
    subscribe(&app, &["a@example.com", "b@example.com"]).await;

    let res = app.delete("/api/eclub").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "id is required");

    let res = app.delete("/api/eclub?id=x1").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "invalid id format");

    let res = app.delete("/api/eclub?id=1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["data"]["email"], "a@example.com");
    assert_eq!(app.store.len(Table::Eclub), 1);

    assert_eq!(app.delete("/api/eclub?id=1").await.status, StatusCode::NOT_FOUND);
}
