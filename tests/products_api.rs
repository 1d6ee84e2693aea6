use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use catalog_admin::Table;
use serde_json::{json, Value};

mod common;
use common::product_body;

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn second_page_of_twelve_products() {
    let app = common::setup();
    for i in 1..=12 {
        app.seed(Table::Products, product_body(&format!("tread {}", i), "stair_treads"))
            .await;
    }

    let res = app.get("/api/products?page=2&pageSize=5").await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["total"], json!(12));
    // Newest first, so page 2 holds the 6th through 10th newest rows.
    assert_eq!(ids(&body), vec![7, 6, 5, 4, 3]);
}

#[tokio::test]
async fn list_with_bad_paging_uses_defaults_and_custom_sort() {
    let app = common::setup();
    for name in ["cedar", "ash", "birch"] {
        app.seed(Table::Products, product_body(name, "stair_treads")).await;
    }

    let body = app.get("/api/products?page=-1&pageSize=abc&sort=name&order=asc").await.json();
    let names: Vec<&str> = body["data"].as_array().unwrap().iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["ash", "birch", "cedar"]);
    assert_eq!(body["total"], json!(3));

    let res = app.get("/api/products?sort=password").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "invalid sort field: password");
}

#[tokio::test]
async fn list_by_id_skips_pagination() {
    let app = common::setup();
    for i in 1..=3 {
        app.seed(Table::Products, product_body(&format!("p{}", i), "accessories")).await;
    }
    let body = app.get("/api/products?id=2&page=9").await.json();
    assert_eq!(ids(&body), vec![2]);

    let res = app.get("/api/products?id=two").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "invalid id format");
}

#[tokio::test]
async fn products_carry_type_info() {
    let app = common::setup();
    app.seed(Table::ProductTypes, json!({"type_key": "stair_treads", "type_label": "Stair treads", "sort": 1}))
        .await;
    app.seed(Table::Products, product_body("oak", "stair_treads")).await;
    app.seed(Table::Products, product_body("odd", "retired_type")).await;

    let body = app.get("/api/products").await.json();
    assert_eq!(body["data"][0]["type_info"], json!({"type_key": "retired_type", "type_label": "retired_type"}));
    assert_eq!(body["data"][1]["type_info"], json!({"type_key": "stair_treads", "type_label": "Stair treads"}));

    let one = app.get("/api/products/1").await.json();
    assert_eq!(one["data"]["type_info"]["type_label"], "Stair treads");
}

#[tokio::test]
async fn create_requires_all_fields_and_writes_nothing_otherwise() {
    let app = common::setup();
    for missing in ["name", "sku", "price", "type", "seo_name"] {
        let mut body = product_body("oak", "stair_treads");
        body.as_object_mut().unwrap().remove(missing);
        let res = app.json(Method::POST, "/api/products", body).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "without {}", missing);
        assert_eq!(res.json()["error"], "missing required fields: name, sku, price, type, seo_name");
    }
    let mut blank = product_body("oak", "stair_treads");
    blank["sku"] = json!("  ");
    assert_eq!(app.json(Method::POST, "/api/products", blank).await.status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty(Table::Products));
}

#[tokio::test]
async fn create_fills_main_image_from_images() {
    let app = common::setup();
    let mut body = product_body("oak", "stair_treads");
    body["images"] = json!(["a", "b", "a"]);
    body["price"] = json!(24.5);
    let res = app.json(Method::POST, "/api/products", body).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.json()["data"]["id"].as_i64().unwrap();

    let stored = app.get(&format!("/api/products/{}", id)).await.json();
    assert_eq!(stored["data"]["main_image"], "a");
    assert_eq!(stored["data"]["images"], json!(["a", "b"]));
    assert_eq!(stored["data"]["price"], "24.5");
}

#[tokio::test]
async fn create_with_main_image_derives_keywords() {
    let app = common::setup();
    let mut body = product_body("Oak Tread", "stair_treads");
    body["main_image"] = json!("https://cdn.local/products/1700_abc.png");
    let created = app.json(Method::POST, "/api/products", body).await.json();
    assert_eq!(created["data"]["images"], json!(["https://cdn.local/products/1700_abc.png"]));
    let keywords = created["data"]["image_keywords"].as_str().unwrap();
    assert!(keywords.contains("oak") && keywords.contains("stair_treads"), "{}", keywords);
}

#[tokio::test]
async fn update_writes_only_present_fields() {
    let app = common::setup();
    let mut body = product_body("oak", "stair_treads");
    body["main_image"] = json!("m");
    body["href"] = json!("/oak");
    app.json(Method::POST, "/api/products", body).await;

    let res = app
        .json(Method::PUT, "/api/products/1", json!({"images": ["x", "y"], "href": null, "price": 30}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let row = res.json()["data"].clone();
    assert_eq!(row["main_image"], "m");
    assert_eq!(row["images"], json!(["x", "y"]));
    assert_eq!(row["href"], Value::Null);
    assert_eq!(row["price"], "30");
    assert_eq!(row["name"], "oak");

    let res = app.json(Method::PUT, "/api/products/1", json!({"name": ""})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let res = app.json(Method::PUT, "/api/products/1", json!({"price": "12,5"})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let app = common::setup();
    let res = app.get("/api/products/abc").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "invalid id format");

    let res = app.get("/api/products/42").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "product not found");

    assert_eq!(app.json(Method::PUT, "/api/products/42", json!({"name": "x"})).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/api/products/42").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_the_row() {
    let app = common::setup();
    app.seed(Table::Products, product_body("oak", "stair_treads")).await;
    let res = app.delete("/api/products/1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["data"]["name"], "oak");
    assert!(app.store.is_empty(Table::Products));
}

#[tokio::test]
async fn search_matches_keywords_name_and_description() {
    let app = common::setup();
    app.seed(Table::Products, json!({"name": "Oak tread", "image_keywords": "wood", "describe": "", "type": "t"})).await;
    app.seed(Table::Products, json!({"name": "Rubber nosing", "describe": "Anti-slip OAK finish", "type": "t"})).await;
    app.seed(Table::Products, json!({"name": "Bracket", "image_keywords": "oakley", "type": "t"})).await;
    app.seed(Table::Products, json!({"name": "Riser", "describe": "pine", "type": "t"})).await;

    let res = app.get("/api/products/search?q=%20oak%20&pageSize=2").await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["query"], "oak");
    assert_eq!(body["total"], json!(3));
    assert_eq!(ids(&body), vec![3, 2]);

    let res = app.get("/api/products/search?q=%25").await;
    assert_eq!(res.json()["total"], json!(0));

    let res = app.get("/api/products/search?q=%20%20").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn responses_are_never_cached() {
    let app = common::setup();
    for uri in ["/api/products", "/api/products/abc", "/api/products/search"] {
        let res = app.get(uri).await;
        assert_eq!(
            res.header(header::CACHE_CONTROL),
            "no-store, no-cache, must-revalidate, proxy-revalidate",
            "{}",
            uri
        );
    }
}

#[tokio::test]
async fn store_errors_are_passed_through() {
    let app = common::setup();
    app.store.fail_next(
        catalog_admin::StoreError::new("permission denied for table tb_product")
            .with_code("42501")
            .with_details("role lacks SELECT"),
    );
    let res = app.get("/api/products").await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.json(),
        json!({"error": "permission denied for table tb_product", "code": "42501", "details": "role lacks SELECT"})
    );
}

#[tokio::test]
async fn page_past_bigint_range_is_empty() {
    let app = common::setup();
    for name in ["oak", "ash"] {
        app.seed(Table::Products, product_body(name, "stair_treads")).await;
    }
    let res = app.get("/api/products?page=1000000000000000000&pageSize=10").await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["total"], json!(2));
}

#[tokio::test]
async fn unreadable_requests_get_the_error_envelope() {
    let app = common::setup();

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.send(malformed).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().is_some_and(|e| !e.is_empty()));

    let untyped = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .body(Body::from(product_body("oak", "stair_treads").to_string()))
        .unwrap();
    let res = app.send(untyped).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().is_some_and(|e| !e.is_empty()));

    let res = app.get("/api/products?page=1&page=2").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].is_string());
    assert!(app.store.is_empty(Table::Products));
}

#[tokio::test]
async fn exponent_prices_are_stored_as_plain_decimals() {
    let app = common::setup();
    for (price, stored) in [(json!(1e-7), "0.0000001"), (json!(1e21), "1000000000000000000000")] {
        let mut body = product_body("oak", "stair_treads");
        body["price"] = price;
        let res = app.json(Method::POST, "/api/products", body).await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.json()["data"]["price"], stored);
    }
}
