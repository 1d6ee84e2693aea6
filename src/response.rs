//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Cache policy stamped on every `/api` response.
pub const NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Echo of the search text on search responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::CREATED, Json(SuccessOne { data }))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::OK, Json(SuccessOne { data }))
}

pub fn success_many<T: Serialize>(data: Vec<T>, total: Option<u64>) -> (StatusCode, Json<SuccessMany<T>>) {
    (
        StatusCode::OK,
        Json(SuccessMany {
            data,
            total,
            query: None,
        }),
    )
}

pub fn success_search<T: Serialize>(data: Vec<T>, total: Option<u64>, query: String) -> (StatusCode, Json<SuccessMany<T>>) {
    (
        StatusCode::OK,
        Json(SuccessMany {
            data,
            total,
            query: Some(query),
        }),
    )
}
