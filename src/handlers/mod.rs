//! HTTP handlers for the catalog resources, uploads, and diagnostics.

pub mod diagnostics;
pub mod eclub;
pub mod product_types;
pub mod products;
pub mod upload;
pub mod user_leave;

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a JSON object body into a write model.
fn decode<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    if !body.is_object() {
        return Err(AppError::validation("body must be a JSON object"));
    }
    serde_json::from_value(body).map_err(|e| AppError::validation(e.to_string()))
}
