//! Typed errors and HTTP mapping.

use crate::storage::StorageError;
use crate::store::StoreError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Store URL or service key absent. Reported before any store call.
    #[error("missing store configuration")]
    MissingConfig { has_url: bool, has_service_key: bool },
    #[error("{0}")]
    Validation(String),
    /// A write refused because other rows still depend on the target.
    #[error("{0}")]
    Integrity(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingConfig { .. } | AppError::Store(_) | AppError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) | AppError::Integrity(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Error envelope: `{ error, code?, details?, hint? }`.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorBody {
    pub fn message(error: impl Into<String>) -> Self {
        ErrorBody {
            error: error.into(),
            code: None,
            details: None,
            hint: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::MissingConfig {
                has_url,
                has_service_key,
            } => {
                tracing::error!(has_url, has_service_key, "store configuration missing");
                ErrorBody {
                    details: Some(json!({ "hasUrl": has_url, "hasServiceKey": has_service_key })),
                    ..ErrorBody::message("missing store configuration")
                }
            }
            AppError::Store(e) => {
                tracing::warn!(code = ?e.code, error = %e.message, "store call failed");
                ErrorBody {
                    error: e.message,
                    code: e.code,
                    details: e.details.map(Value::String),
                    hint: e.hint,
                }
            }
            AppError::Storage(e) => {
                tracing::warn!(error = %e, "storage call failed");
                ErrorBody::message(e.to_string())
            }
            other => ErrorBody::message(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
