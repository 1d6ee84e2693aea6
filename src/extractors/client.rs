//! Config guard as extractors. Listed first in a handler's arguments so a missing secret is
//! reported before any other input is looked at.

use crate::client::require_service_secrets;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::Store;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Privileged store client for the current request.
pub struct Client(pub Arc<dyn Store>);

#[async_trait]
impl FromRequestParts<AppState> for Client {
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state.store().map(Client)
    }
}

/// Passes only when the store secrets are configured. For handlers that need no store client.
pub struct Guard;

#[async_trait]
impl FromRequestParts<AppState> for Guard {
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_service_secrets(&state.settings).map(|_| Guard)
    }
}
