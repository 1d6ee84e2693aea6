//! Route tables.

mod api;
mod common;

pub use api::{api_routes, UPLOAD_BODY_LIMIT};
pub use common::common_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Full application: operational routes at the root, resources under `/api`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api", api_routes(state))
        .layer(TraceLayer::new_for_http())
}
