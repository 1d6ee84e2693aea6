//! GET /api/test: confirms the API is reachable and which store secrets are set.

use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

const URL_PREVIEW_CHARS: usize = 30;

fn preview(url: Option<&str>) -> String {
    match url {
        Some(url) => format!("{}...", url.chars().take(URL_PREVIEW_CHARS).collect::<String>()),
        None => "not configured".to_string(),
    }
}

pub async fn report(State(state): State<AppState>) -> Json<Value> {
    let settings = &state.settings;
    Json(json!({
        "message": "API routes are working",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "env": {
            "hasStoreUrl": settings.store_url.is_some(),
            "hasServiceKey": settings.store_service_key.is_some(),
            "storeUrl": preview(settings.store_url.as_deref()),
        }
    }))
}
