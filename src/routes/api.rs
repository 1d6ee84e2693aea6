//! Resource routes mounted under `/api`. Every response carries the no-store cache policy.

use crate::handlers::{diagnostics, eclub, product_types, products, upload, user_leave};
use crate::response::NO_STORE;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Upload bodies may exceed the image limit so oversize files reach validation and get a 400.
pub const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn api_routes(state: AppState) -> Router {
    let upload = Router::new()
        .route("/upload", post(upload::upload))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(UPLOAD_BODY_LIMIT)),
        );

    Router::new()
        .route("/products", get(products::list).post(products::create))
        .route("/products/search", get(products::search))
        .route(
            "/products/:id",
            get(products::read).put(products::update).delete(products::delete),
        )
        .route("/product-types", get(product_types::list).post(product_types::create))
        .route(
            "/product-types/:id",
            get(product_types::read)
                .put(product_types::update)
                .delete(product_types::delete),
        )
        .route("/user-leave", get(user_leave::list).post(user_leave::create))
        .route(
            "/user-leave/:id",
            get(user_leave::read).put(user_leave::update).delete(user_leave::delete),
        )
        .route(
            "/eclub",
            get(eclub::list).post(eclub::action).delete(eclub::delete),
        )
        .route("/test", get(diagnostics::report))
        .merge(upload)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_STORE),
        ))
        .with_state(state)
}
