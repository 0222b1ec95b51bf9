//! HTTP gateway (Axum) for predictions and cache inspection.
//!
//! This module is primarily used by the `propmatch` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::predict_handler;
pub use state::HandlerState;

use crate::model::{SampleTokenizer, SpanScorer};
use handler::{
    cache_settings_handler, evict_all_handler, evict_cache_item_handler, get_cache_item_handler,
    list_cache_items_handler, root_handler,
};
use payload::HealthResponse;

pub fn create_router_with_state<T, M>(state: HandlerState<T, M>) -> Router
where
    T: SampleTokenizer + 'static,
    M: SpanScorer + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(health_handler))
        .route("/predict", post(predict_handler))
        .route("/cache", get(cache_settings_handler))
        .route(
            "/cache/items",
            get(list_cache_items_handler).delete(evict_all_handler),
        )
        .route(
            "/cache/items/{id}",
            get(get_cache_item_handler).delete(evict_cache_item_handler),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}
