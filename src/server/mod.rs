//! HTTP surface of the gateway

pub mod docs;
pub mod error;
pub mod handlers;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::ExchangeRateProvider;

pub const CONVERTER_ROOT: &str = "/api/converter/v1/";

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ExchangeRateProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn ExchangeRateProvider>) -> Self {
        AppState { provider }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route(docs::OPENAPI_PATH, get(docs::openapi_json))
        .route(docs::SWAGGER_PATH, get(docs::swagger_ui))
        .route("/docs", get(docs::swagger_ui))
        .route(docs::REDOC_PATH, get(docs::redoc))
        .route("/redoc", get(docs::redoc))
        .route(CONVERTER_ROOT, get(handlers::supported_rates))
        .route("/api/converter/v1", get(handlers::supported_rates))
        .route("/api/converter/v1/convert", get(handlers::convert))
        .route(
            "/api/converter/v1/historical-data",
            get(handlers::historical_data),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
