//! HolyCat storefront library.
//!
//! The storefront and admin console render every page on the server and
//! keep no data of their own: products, carts, orders and accounts live in
//! the HolyCat backend API, reached through [`api::HolycatClient`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{Router, middleware as axum_middleware, response::Response, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::ErrorTemplate;
use crate::state::AppState;

/// Static assets shipped with the crate.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router with its middleware stack.
///
/// Sentry layers are outermost so they see every request, including
/// session and tracing failures.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .nest_service("/images", ServeDir::new(format!("{STATIC_DIR}/images")))
        .fallback(not_found)
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(
            middleware::expired_session_middleware,
        ))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> Response {
    ErrorTemplate::not_found()
}
