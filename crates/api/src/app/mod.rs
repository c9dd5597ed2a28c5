//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, loyalty card service, card communication worker
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, extract::DefaultBodyLimit, routing::get};
use tower::ServiceBuilder;

use retailforge_infra::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> Router {
    let services = Arc::new(services::build_services());

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
}
