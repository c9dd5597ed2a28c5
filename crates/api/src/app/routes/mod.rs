use axum::Router;

pub mod catalog;
pub mod loyalty;
pub mod system;

/// Router for every domain endpoint.
pub fn router() -> Router {
    Router::new()
        .nest("/catalog", catalog::router())
        .nest("/loyalty", loyalty::router())
}
