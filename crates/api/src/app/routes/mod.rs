use axum::Router;

pub mod assets;
pub mod departments;
pub mod lots;
pub mod seed;
pub mod supplies;
pub mod system;

/// Router for every record-family endpoint.
pub fn router() -> Router {
    Router::new()
        .nest("/lots", lots::router())
        .nest("/medical-supplies", supplies::router())
        .nest("/departments", departments::router())
        .nest("/national-assets", assets::router())
        .nest("/seed", seed::router())
}
