use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, routing::post, Json, Router};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", post(execute_seed))
}

/// Wipe and reload the seed dataset.
pub async fn execute_seed(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.seed.execute_seed().await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
