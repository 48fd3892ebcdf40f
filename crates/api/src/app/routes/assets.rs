use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use medsupply_assets::NewNationalAsset;
use medsupply_core::AssetId;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_assets).post(create_asset))
        .route("/:id", get(get_asset).delete(remove_asset))
}

pub async fn create_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewNationalAsset>,
) -> axum::response::Response {
    match services.assets.create(body).await {
        Ok(asset) => (StatusCode::CREATED, Json(asset)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_assets(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.assets.find_all().await {
        Ok(assets) => Json(assets).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AssetId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.assets.find_one_by_id(id).await {
        Ok(asset) => Json(asset).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AssetId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.assets.remove(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
