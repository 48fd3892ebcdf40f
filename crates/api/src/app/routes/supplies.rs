use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use medsupply_core::SupplyId;
use medsupply_supplies::query::{DEFAULT_LIMIT, DEFAULT_OFFSET};
use medsupply_supplies::{NewSupply, SupplyPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_supplies).post(create_supply))
        .route(
            "/:id",
            get(get_supply).patch(update_supply).delete(remove_supply),
        )
}

pub async fn create_supply(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewSupply>,
) -> axum::response::Response {
    match services.supplies.create(body).await {
        Ok(supply) => (StatusCode::CREATED, Json(supply)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_supplies(
    Extension(services): Extension<Arc<AppServices>>,
    Query(page): Query<dto::PageQuery>,
) -> axum::response::Response {
    let offset = page.offset.unwrap_or(DEFAULT_OFFSET);
    let limit = page.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "limit must be a positive integer",
        );
    }

    match services.supplies.find_all(offset, limit).await {
        Ok(supplies) => Json(supplies).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_supply(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplyId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.supplies.find_one_by_id(id).await {
        Ok(supply) => Json(supply).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_supply(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<SupplyPatch>,
) -> axum::response::Response {
    let id: SupplyId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.supplies.update(id, body).await {
        Ok(supply) => Json(supply).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_supply(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplyId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.supplies.remove(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
