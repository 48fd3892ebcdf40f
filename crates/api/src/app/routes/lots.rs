use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use medsupply_core::LotId;
use medsupply_supplies::{NewSupplier, PaginationRequest};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(find_lots).post(create_lot))
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route("/:id", get(get_lot).patch(update_lot).delete(remove_lot))
}

pub async fn create_lot(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateLotRequest>,
) -> axum::response::Response {
    let (details, supply_id, supplier_id) = match body.into_parts() {
        Ok(parts) => parts,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.lots.create(details, supply_id, supplier_id).await {
        Ok(lot) => (StatusCode::CREATED, Json(lot)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// `GET /lots?offset&limit&sort&order&search`
pub async fn find_lots(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::LotsQuery>,
) -> axum::response::Response {
    let request = match PaginationRequest::try_from(query) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.lots.find(&request).await {
        Ok(lots) => Json(lots).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_lot(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LotId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.lots.find_one_by_id(id).await {
        Ok(lot) => Json(lot).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_lot(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateLotRequest>,
) -> axum::response::Response {
    let id: LotId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (patch, supply_id, supplier_id) = match body.into_parts() {
        Ok(parts) => parts,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.lots.update(id, patch, supply_id, supplier_id).await {
        Ok(lot) => Json(lot).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_lot(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LotId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.lots.remove(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.lots.find_all_suppliers().await {
        Ok(suppliers) => Json(suppliers).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewSupplier>,
) -> axum::response::Response {
    match services.lots.create_supplier(body).await {
        Ok(supplier) => (StatusCode::CREATED, Json(supplier)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
