use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use medsupply_core::DepartmentId;
use medsupply_departments::NewDepartment;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route("/:id", get(get_department).delete(remove_department))
}

pub async fn create_department(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewDepartment>,
) -> axum::response::Response {
    match services.departments.create(body).await {
        Ok(department) => (StatusCode::CREATED, Json(department)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_departments(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.departments.find_all().await {
        Ok(departments) => Json(departments).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_department(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DepartmentId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.departments.find_one_by_id(id).await {
        Ok(department) => Json(department).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_department(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DepartmentId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.departments.remove(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
