use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use retailforge_catalog::{NewCategory, NewCompany};
use retailforge_import::ProductImportWizard;
use retailforge_infra::{CatalogRepository, Store};

use crate::app::dto::{Items, TemplateView};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/companies", post(create_company))
        .route("/categories", post(create_category))
        .route("/import", post(import_catalog))
        .route("/templates", get(list_templates))
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewCompany>,
) -> axum::response::Response {
    match services.write(|uow| uow.create_company(body)) {
        Ok(company) => (StatusCode::CREATED, Json(company)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewCategory>,
) -> axum::response::Response {
    match services.write(|uow| uow.create_category(body)) {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// Body: `{"filename": "...", "upload_file": "<base64>"}`.
pub async fn import_catalog(
    Extension(services): Extension<Arc<AppServices>>,
    Json(wizard): Json<ProductImportWizard>,
) -> axum::response::Response {
    let uow = match services.store.begin() {
        Ok(uow) => uow,
        Err(e) => return errors::repository_error_to_response(e),
    };

    match wizard.import_data(uow) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::import_error_to_response(e),
    }
}

pub async fn list_templates(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let views = services.read(|uow| {
        uow.templates()?
            .into_iter()
            .map(|template| {
                let variants = uow.variants_of(template.id)?;
                Ok(TemplateView { template, variants })
            })
            .collect::<Result<Vec<_>, _>>()
    });

    match views {
        Ok(views) => (StatusCode::OK, Json(Items::from(views))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
