use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};

use devmart_core::ProjectId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CatalogQuery>,
) -> axum::response::Response {
    let projects = services.projects();
    let result = if query.featured == Some(true) {
        projects.list_featured().await
    } else if let Some(category) = query.category.as_deref() {
        projects.list_by_category(category).await
    } else {
        projects.list().await
    };

    match result {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id"),
    };

    match services.projects().get(id).await {
        Ok(Some(project)) => (StatusCode::OK, Json(project)).into_response(),
        Ok(None) => errors::not_found("project"),
        Err(e) => errors::store_error_to_response(e),
    }
}
