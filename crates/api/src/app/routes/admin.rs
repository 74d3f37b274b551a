use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::Utc;

use devmart_catalog::{ProjectDraft, ProjectFile, ProjectUpdate};
use devmart_core::{ProjectId, SubmissionId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/projects", post(create_project))
        .route("/projects/:id", patch(update_project).delete(delete_project))
        .route("/projects/:id/files", post(register_file))
        .route("/contact", get(list_submissions))
        .route("/contact/:id", patch(triage_submission))
}

fn require_admin(auth: &AuthContext) -> Result<(), axum::response::Response> {
    if auth.identity().is_admin() {
        Ok(())
    } else {
        Err(errors::forbidden())
    }
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Json(draft): Json<ProjectDraft>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&auth) {
        return resp;
    }

    match services.projects().create(draft).await {
        Ok(project) => (StatusCode::CREATED, Json(project)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(update): Json<ProjectUpdate>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&auth) {
        return resp;
    }

    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id"),
    };

    match services.projects().update(id, update).await {
        Ok(Some(project)) => (StatusCode::OK, Json(project)).into_response(),
        Ok(None) => errors::not_found("project"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&auth) {
        return resp;
    }

    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id"),
    };

    match services.projects().delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::not_found("project"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn register_file(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RegisterFileRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&auth) {
        return resp;
    }

    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id"),
    };

    match services.projects().get(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::not_found("project"),
        Err(e) => return errors::store_error_to_response(e),
    }

    let mut file = ProjectFile::new(id, body.file_name, body.file_path, Utc::now());
    file.file_size = body.file_size;
    file.file_type = body.file_type;
    file.is_main_file = body.is_main_file;

    match services.projects().add_file(file).await {
        Ok(file) => (StatusCode::CREATED, Json(file)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_submissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&auth) {
        return resp;
    }

    match services.contact().list().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn triage_submission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::TriageRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&auth) {
        return resp;
    }

    let id: SubmissionId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid submission id"),
    };

    match services.contact().triage(id, body.status, body.priority).await {
        Ok(Some(submission)) => (StatusCode::OK, Json(submission)).into_response(),
        Ok(None) => errors::not_found("submission"),
        Err(e) => errors::store_error_to_response(e),
    }
}
