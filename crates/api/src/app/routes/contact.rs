use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use devmart_contact::SubmissionDraft;

use crate::app::errors;
use crate::app::services::AppServices;

/// Public custom-project request form.
pub async fn submit(
    Extension(services): Extension<Arc<AppServices>>,
    Json(draft): Json<SubmissionDraft>,
) -> axum::response::Response {
    if draft.name.trim().is_empty()
        || draft.email.trim().is_empty()
        || draft.project_details.trim().is_empty()
    {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "name, email and project_details are required",
        );
    }

    match services.contact().submit(draft).await {
        Ok(submission) => (StatusCode::CREATED, Json(submission)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
