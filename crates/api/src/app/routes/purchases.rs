use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use devmart_core::{ProjectId, PurchaseId};
use devmart_purchasing::{CheckoutItem, PurchaseWorkflow};
use devmart_store::FileStorage;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

/// Drive the purchase workflow server-side: validate buyer details, confirm
/// the synthetic payment, and return the issued license key.
pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<dto::CheckoutRequest>,
) -> axum::response::Response {
    let project_id: ProjectId = match body.project_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id"),
    };

    let project = match services.projects().get(project_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::not_found("project"),
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut workflow = PurchaseWorkflow::new(
        services.store(),
        services.side_effects().clone(),
        CheckoutItem::new(project.id, project.price),
    );

    if let Err(e) = workflow.submit_details(body.details) {
        return errors::purchase_error_to_response(e);
    }

    let license_key = match workflow.confirm_purchase(Some(auth.identity())).await {
        Ok(key) => key,
        Err(e) => return errors::purchase_error_to_response(e),
    };

    let Some(purchase_id) = workflow.purchase_id() else {
        return errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "purchase_record_error",
            "purchase id missing after confirmation",
        );
    };

    (
        StatusCode::CREATED,
        Json(dto::CheckoutResponse {
            purchase_id: purchase_id.to_string(),
            license_key: license_key.to_string(),
            amount: project.price,
            currency: workflow.item().currency.clone(),
        }),
    )
        .into_response()
}

pub async fn list_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    match services.purchases().list_for_user(auth.identity().user_id).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Resume the workflow at its terminal state and request a download; the
/// response carries a storage URL when the project has a main file.
pub async fn download(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PurchaseId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid purchase id"),
    };

    let purchase = match services.purchases().get(id).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::not_found("purchase"),
        Err(e) => return errors::store_error_to_response(e),
    };

    // Others' purchases are invisible, not forbidden.
    if purchase.user_id != auth.identity().user_id {
        return errors::not_found("purchase");
    }

    let item = CheckoutItem::new(purchase.project_id, purchase.amount)
        .with_currency(purchase.currency.clone());
    let workflow = PurchaseWorkflow::resume_completed(
        services.store(),
        services.side_effects().clone(),
        item,
        purchase.id,
        purchase.license_key.clone(),
    );

    let ticket = match workflow.download(Some(auth.identity())).await {
        Ok(ticket) => ticket,
        Err(e) => return errors::purchase_error_to_response(e),
    };

    // Hand-off to the file storage boundary; absence of a stored file is
    // not an error here, the transfer just has nowhere to point yet.
    let download_url = match services.projects().main_file(ticket.project_id).await {
        Ok(Some(file)) => services.file_storage().get_url(&file.file_path).await.ok(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "main file lookup failed");
            None
        }
    };

    (
        StatusCode::OK,
        Json(dto::DownloadResponse {
            purchase_id: ticket.purchase_id.to_string(),
            project_id: ticket.project_id.to_string(),
            download_url,
        }),
    )
        .into_response()
}
