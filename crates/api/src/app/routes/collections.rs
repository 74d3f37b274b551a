use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use devmart_collections::CollectionKind;
use devmart_core::ProjectId;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::AuthContext;

pub async fn list_wishlist(
    services: Extension<Arc<AppServices>>,
    auth: Extension<AuthContext>,
) -> axum::response::Response {
    list(services, auth, CollectionKind::Wishlist).await
}

pub async fn list_cart(
    services: Extension<Arc<AppServices>>,
    auth: Extension<AuthContext>,
) -> axum::response::Response {
    list(services, auth, CollectionKind::Cart).await
}

pub async fn toggle_wishlist(
    services: Extension<Arc<AppServices>>,
    auth: Extension<AuthContext>,
    project_id: Path<String>,
) -> axum::response::Response {
    toggle(services, auth, project_id, CollectionKind::Wishlist).await
}

pub async fn toggle_cart(
    services: Extension<Arc<AppServices>>,
    auth: Extension<AuthContext>,
    project_id: Path<String>,
) -> axum::response::Response {
    toggle(services, auth, project_id, CollectionKind::Cart).await
}

async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    kind: CollectionKind,
) -> axum::response::Response {
    match services.collections().list(kind, auth.identity().user_id).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn toggle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<String>,
    kind: CollectionKind,
) -> axum::response::Response {
    let project_id: ProjectId = match project_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id"),
    };

    match services
        .collections()
        .toggle(kind, auth.identity().user_id, project_id)
        .await
    {
        Ok(member) => (StatusCode::OK, Json(serde_json::json!({ "member": member }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
