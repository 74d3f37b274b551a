use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;

use devmart_auth::{SessionProvider, SessionToken};
use devmart_profiles::UserProfile;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;
use crate::middleware;

pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignInRequest>,
) -> axum::response::Response {
    let email = body.email.trim().to_string();
    if email.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_email", "email is required");
    }

    let role = services.role_for(&email);
    let token = match services.sessions().sign_in(email.clone(), role) {
        Ok(token) => token,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", e.to_string());
        }
    };

    let identity = match services.sessions().resolve(&token) {
        Ok(identity) => identity,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", e.to_string());
        }
    };

    // Profile bootstrap, like the storefront's sign-up hook. Best-effort.
    match services.profiles().get(identity.user_id).await {
        Ok(None) => {
            let profile = UserProfile::new(identity.user_id, email, Utc::now());
            if let Err(e) = services.profiles().upsert(profile).await {
                tracing::warn!(error = %e, "profile bootstrap failed");
            }
        }
        Ok(Some(_)) => {}
        Err(e) => tracing::warn!(error = %e, "profile lookup failed during sign-in"),
    }

    (
        StatusCode::OK,
        Json(dto::SignInResponse {
            token: token.to_string(),
            user_id: identity.user_id.to_string(),
            role: identity.role,
        }),
    )
        .into_response()
}

pub async fn sign_out(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let token = match middleware::extract_bearer(&headers) {
        Ok(token) => token,
        Err(status) => return errors::json_error(status, "unauthorized", "missing bearer token"),
    };

    match services.sessions().sign_out(&SessionToken::new(token)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", e.to_string()),
    }
}

pub async fn whoami(Extension(auth): Extension<AuthContext>) -> impl IntoResponse {
    let identity = auth.identity();
    Json(serde_json::json!({
        "user_id": identity.user_id.to_string(),
        "email": identity.email,
        "role": identity.role,
    }))
}
