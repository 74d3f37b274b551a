use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use devmart_profiles::UserProfile;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    match services.profiles().get(auth.identity().user_id).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(profile)).into_response(),
        Ok(None) => errors::not_found("profile"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> axum::response::Response {
    let identity = auth.identity();

    let mut profile = match services.profiles().get(identity.user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => UserProfile::new(identity.user_id, identity.email.clone(), Utc::now()),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(full_name) = body.full_name {
        profile.full_name = Some(full_name);
    }
    if let Some(avatar_url) = body.avatar_url {
        profile.avatar_url = Some(avatar_url);
    }
    if let Some(phone) = body.phone {
        profile.phone = Some(phone);
    }
    if let Some(country) = body.country {
        profile.country = Some(country);
    }
    profile.updated_at = Utc::now();

    match services.profiles().upsert(profile).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
