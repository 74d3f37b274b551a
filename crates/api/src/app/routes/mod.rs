use axum::{
    Router,
    routing::{get, post},
};

pub mod admin;
pub mod auth;
pub mod collections;
pub mod contact;
pub mod profiles;
pub mod projects;
pub mod purchases;
pub mod system;

/// Routes reachable without a session (catalog browsing, contact form,
/// sign-in).
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/signin", post(auth::sign_in))
        .route("/projects", get(projects::list_projects))
        .route("/projects/:id", get(projects::get_project))
        .route("/contact", post(contact::submit))
}

/// Routes behind the bearer-token middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/whoami", get(auth::whoami))
        .route("/auth/signout", post(auth::sign_out))
        .route("/purchases", post(purchases::checkout).get(purchases::list_mine))
        .route("/purchases/:id/download", post(purchases::download))
        .route("/wishlist", get(collections::list_wishlist))
        .route("/wishlist/:project_id/toggle", post(collections::toggle_wishlist))
        .route("/cart", get(collections::list_cart))
        .route("/cart/:project_id/toggle", post(collections::toggle_cart))
        .route("/profile/me", get(profiles::me).put(profiles::update_me))
        .nest("/admin", admin::router())
}
