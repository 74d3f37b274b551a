//! HTTP API application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: infrastructure wiring (record store, sessions, file
//!   storage, repositories, side-effect queue)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `admin_emails` lists the addresses granted the admin role at sign-in;
/// everyone else signs in as a customer.
pub async fn build_app(admin_emails: Vec<String>) -> Router {
    let services = Arc::new(services::build_services(admin_emails));
    let auth_state = middleware::AuthState {
        sessions: services.sessions_dyn(),
    };

    // Protected routes: require a resolvable bearer token.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
}
