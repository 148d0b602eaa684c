//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages and JSON endpoints share one Axum router. Sign-in, sign-up,
//! sign-out, and admin pages mount at the configured reserved paths so the
//! redirect store and the router agree on what counts as an auth page.

pub mod admin;
pub mod auth;
pub mod guard;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let paths = state.config.paths.clone();

    Router::new()
        .route(&paths.home, get(pages::home))
        .route(&paths.login, get(pages::login_page).post(auth::login_form))
        .route(&paths.signup, get(pages::signup_page).post(auth::signup_form))
        .route(&paths.logout, post(auth::logout_form))
        .route(&paths.admin, get(pages::admin_console))
        .route("/account", get(pages::account))
        .route("/orders", get(pages::orders))
        .route("/wishlist", get(pages::wishlist))
        .route("/cart", get(pages::cart))
        .route("/checkout", get(pages::checkout))
        .route("/api/auth/login", post(auth::login_json))
        .route("/api/auth/signup", post(auth::signup_json))
        .route("/api/auth/logout", post(auth::logout_json))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/redirect-intent", put(auth::save_redirect_intent))
        .route("/api/admin/users/{id}/role", patch(admin::update_role))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
