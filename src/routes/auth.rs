//! Auth routes: sign-up, sign-in, sign-out, redirect intents.
//!
//! Every successful authentication ends in [`complete_authentication`],
//! which consumes the redirect intent exactly once, re-reads the role from
//! the profile store, and picks the landing page.

use axum::extract::{FromRef, Form, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use super::guard::{SESSION_COOKIE, session_token};
use crate::services::destination;
use crate::services::profile::{Role, UserProfile};
use crate::services::redirect::{RedirectPathStore, is_local_path, is_valid_redirect_value};
use crate::services::session::{AuthError, SessionUser};
use crate::services::storage::CookieStorage;
use crate::state::AppState;

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user for JSON endpoints. Rejects with 401 instead of
/// redirecting, and does not touch the redirect intent.
pub struct AuthUser {
    pub user: SessionUser,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar).ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = AppState::from_ref(state);
        let user = app_state
            .sessions
            .current(token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session lookup failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user })
    }
}

// =============================================================================
// COOKIES
// =============================================================================

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .into()
}

fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .into()
}

// =============================================================================
// AUTHENTICATION COMPLETION
// =============================================================================

#[derive(Debug, Serialize)]
pub struct AuthOutcome {
    pub redirect: String,
    pub user: SessionUser,
    pub role: Option<Role>,
}

/// Finish a sign-in or sign-up: mint the session, take the redirect intent,
/// fetch the role, and resolve the landing page.
///
/// # Errors
///
/// Returns `INTERNAL_SERVER_ERROR` if the session cannot be created.
pub async fn complete_authentication(
    state: &AppState,
    jar: CookieJar,
    user: SessionUser,
) -> Result<(CookieJar, AuthOutcome), StatusCode> {
    let token = state.sessions.create_session(user.id).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %user.id, "session creation failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let paths = &state.config.paths;
    let secure = state.config.cookie_secure;
    let mut storage = CookieStorage::new(jar, secure);
    let saved = RedirectPathStore::new(&mut storage, paths).take_and_clear();

    let profile: Option<UserProfile> = match state.profiles.fetch_profile(user.id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user.id, "profile fetch failed after sign-in");
            None
        }
    };

    let redirect = destination::navigation_target(profile.as_ref(), saved.as_deref(), paths);
    tracing::info!(user_id = %user.id, %redirect, "user authenticated");

    let jar = storage.into_jar().add(session_cookie(token, secure));
    let outcome = AuthOutcome { redirect, user, role: profile.map(|p| p.role) };
    Ok((jar, outcome))
}

fn auth_error_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::InvalidEmail | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::PasswordHash(_) | AuthError::Db(_) => {
            tracing::error!(error = %e, "auth backend failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

async fn sign_in(state: &AppState, jar: CookieJar, req: &LoginRequest) -> Result<(CookieJar, AuthOutcome), StatusCode> {
    let user = state
        .sessions
        .sign_in(&req.email, &req.password)
        .await
        .map_err(|e| auth_error_status(&e))?;
    complete_authentication(state, jar, user).await
}

async fn sign_up(
    state: &AppState,
    jar: CookieJar,
    req: &SignupRequest,
) -> Result<(CookieJar, AuthOutcome), StatusCode> {
    let user = state
        .sessions
        .sign_up(&req.email, &req.password, req.display_name.as_deref())
        .await
        .map_err(|e| auth_error_status(&e))?;
    tracing::info!(user_id = %user.id, "account created");
    complete_authentication(state, jar, user).await
}

/// `POST /api/auth/login` — JSON sign-in.
pub async fn login_json(State(state): State<AppState>, jar: CookieJar, Json(req): Json<LoginRequest>) -> Response {
    match sign_in(&state, jar, &req).await {
        Ok((jar, outcome)) => (jar, Json(outcome)).into_response(),
        Err(status) => status.into_response(),
    }
}

/// `POST /login` — form sign-in, redirects to the resolved destination.
pub async fn login_form(State(state): State<AppState>, jar: CookieJar, Form(req): Form<LoginRequest>) -> Response {
    match sign_in(&state, jar, &req).await {
        Ok((jar, outcome)) => (jar, Redirect::to(&outcome.redirect)).into_response(),
        Err(status) => status.into_response(),
    }
}

/// `POST /api/auth/signup` — JSON account creation.
pub async fn signup_json(State(state): State<AppState>, jar: CookieJar, Json(req): Json<SignupRequest>) -> Response {
    match sign_up(&state, jar, &req).await {
        Ok((jar, outcome)) => (StatusCode::CREATED, jar, Json(outcome)).into_response(),
        Err(status) => status.into_response(),
    }
}

/// `POST /signup` — form account creation.
pub async fn signup_form(State(state): State<AppState>, jar: CookieJar, Form(req): Form<SignupRequest>) -> Response {
    match sign_up(&state, jar, &req).await {
        Ok((jar, outcome)) => (jar, Redirect::to(&outcome.redirect)).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn end_session(state: &AppState, jar: CookieJar) -> CookieJar {
    if let Some(token) = session_token(&jar) {
        if let Err(e) = state.sessions.sign_out(token).await {
            tracing::warn!(error = %e, "session delete failed");
        }
    }
    jar.add(clear_session_cookie(state.config.cookie_secure))
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout_json(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (end_session(&state, jar).await, StatusCode::NO_CONTENT)
}

/// `POST /logout` — delete session, clear cookie, go home.
pub async fn logout_form(State(state): State<AppState>, jar: CookieJar) -> Response {
    let jar = end_session(&state, jar).await;
    (jar, Redirect::to(&state.config.paths.home)).into_response()
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: SessionUser,
    pub role: Option<Role>,
}

/// `GET /api/auth/me` — current user with the role from the profile store.
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<MeResponse>, StatusCode> {
    let profile = state.profiles.fetch_profile(auth.user.id).await.map_err(|e| {
        tracing::error!(error = %e, "profile fetch failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(MeResponse { user: auth.user, role: profile.map(|p| p.role) }))
}

#[derive(Deserialize)]
pub struct RedirectIntentRequest {
    #[serde(default)]
    pub path: serde_json::Value,
}

/// `PUT /api/auth/redirect-intent` — remember a client-chosen destination.
pub async fn save_redirect_intent(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RedirectIntentRequest>,
) -> Response {
    let paths = &state.config.paths;
    let Some(path) = req.path.as_str().filter(|p| is_local_path(p)) else {
        return (StatusCode::BAD_REQUEST, "redirect path must be a local path").into_response();
    };
    if !is_valid_redirect_value(&req.path, paths) {
        return (StatusCode::BAD_REQUEST, "redirect path not allowed").into_response();
    }

    let mut storage = CookieStorage::new(jar, state.config.cookie_secure);
    RedirectPathStore::new(&mut storage, paths).save(path);
    (storage.into_jar(), StatusCode::NO_CONTENT).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
