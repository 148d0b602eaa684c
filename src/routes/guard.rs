//! Route authorization extractors.
//!
//! SYSTEM CONTEXT
//! ==============
//! `RequireUser` and `RequireAdmin` run the gate state machine for a page
//! handler. Rejections render the loading page, redirect to login (saving
//! the requested path first), or render the access-denied page.

use axum::extract::FromRef;
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::services::gate::{self, AuthSnapshot, GateDecision, GateKind, ProfileStatus, SessionStatus};
use crate::services::profile::UserProfile;
use crate::services::redirect::RedirectPathStore;
use crate::services::session::SessionUser;
use crate::services::storage::CookieStorage;
use crate::state::AppState;

pub(crate) const SESSION_COOKIE: &str = "session_token";

const LOADING_PAGE: &str = r#"<!doctype html>
<html><head><meta http-equiv="refresh" content="1"><title>Loading</title></head>
<body><p>Loading&hellip;</p></body></html>"#;

const ACCESS_DENIED_PAGE: &str = r"<!doctype html>
<html><head><title>Access denied</title></head>
<body><h1>Access denied</h1><p>You do not have permission to view this page.</p></body></html>";

pub(crate) fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// REJECTION
// =============================================================================

pub enum GateRejection {
    /// Auth inputs still resolving. No content, no redirect.
    Loading,
    /// Anonymous visitor; `jar` carries the saved redirect intent.
    Login { jar: CookieJar, location: String },
    /// Signed in but not allowed here.
    Forbidden,
    /// Session backend failure.
    Internal,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Loading => {
                (StatusCode::SERVICE_UNAVAILABLE, [(header::RETRY_AFTER, "1")], Html(LOADING_PAGE)).into_response()
            }
            Self::Login { jar, location } => (jar, Redirect::to(&location)).into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, Html(ACCESS_DENIED_PAGE)).into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Any signed-in user.
pub struct RequireUser {
    pub user: SessionUser,
}

/// Signed-in user whose stored role is `admin`.
pub struct RequireAdmin {
    pub user: SessionUser,
    pub profile: UserProfile,
}

impl<S> axum::extract::FromRequestParts<S> for RequireUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let (user, _) = run_gate(parts, &app_state, GateKind::Protected).await?;
        Ok(Self { user })
    }
}

impl<S> axum::extract::FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let (user, profile) = run_gate(parts, &app_state, GateKind::AdminOnly).await?;
        let profile = profile.ok_or(GateRejection::Forbidden)?;
        Ok(Self { user, profile })
    }
}

/// Resolve auth inputs for this request and run the gate.
async fn run_gate(
    parts: &Parts,
    state: &AppState,
    kind: GateKind,
) -> Result<(SessionUser, Option<UserProfile>), GateRejection> {
    let jar = CookieJar::from_headers(&parts.headers);

    let session = match session_token(&jar) {
        None => SessionStatus::Anonymous,
        Some(token) => match state.sessions.current(token).await {
            Ok(Some(user)) => SessionStatus::Present(user),
            Ok(None) => SessionStatus::Anonymous,
            Err(e) => {
                tracing::error!(error = %e, "session lookup failed");
                return Err(GateRejection::Internal);
            }
        },
    };

    // Role is re-read from the profile store on every admin check.
    let profile = match (&session, kind) {
        (SessionStatus::Present(user), GateKind::AdminOnly) => {
            gate::fetch_profile_status(state.profiles.as_ref(), user.id, state.config.profile_fetch_timeout).await
        }
        _ => ProfileStatus::Pending,
    };

    let snapshot = AuthSnapshot { session, profile };
    let current_path = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path(), |pq| pq.as_str());

    let paths = &state.config.paths;
    let mut storage = CookieStorage::new(jar, state.config.cookie_secure);
    let decision = gate::decide(kind, &snapshot, current_path, &mut RedirectPathStore::new(&mut storage, paths));

    match decision {
        GateDecision::Render => match snapshot.session {
            SessionStatus::Present(user) => Ok((user, snapshot.profile.into_profile())),
            SessionStatus::Pending | SessionStatus::Anonymous => Err(GateRejection::Internal),
        },
        GateDecision::ShowLoading => Err(GateRejection::Loading),
        GateDecision::RedirectToLogin => {
            tracing::debug!(path = %current_path, "diverting anonymous visitor to login");
            Err(GateRejection::Login { jar: storage.into_jar(), location: paths.login.clone() })
        }
        GateDecision::AccessDenied => {
            tracing::info!(path = %current_path, "access denied");
            Err(GateRejection::Forbidden)
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
