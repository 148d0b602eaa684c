//! Route authorization gate.
//!
//! DESIGN
//! ======
//! The gate is a pure function of the latest known auth inputs:
//!
//! ```text
//! Loading ──▶ Unauthenticated   (no session: save path, go to login)
//!    │
//!    ├──────▶ Unauthorized      (admin-only, role check failed)
//!    │
//!    └──────▶ Authorized        (render the guarded content)
//! ```
//!
//! Both gate kinds share the machine; they differ only in whether the
//! profile role is consulted. The role always comes from a `ProfileStore`
//! fetched for this evaluation.

use std::time::Duration;

use uuid::Uuid;

use super::profile::{ProfileStore, UserProfile};
use super::redirect::RedirectPathStore;
use super::session::SessionUser;
use super::storage::ScopeStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// Any authenticated principal.
    Protected,
    /// Authenticated principal whose profile role is `admin`.
    AdminOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Anonymous,
    Present(SessionUser),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileStatus {
    Pending,
    Loaded(Option<UserProfile>),
    Failed,
}

impl ProfileStatus {
    #[must_use]
    pub fn into_profile(self) -> Option<UserProfile> {
        match self {
            Self::Loaded(profile) => profile,
            Self::Pending | Self::Failed => None,
        }
    }
}

/// Latest known auth inputs for one route evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub session: SessionStatus,
    pub profile: ProfileStatus,
}

impl AuthSnapshot {
    #[must_use]
    pub fn loading() -> Self {
        Self { session: SessionStatus::Pending, profile: ProfileStatus::Pending }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { session: SessionStatus::Anonymous, profile: ProfileStatus::Pending }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Unauthenticated,
    Unauthorized,
    Authorized,
}

/// Evaluate the gate for `kind` against `snapshot`. No side effects.
#[must_use]
pub fn evaluate(kind: GateKind, snapshot: &AuthSnapshot) -> GateState {
    let user = match &snapshot.session {
        SessionStatus::Pending => return GateState::Loading,
        SessionStatus::Anonymous => return GateState::Unauthenticated,
        SessionStatus::Present(user) => user,
    };

    match kind {
        GateKind::Protected => GateState::Authorized,
        GateKind::AdminOnly => match &snapshot.profile {
            ProfileStatus::Pending => GateState::Loading,
            ProfileStatus::Loaded(Some(profile)) if profile.id == user.id && profile.is_admin() => {
                GateState::Authorized
            }
            ProfileStatus::Loaded(_) | ProfileStatus::Failed => GateState::Unauthorized,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    ShowLoading,
    RedirectToLogin,
    AccessDenied,
    Render,
}

/// Evaluate the gate and apply its one side effect: on `Unauthenticated`
/// the current path is saved before the redirect decision is returned.
pub fn decide<S: ScopeStorage>(
    kind: GateKind,
    snapshot: &AuthSnapshot,
    current_path: &str,
    redirects: &mut RedirectPathStore<'_, S>,
) -> GateDecision {
    match evaluate(kind, snapshot) {
        GateState::Loading => GateDecision::ShowLoading,
        GateState::Unauthenticated => {
            redirects.save(current_path);
            GateDecision::RedirectToLogin
        }
        GateState::Unauthorized => GateDecision::AccessDenied,
        GateState::Authorized => GateDecision::Render,
    }
}

/// Fetch the profile for a gate evaluation. Errors collapse to `Failed`;
/// exceeding `timeout` leaves the status `Pending`.
pub async fn fetch_profile_status(
    profiles: &dyn ProfileStore,
    user_id: Uuid,
    timeout: Option<Duration>,
) -> ProfileStatus {
    let fetch = profiles.fetch_profile(user_id);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, fetch).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(%user_id, timeout = ?limit, "profile fetch still pending");
                return ProfileStatus::Pending;
            }
        },
        None => fetch.await,
    };

    match result {
        Ok(profile) => ProfileStatus::Loaded(profile),
        Err(e) => {
            tracing::warn!(%user_id, error = %e, "profile fetch failed");
            ProfileStatus::Failed
        }
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
