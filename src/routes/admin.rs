//! Admin API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use super::guard::RequireAdmin;
use crate::services::profile::Role;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// `PATCH /api/admin/users/{id}/role` — change a user's role.
pub async fn update_role(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(user_id): Path<Uuid>,
    axum::Json(update): axum::Json<RoleUpdate>,
) -> StatusCode {
    if user_id == admin.user.id && update.role != Role::Admin {
        return StatusCode::CONFLICT;
    }

    match state.profiles.set_role(user_id, update.role).await {
        Ok(true) => {
            tracing::info!(admin_id = %admin.user.id, %user_id, role = %update.role, "role updated");
            StatusCode::NO_CONTENT
        }
        Ok(false) => StatusCode::NOT_FOUND,
        Err(e) => {
            tracing::error!(error = %e, %user_id, "role update failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
