//! User profiles and roles, read from the trusted `users` table.
//!
//! SYSTEM CONTEXT
//! ==============
//! Authorization decisions read the role through [`ProfileStore`] on every
//! check. Nothing the browser sends (cookies, headers, query) is consulted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Artisan,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Artisan => "artisan",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "artisan" => Ok(Self::Artisan),
            "admin" => Ok(Self::Admin),
            other => Err(ProfileError::UnknownRole(other.to_owned())),
        }
    }
}

/// Profile row keyed by the session user's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl UserProfile {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Server-side profile source. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile for `user_id`, or `None` if no such user exists.
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, ProfileError>;

    /// Change a user's role. Returns `false` if the user does not exist.
    async fn set_role(&self, user_id: Uuid, role: Role) -> Result<bool, ProfileError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, ProfileError> {
        let row = sqlx::query("SELECT id, email, display_name, role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let role: String = row.get("role");
        Ok(Some(UserProfile {
            id: row.get("id"),
            email: row.get("email"),
            display_name: row.get("display_name"),
            role: role.parse()?,
        }))
    }

    async fn set_role(&self, user_id: Uuid, role: Role) -> Result<bool, ProfileError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
