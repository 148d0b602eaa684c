//! Accounts and session tokens.
//!
//! ARCHITECTURE
//! ============
//! Sign-up and sign-in produce a `SessionUser`; the route layer then mints a
//! long-lived session token stored in an HttpOnly cookie. The session only
//! proves identity. Roles are never carried in it, see `profile`.
//!
//! Unknown email and wrong password both map to `InvalidCredentials`.

use std::fmt::Write;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use rand::Rng;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

pub(crate) fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("shopper")
        .to_owned()
}

/// Hash a password into a PHC string.
///
/// # Errors
///
/// Returns an error if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Check `password` against a stored PHC string. Malformed hashes never verify.
#[must_use]
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Authenticated principal. Exists only while a session is valid.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Account and session backend. Enables mocking in tests.
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// Register a new customer account.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SessionUser, AuthError>;

    /// Check credentials for an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, AuthError>;

    /// Mint a session token for `user_id`.
    async fn create_session(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Resolve a session token to its user, or `None` if unknown or expired.
    async fn current(&self, token: &str) -> Result<Option<SessionUser>, AuthError>;

    /// Destroy a session. Unknown tokens are ignored.
    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;
}

/// Validate sign-up input, returning the normalized email.
///
/// # Errors
///
/// Returns `InvalidEmail` or `WeakPassword`.
pub fn validate_sign_up(email: &str, password: &str) -> Result<String, AuthError> {
    let normalized = normalize_email(email).ok_or(AuthError::InvalidEmail)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(normalized)
}

// =============================================================================
// POSTGRES
// =============================================================================

pub struct PgSessionProvider {
    pool: PgPool,
    ttl_days: i32,
}

impl PgSessionProvider {
    #[must_use]
    pub fn new(pool: PgPool, ttl_days: i32) -> Self {
        Self { pool, ttl_days }
    }
}

#[async_trait::async_trait]
impl SessionProvider for PgSessionProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SessionUser, AuthError> {
        let email = validate_sign_up(email, password)?;
        let display_name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| name_from_email(&email), str::to_owned);
        let password_hash = hash_password(password)?;

        let row = sqlx::query(
            r"INSERT INTO users (email, display_name, password_hash)
              VALUES ($1, $2, $3)
              RETURNING id",
        )
        .bind(&email)
        .bind(&display_name)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return AuthError::EmailTaken;
                }
            }
            AuthError::Db(e)
        })?;

        Ok(SessionUser { id: row.get("id"), email, display_name })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        let email = normalize_email(email).ok_or(AuthError::InvalidCredentials)?;
        let row = sqlx::query("SELECT id, email, display_name, password_hash FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let stored: String = row.get("password_hash");
        if !verify_password(&stored, password) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(SessionUser { id: row.get("id"), email: row.get("email"), display_name: row.get("display_name") })
    }

    async fn create_session(&self, user_id: Uuid) -> Result<String, AuthError> {
        let token = generate_token();
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, now() + make_interval(days => $3))",
        )
        .bind(&token)
        .bind(user_id)
        .bind(self.ttl_days)
        .execute(&self.pool)
        .await?;
        Ok(token)
    }

    async fn current(&self, token: &str) -> Result<Option<SessionUser>, AuthError> {
        let row = sqlx::query(
            r"SELECT u.id, u.email, u.display_name
              FROM sessions s
              JOIN users u ON u.id = s.user_id
              WHERE s.token = $1 AND s.expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| SessionUser { id: r.get("id"), email: r.get("email"), display_name: r.get("display_name") }))
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
