//! Server configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! Loaded once at startup and shared through `AppState`. Reserved route
//! paths live here so the redirect store and the gate never hardcode them.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SESSION_TTL_DAYS: i32 = 30;

/// Routes mounted at fixed paths; reserved paths may not reuse them.
pub const FIXED_ROUTES: [&str; 6] = ["/account", "/orders", "/wishlist", "/cart", "/checkout", "/healthz"];

/// JSON endpoints live under this prefix.
pub const API_PREFIX: &str = "/api/";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} required")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

// =============================================================================
// ROUTE PATHS
// =============================================================================

/// Reserved paths used by the auth flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePaths {
    pub login: String,
    pub signup: String,
    pub logout: String,
    pub admin: String,
    pub home: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            login: "/login".into(),
            signup: "/signup".into(),
            logout: "/logout".into(),
            admin: "/admin".into(),
            home: "/".into(),
        }
    }
}

impl RoutePaths {
    /// True for the login, signup, and logout pages.
    #[must_use]
    pub fn is_auth_page(&self, path: &str) -> bool {
        path == self.login || path == self.signup || path == self.logout
    }

    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let paths = Self {
            login: path_var(lookup, "LOGIN_PATH", defaults.login)?,
            signup: path_var(lookup, "SIGNUP_PATH", defaults.signup)?,
            logout: path_var(lookup, "LOGOUT_PATH", defaults.logout)?,
            admin: path_var(lookup, "ADMIN_PATH", defaults.admin)?,
            home: path_var(lookup, "HOME_PATH", defaults.home)?,
        };
        paths.check_distinct()?;
        Ok(paths)
    }

    /// Every reserved path must get its own route, apart from the fixed ones.
    fn check_distinct(&self) -> Result<(), ConfigError> {
        let entries = [
            ("HOME_PATH", &self.home),
            ("LOGIN_PATH", &self.login),
            ("SIGNUP_PATH", &self.signup),
            ("LOGOUT_PATH", &self.logout),
            ("ADMIN_PATH", &self.admin),
        ];
        for (i, &(key, path)) in entries.iter().enumerate() {
            let taken = FIXED_ROUTES.contains(&path.as_str())
                || path.starts_with(API_PREFIX)
                || entries[..i].iter().any(|&(_, earlier)| earlier == path);
            if taken {
                return Err(ConfigError::Invalid { key, value: path.clone() });
            }
        }
        Ok(())
    }
}

fn path_var<F>(lookup: &F, key: &'static str, default: String) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.starts_with('/') {
                Ok(trimmed.to_owned())
            } else {
                Err(ConfigError::Invalid { key, value: raw })
            }
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub cookie_secure: bool,
    pub session_ttl_days: i32,
    /// Upper bound on a gate's profile fetch. `None` waits indefinitely.
    pub profile_fetch_timeout: Option<Duration>,
    pub paths: RoutePaths,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `COOKIE_SECURE`: default false
    /// - `SESSION_TTL_DAYS`: default 30
    /// - `PROFILE_FETCH_TIMEOUT_MS`: unset means no timeout
    /// - `LOGIN_PATH`, `SIGNUP_PATH`, `LOGOUT_PATH`, `ADMIN_PATH`, `HOME_PATH`
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let db_max_connections = parse_var(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let cookie_secure = match lookup("COOKIE_SECURE") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "COOKIE_SECURE", value: raw })?,
        };
        let session_ttl_days = parse_var(&lookup, "SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS)?;
        if session_ttl_days <= 0 {
            return Err(ConfigError::Invalid { key: "SESSION_TTL_DAYS", value: session_ttl_days.to_string() });
        }
        let profile_fetch_timeout = match lookup("PROFILE_FETCH_TIMEOUT_MS") {
            None => None,
            Some(raw) => {
                let ms = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid { key: "PROFILE_FETCH_TIMEOUT_MS", value: raw })?;
                Some(Duration::from_millis(ms))
            }
        };
        let paths = RoutePaths::from_lookup(&lookup)?;

        Ok(Self {
            database_url,
            port,
            db_max_connections,
            cookie_secure,
            session_ttl_days,
            profile_fetch_timeout,
            paths,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
