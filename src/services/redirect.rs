//! Single-slot store for the path a visitor wanted before signing in.
//!
//! ARCHITECTURE
//! ============
//! The gate saves the guarded path when it diverts an anonymous visitor to
//! the login page; the auth routes take it back out exactly once after a
//! successful sign-in. Only one intent exists at a time (overwrite on save).
//!
//! Storage failures never escape this module: a failed save leaves the
//! slot as it was, and a failed read or clear yields no intent.

use serde_json::Value;

use super::storage::ScopeStorage;
use crate::config::RoutePaths;

/// Storage key holding the pending redirect intent.
pub const REDIRECT_KEY: &str = "redirect_intent";

pub struct RedirectPathStore<'a, S> {
    storage: S,
    paths: &'a RoutePaths,
}

impl<'a, S: ScopeStorage> RedirectPathStore<'a, S> {
    pub fn new(storage: S, paths: &'a RoutePaths) -> Self {
        Self { storage, paths }
    }

    /// Remember `path` as the post-login destination, replacing any earlier one.
    /// The login and signup pages are never stored.
    pub fn save(&mut self, path: &str) {
        if path == self.paths.login || path == self.paths.signup {
            return;
        }
        if let Err(e) = self.storage.set(REDIRECT_KEY, path) {
            tracing::debug!(error = %e, %path, "redirect intent not saved");
        }
    }

    /// Read and delete the stored intent. Returns `None` when nothing is
    /// stored or the storage cannot be read or cleared.
    pub fn take_and_clear(&mut self) -> Option<String> {
        let value = match self.storage.get(REDIRECT_KEY) {
            Ok(value) => value?,
            Err(e) => {
                tracing::debug!(error = %e, "redirect intent unreadable");
                return None;
            }
        };
        // A value that cannot be cleared would be handed out twice.
        if let Err(e) = self.storage.remove(REDIRECT_KEY) {
            tracing::debug!(error = %e, "redirect intent not cleared");
            return None;
        }
        Some(value)
    }
}

/// False for a missing path and for the login, signup, and logout pages.
#[must_use]
pub fn is_valid_redirect_target(path: Option<&str>, paths: &RoutePaths) -> bool {
    path.is_some_and(|p| !paths.is_auth_page(p))
}

/// JSON-boundary variant of [`is_valid_redirect_target`]: anything that is
/// not a string is rejected.
#[must_use]
pub fn is_valid_redirect_value(value: &Value, paths: &RoutePaths) -> bool {
    is_valid_redirect_target(value.as_str(), paths)
}

/// True for same-origin absolute paths (`/x`), false for `//host` and
/// scheme-qualified URLs. Control characters are rejected outright, since
/// browsers strip tab and newline from a `Location` and `/\t/host` would
/// become `//host`.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if path.contains('\\') || path.chars().any(char::is_control) {
        return false;
    }
    !rest.trim_start().starts_with('/')
}

#[cfg(test)]
#[path = "redirect_test.rs"]
mod tests;
