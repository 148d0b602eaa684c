//! Browser-session scoped key/value storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! The redirect store keeps its single slot here. Every operation is
//! synchronous and fallible; callers decide whether a failure matters.
//!
//! DESIGN
//! ======
//! `CookieStorage` keeps each key in its own HttpOnly cookie without
//! `Max-Age`, so the value lives exactly as long as the browser session.
//! The jar holds raw values; `CookieJar` percent-encodes them on the way out
//! and decodes them on the way in. The size quota is measured on the
//! encoded `Set-Cookie` form.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Per-cookie byte budget (encoded `Set-Cookie` string) most browsers honor.
pub const MAX_COOKIE_BYTES: usize = 4096;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage quota exceeded for {key} ({size} > {limit} bytes)")]
    QuotaExceeded { key: String, size: usize, limit: usize },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous key/value store scoped to one browser session.
pub trait ScopeStorage {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: ScopeStorage + ?Sized> ScopeStorage for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// =============================================================================
// COOKIE STORAGE
// =============================================================================

/// Cookie-backed storage. Writes accumulate in the jar, which the handler
/// must return with its response.
#[derive(Debug, Clone)]
pub struct CookieStorage {
    jar: CookieJar,
    secure: bool,
}

impl CookieStorage {
    #[must_use]
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    /// Hand back the jar, including any pending `Set-Cookie` deltas.
    #[must_use]
    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl ScopeStorage for CookieStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(cookie) = self.jar.get(key) else {
            return Ok(None);
        };
        let value = cookie.value();
        Ok((!value.is_empty()).then(|| value.to_owned()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let cookie: Cookie<'static> = Cookie::build((key.to_owned(), value.to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .into();
        let size = cookie.encoded().to_string().len();
        if size > MAX_COOKIE_BYTES {
            return Err(StorageError::QuotaExceeded { key: key.to_owned(), size, limit: MAX_COOKIE_BYTES });
        }

        self.jar = self.jar.clone().add(cookie);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.jar = self.jar.clone().remove(Cookie::build((key.to_owned(), "")).path("/"));
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
