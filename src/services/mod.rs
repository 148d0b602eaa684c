//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the redirect, session, and authorization logic so
//! route handlers can stay focused on request translation and cookies.

pub mod destination;
pub mod gate;
pub mod profile;
pub mod redirect;
pub mod session;
pub mod storage;
