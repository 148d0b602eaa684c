//! Post-authentication destination resolution.

use super::profile::UserProfile;
use super::redirect::{is_local_path, is_valid_redirect_target};
use crate::config::RoutePaths;

/// Pick where a freshly authenticated user lands.
///
/// Admins always go to the admin console, whatever was saved. Everyone else
/// (including a missing profile) goes to `saved_path` when it is non-empty,
/// else to the home page. The saved path is trusted as-is.
#[must_use]
pub fn resolve_destination(profile: Option<&UserProfile>, saved_path: Option<&str>, paths: &RoutePaths) -> String {
    if profile.is_some_and(UserProfile::is_admin) {
        return paths.admin.clone();
    }
    match saved_path {
        Some(path) if !path.is_empty() => path.to_owned(),
        _ => paths.home.clone(),
    }
}

/// [`resolve_destination`] with the saved path re-checked first. Auth pages
/// and anything that is not a same-origin path are dropped.
#[must_use]
pub fn navigation_target(profile: Option<&UserProfile>, saved_path: Option<&str>, paths: &RoutePaths) -> String {
    let saved_path = saved_path.filter(|p| is_local_path(p) && is_valid_redirect_target(Some(*p), paths));
    resolve_destination(profile, saved_path, paths)
}

#[cfg(test)]
#[path = "destination_test.rs"]
mod tests;
