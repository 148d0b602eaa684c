use super::*;
use crate::services::profile::Role;
use crate::services::redirect::REDIRECT_KEY;
use crate::state::test_helpers::{self, FailingProfileStore, SlowProfileStore};
use axum::extract::FromRequestParts;
use axum::http::Request;
use std::sync::Arc;
use std::time::Duration;

fn parts(uri: &str, cookies: &[(&str, &str)], headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().uri(uri);
    if !cookies.is_empty() {
        let cookie_header = cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        builder = builder.header(header::COOKIE, cookie_header);
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap().into_parts().0
}

fn saved_intent(jar: &CookieJar) -> Option<String> {
    jar.get(REDIRECT_KEY).map(|c| c.value().to_owned())
}

// =============================================================================
// RequireUser
// =============================================================================

#[tokio::test]
async fn anonymous_visitor_is_sent_to_login_with_path_saved() {
    let (state, _) = test_helpers::test_app_state();
    let mut p = parts("/account", &[], &[]);
    let Err(GateRejection::Login { jar, location }) = RequireUser::from_request_parts(&mut p, &state).await else {
        panic!("expected login redirect");
    };
    assert_eq!(location, "/login");
    assert_eq!(saved_intent(&jar).as_deref(), Some("/account"));
}

#[tokio::test]
async fn saved_path_keeps_query_string() {
    let (state, _) = test_helpers::test_app_state();
    let mut p = parts("/orders?status=open", &[], &[]);
    let Err(GateRejection::Login { jar, .. }) = RequireUser::from_request_parts(&mut p, &state).await else {
        panic!("expected login redirect");
    };
    assert_eq!(saved_intent(&jar).as_deref(), Some("/orders?status=open"));
}

#[tokio::test]
async fn unknown_session_token_is_anonymous() {
    let (state, _) = test_helpers::test_app_state();
    let mut p = parts("/cart", &[(SESSION_COOKIE, "deadbeef")], &[]);
    let result = RequireUser::from_request_parts(&mut p, &state).await;
    assert!(matches!(result, Err(GateRejection::Login { .. })));
}

#[tokio::test]
async fn signed_in_customer_passes_protected_gate() {
    let (state, directory) = test_helpers::test_app_state();
    let (user, token) = directory.seed_session("cust@example.com", Role::Customer);
    let mut p = parts("/account", &[(SESSION_COOKIE, token.as_str())], &[]);
    let Ok(granted) = RequireUser::from_request_parts(&mut p, &state).await else {
        panic!("expected access");
    };
    assert_eq!(granted.user, user);
}

#[tokio::test]
async fn login_redirect_response_is_see_other_with_cookie() {
    let (state, _) = test_helpers::test_app_state();
    let mut p = parts("/wishlist", &[], &[]);
    let Err(rejection) = RequireUser::from_request_parts(&mut p, &state).await else {
        panic!("expected rejection");
    };
    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("redirect_intent=%2Fwishlist"));
}

// =============================================================================
// RequireAdmin
// =============================================================================

#[tokio::test]
async fn admin_passes_admin_gate() {
    let (state, directory) = test_helpers::test_app_state();
    let (user, token) = directory.seed_session("boss@example.com", Role::Admin);
    let mut p = parts("/admin", &[(SESSION_COOKIE, token.as_str())], &[]);
    let Ok(granted) = RequireAdmin::from_request_parts(&mut p, &state).await else {
        panic!("expected admin access");
    };
    assert_eq!(granted.user.id, user.id);
    assert!(granted.profile.is_admin());
}

#[tokio::test]
async fn customer_is_denied_admin_even_with_forged_role_flags() {
    let (state, directory) = test_helpers::test_app_state();
    let (_, token) = directory.seed_session("cust@example.com", Role::Customer);
    let mut p = parts(
        "/admin?role=admin",
        &[(SESSION_COOKIE, token.as_str()), ("role", "admin"), ("isAdmin", "true")],
        &[("x-user-role", "admin")],
    );
    let result = RequireAdmin::from_request_parts(&mut p, &state).await;
    let Err(rejection) = result else {
        panic!("customer must not pass the admin gate");
    };
    assert!(matches!(rejection, GateRejection::Forbidden));
    assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn demoted_admin_is_denied_on_next_request() {
    let (state, directory) = test_helpers::test_app_state();
    let (user, token) = directory.seed_session("former@example.com", Role::Admin);

    let mut p = parts("/admin", &[(SESSION_COOKIE, token.as_str())], &[]);
    assert!(RequireAdmin::from_request_parts(&mut p, &state).await.is_ok());

    crate::services::profile::ProfileStore::set_role(directory.as_ref(), user.id, Role::Customer)
        .await
        .unwrap();
    let mut p = parts("/admin", &[(SESSION_COOKIE, token.as_str())], &[]);
    assert!(matches!(RequireAdmin::from_request_parts(&mut p, &state).await, Err(GateRejection::Forbidden)));
}

#[tokio::test]
async fn anonymous_admin_request_saves_admin_path() {
    let (state, _) = test_helpers::test_app_state();
    let mut p = parts("/admin", &[], &[]);
    let Err(GateRejection::Login { jar, .. }) = RequireAdmin::from_request_parts(&mut p, &state).await else {
        panic!("expected login redirect");
    };
    assert_eq!(saved_intent(&jar).as_deref(), Some("/admin"));
}

#[tokio::test]
async fn failed_profile_fetch_denies_admin() {
    let (_, directory) = test_helpers::test_app_state();
    let (_, token) = directory.seed_session("boss@example.com", Role::Admin);
    let state = test_helpers::test_app_state_with_profiles(
        test_helpers::test_config(),
        directory,
        Arc::new(FailingProfileStore),
    );
    let mut p = parts("/admin", &[(SESSION_COOKIE, token.as_str())], &[]);
    assert!(matches!(RequireAdmin::from_request_parts(&mut p, &state).await, Err(GateRejection::Forbidden)));
}

#[tokio::test]
async fn slow_profile_fetch_renders_loading() {
    let (_, directory) = test_helpers::test_app_state();
    let (_, token) = directory.seed_session("boss@example.com", Role::Admin);
    let mut config = test_helpers::test_config();
    config.profile_fetch_timeout = Some(Duration::from_millis(10));
    let slow = Arc::new(SlowProfileStore { inner: directory.clone(), delay: Duration::from_millis(200) });
    let state = test_helpers::test_app_state_with_profiles(config, directory, slow);

    let mut p = parts("/admin", &[(SESSION_COOKIE, token.as_str())], &[]);
    let Err(rejection) = RequireAdmin::from_request_parts(&mut p, &state).await else {
        panic!("expected loading");
    };
    assert!(matches!(rejection, GateRejection::Loading));
    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

// =============================================================================
// session_token
// =============================================================================

#[test]
fn session_token_ignores_empty_cookie() {
    let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, ""));
    assert_eq!(session_token(&jar), None);
}

#[test]
fn session_token_reads_cookie() {
    let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "abc"));
    assert_eq!(session_token(&jar), Some("abc"));
}
