use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", " On "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "False"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_invalid_returns_none() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}

// =============================================================================
// AppConfig::from_lookup
// =============================================================================

#[test]
fn missing_database_url_is_an_error() {
    let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn defaults_apply_when_only_database_url_set() {
    let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db")])).unwrap();
    assert_eq!(config.database_url, "postgres://db");
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert!(!config.cookie_secure);
    assert_eq!(config.session_ttl_days, DEFAULT_SESSION_TTL_DAYS);
    assert!(config.profile_fetch_timeout.is_none());
    assert_eq!(config.paths, RoutePaths::default());
}

#[test]
fn overrides_are_parsed() {
    let config = AppConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://db"),
        ("PORT", "8080"),
        ("COOKIE_SECURE", "yes"),
        ("SESSION_TTL_DAYS", "7"),
        ("PROFILE_FETCH_TIMEOUT_MS", "250"),
        ("ADMIN_PATH", "/console"),
    ]))
    .unwrap();
    assert_eq!(config.port, 8080);
    assert!(config.cookie_secure);
    assert_eq!(config.session_ttl_days, 7);
    assert_eq!(config.profile_fetch_timeout, Some(Duration::from_millis(250)));
    assert_eq!(config.paths.admin, "/console");
    assert_eq!(config.paths.login, "/login");
}

#[test]
fn invalid_port_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "x"), ("PORT", "http")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "http".into() });
}

#[test]
fn non_positive_session_ttl_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "x"), ("SESSION_TTL_DAYS", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "SESSION_TTL_DAYS", .. }));
}

#[test]
fn relative_route_path_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "x"), ("LOGIN_PATH", "login")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "LOGIN_PATH", .. }));
}

// =============================================================================
// RoutePaths
// =============================================================================

#[test]
fn auth_pages_are_login_signup_logout() {
    let paths = RoutePaths::default();
    assert!(paths.is_auth_page("/login"));
    assert!(paths.is_auth_page("/signup"));
    assert!(paths.is_auth_page("/logout"));
    assert!(!paths.is_auth_page("/admin"));
    assert!(!paths.is_auth_page("/"));
    assert!(!paths.is_auth_page("/login/help"));
}

#[test]
fn colliding_route_paths_are_rejected() {
    let cases = [
        ("LOGIN_PATH", "/"),
        ("ADMIN_PATH", "/login"),
        ("LOGOUT_PATH", "/signup"),
        ("ADMIN_PATH", "/account"),
        ("LOGOUT_PATH", "/healthz"),
        ("HOME_PATH", "/api/auth/me"),
    ];
    for (key, value) in cases {
        let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "x"), (key, value)])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key, value: value.into() }, "{key}={value} should collide");
    }
}

#[test]
fn distinct_route_overrides_are_accepted() {
    let config = AppConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "x"),
        ("LOGIN_PATH", "/sign-in"),
        ("HOME_PATH", "/shop"),
    ]))
    .unwrap();
    assert_eq!(config.paths.login, "/sign-in");
    assert_eq!(config.paths.home, "/shop");
}
