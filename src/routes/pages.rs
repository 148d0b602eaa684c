//! Storefront pages.
//!
//! Account pages sit behind `RequireUser`; the admin console sits behind
//! `RequireAdmin`. Catalog, cart, and checkout content is rendered by the
//! frontend, so these handlers only emit the page shell.

use axum::extract::State;
use axum::response::Html;

use super::guard::{RequireAdmin, RequireUser};
use crate::state::AppState;

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn shell(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>{body}</body></html>",
        escape_html(title)
    ))
}

fn member_page(title: &str, guard: &RequireUser) -> Html<String> {
    let name = escape_html(&guard.user.display_name);
    shell(title, &format!("<h1>{}</h1><p>Signed in as {name}.</p>", escape_html(title)))
}

pub async fn home() -> Html<String> {
    shell("Storefront", "<h1>Storefront</h1>")
}

pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    let paths = &state.config.paths;
    let body = format!(
        r#"<h1>Sign in</h1>
<form method="post" action="{login}">
<input name="email" type="email" required>
<input name="password" type="password" required>
<button type="submit">Sign in</button>
</form>
<p><a href="{signup}">Create an account</a></p>"#,
        login = escape_html(&paths.login),
        signup = escape_html(&paths.signup),
    );
    shell("Sign in", &body)
}

pub async fn signup_page(State(state): State<AppState>) -> Html<String> {
    let paths = &state.config.paths;
    let body = format!(
        r#"<h1>Create an account</h1>
<form method="post" action="{signup}">
<input name="display_name" type="text">
<input name="email" type="email" required>
<input name="password" type="password" minlength="8" required>
<button type="submit">Sign up</button>
</form>
<p><a href="{login}">Already have an account?</a></p>"#,
        login = escape_html(&paths.login),
        signup = escape_html(&paths.signup),
    );
    shell("Create an account", &body)
}

pub async fn account(guard: RequireUser) -> Html<String> {
    member_page("Your account", &guard)
}

pub async fn orders(guard: RequireUser) -> Html<String> {
    member_page("Your orders", &guard)
}

pub async fn wishlist(guard: RequireUser) -> Html<String> {
    member_page("Your wishlist", &guard)
}

pub async fn cart(guard: RequireUser) -> Html<String> {
    member_page("Your cart", &guard)
}

pub async fn checkout(guard: RequireUser) -> Html<String> {
    member_page("Checkout", &guard)
}

pub async fn admin_console(guard: RequireAdmin) -> Html<String> {
    let name = escape_html(&guard.profile.display_name);
    shell("Admin", &format!("<h1>Admin console</h1><p>Signed in as {name} ({}).</p>", guard.profile.role))
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
