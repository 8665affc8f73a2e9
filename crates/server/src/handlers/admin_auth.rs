//! Admin login and logout
//!
//! Password check against configuration, then a session cookie. The
//! redirect target after login is honored only when it points back into
//! the admin area, so the login form cannot be used as an open redirect.

use axum::{extract::State, response::Redirect, Form};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::session::{clear_session_cookie, session_cookie};
use crate::AppState;

const LOGIN_ERROR: &str = "/admin/login?error=1";
const DEFAULT_TARGET: &str = "/admin";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> (CookieJar, Redirect) {
    let expected = match &state.config.admin.password {
        Some(password) if !password.is_empty() => password,
        _ => {
            tracing::error!("Admin password not configured; login disabled");
            return (
                jar.add(clear_session_cookie(&state.config.admin)),
                Redirect::to(LOGIN_ERROR),
            );
        }
    };

    if form.password != *expected {
        tracing::warn!("Admin login failed");
        return (
            jar.add(clear_session_cookie(&state.config.admin)),
            Redirect::to(LOGIN_ERROR),
        );
    }

    let target = form
        .redirect_to
        .filter(|t| t.starts_with("/admin"))
        .unwrap_or_else(|| DEFAULT_TARGET.to_string());

    tracing::info!("Admin login succeeded");
    (
        jar.add(session_cookie(&state.config.admin)),
        Redirect::to(&target),
    )
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    (
        jar.add(clear_session_cookie(&state.config.admin)),
        Redirect::to("/admin?logged_out=1"),
    )
}
