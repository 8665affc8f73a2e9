//! Admin session gate
//!
//! The admin area is protected by a single session cookie set after a
//! successful password login. The gate checks only that the cookie is
//! present and carries the truthy sentinel; everything else about the
//! session lives client-side.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use evalsite_common::config::AdminConfig;
use evalsite_common::errors::AppError;

use crate::AppState;

const SESSION_VALUE: &str = "true";

/// Extractor that admits a request only when the admin session cookie is
/// set. Rejections surface as 401.
pub struct AdminSession;

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        match jar.get(&state.config.admin.session_cookie) {
            Some(cookie) if cookie.value() == SESSION_VALUE => Ok(AdminSession),
            _ => Err(AppError::Unauthorized {
                message: "Admin session required".to_string(),
            }),
        }
    }
}

/// Session cookie set after a successful login: HttpOnly, site-wide,
/// Lax, expiring after the configured max age.
pub fn session_cookie(config: &AdminConfig) -> Cookie<'static> {
    Cookie::build((config.session_cookie.clone(), SESSION_VALUE))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.session_max_age_secs as i64))
        .build()
}

/// Expired replacement cookie used to clear the session.
pub fn clear_session_cookie(config: &AdminConfig) -> Cookie<'static> {
    Cookie::build((config.session_cookie.clone(), ""))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_config() -> AdminConfig {
        AdminConfig {
            password: Some("secret".into()),
            session_cookie: "is_admin".into(),
            session_max_age_secs: 60 * 60 * 8,
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&admin_config());
        assert_eq!(cookie.name(), "is_admin");
        assert_eq!(cookie.value(), "true");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(60 * 60 * 8))
        );
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&admin_config());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
