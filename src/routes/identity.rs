//! Identity cookie: the per-browser user context sessions are keyed by.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::services::session;

pub const IDENTITY_COOKIE: &str = "yoozak_identity";

/// Browsers cap cookie lifetime at 400 days.
const IDENTITY_MAX_AGE_DAYS: i64 = 400;

/// Identity resolved from the request cookie, or freshly minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    /// True when the request carried no usable cookie.
    pub fresh: bool,
}

impl Identity {
    #[must_use]
    pub fn from_jar(jar: &CookieJar) -> Self {
        match jar.get(IDENTITY_COOKIE).map(Cookie::value) {
            Some(id) if session::is_valid_identity(id) => Self { id: id.to_owned(), fresh: false },
            _ => Self { id: session::generate_identity(), fresh: true },
        }
    }

    /// Attach the identity cookie when it was minted for this request.
    #[must_use]
    pub fn persist(&self, jar: CookieJar, secure: bool) -> CookieJar {
        if !self.fresh {
            return jar;
        }
        let cookie = Cookie::build((IDENTITY_COOKIE, self.id.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .max_age(Duration::days(IDENTITY_MAX_AGE_DAYS));
        jar.add(cookie)
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
