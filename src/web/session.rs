use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use cookie::time::Duration as CookieDuration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::web::{AppError, AppState};

pub const SESSION_COOKIE: &str = "session";
pub const NOTICES_COOKIE: &str = "_notices";

/// Signed client-held session state.
///
/// A missing cookie, a bad signature, or a payload that does not parse all
/// read as an anonymous session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub username: Option<String>,
}

impl Session {
    pub fn from_jar(jar: &SignedCookieJar) -> Self {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default()
    }

    /// The username of an authenticated session.
    pub fn authenticated_user(&self) -> Option<&str> {
        if self.logged_in {
            self.username.as_deref()
        } else {
            None
        }
    }

    pub fn log_in(&mut self, username: impl Into<String>) {
        self.logged_in = true;
        self.username = Some(username.into());
    }

    /// Only the flag is dropped; `username` stays in the cookie.
    pub fn log_out(&mut self) {
        self.logged_in = false;
    }

    pub fn store(&self, jar: SignedCookieJar, ttl_days: i64) -> SignedCookieJar {
        let payload = match serde_json::to_string(self) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(?err, "failed to encode session");
                return jar;
            }
        };

        let mut cookie = Cookie::new(SESSION_COOKIE, payload);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(CookieDuration::days(ttl_days));
        jar.add(cookie)
    }
}

/// Username of the logged-in caller; rejects anonymous sessions with 401.
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = match SignedCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        match Session::from_jar(&jar).authenticated_user() {
            Some(username) => Ok(Self(username.to_string())),
            None => {
                warn!(path = %parts.uri.path(), "rejected anonymous session");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// One-shot messages carried to the next rendered page.
pub struct Notices;

impl Notices {
    pub fn push(jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
        let mut pending = Self::peek(&jar);
        pending.push(message.into());

        let payload = match serde_json::to_string(&pending) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(?err, "failed to encode notices");
                return jar;
            }
        };

        let mut cookie = Cookie::new(NOTICES_COOKIE, payload);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        jar.add(cookie)
    }

    /// Drains pending notices, removing the cookie when there were any.
    pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<String>) {
        let pending = Self::peek(&jar);
        if pending.is_empty() && jar.get(NOTICES_COOKIE).is_none() {
            return (jar, pending);
        }

        let mut removal = Cookie::new(NOTICES_COOKIE, "");
        removal.set_path("/");
        (jar.remove(removal), pending)
    }

    fn peek(jar: &SignedCookieJar) -> Vec<String> {
        jar.get(NOTICES_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};

    fn jar() -> SignedCookieJar {
        SignedCookieJar::new(Key::generate())
    }

    #[test]
    fn empty_jar_is_anonymous() {
        let session = Session::from_jar(&jar());
        assert_eq!(session, Session::default());
        assert_eq!(session.authenticated_user(), None);
    }

    #[test]
    fn stored_session_reads_back() {
        let mut session = Session::default();
        session.log_in("ab");
        let jar = session.store(jar(), 7);

        let restored = Session::from_jar(&jar);
        assert!(restored.logged_in);
        assert_eq!(restored.authenticated_user(), Some("ab"));
    }

    #[test]
    fn logout_keeps_username() {
        let mut session = Session::default();
        session.log_in("ab");
        session.log_out();

        assert!(!session.logged_in);
        assert_eq!(session.username.as_deref(), Some("ab"));
        assert_eq!(session.authenticated_user(), None);
    }

    #[test]
    fn unsigned_cookie_reads_as_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session={\"logged_in\":true,\"username\":\"ab\"}"),
        );

        let jar = SignedCookieJar::from_headers(&headers, Key::generate());
        assert_eq!(Session::from_jar(&jar), Session::default());
    }

    #[test]
    fn notices_are_drained_once() {
        let jar = Notices::push(jar(), "first");
        let jar = Notices::push(jar, "second");

        let (jar, notices) = Notices::take(jar);
        assert_eq!(notices, ["first", "second"]);

        let (_jar, notices) = Notices::take(jar);
        assert!(notices.is_empty());
    }
}
