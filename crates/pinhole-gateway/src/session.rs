//! Cookie-based sessions.
//!
//! Every request carries a session token in the `session_token` cookie. When
//! the cookie is missing a fresh UUID is issued and set on the response. The
//! token is handed to handlers as a [`SessionToken`] request extension.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn session_middleware(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let existing = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty());

    let (token, issued) = match existing {
        Some(token) => (token, false),
        None => (Uuid::new_v4().to_string(), true),
    };
    request.extensions_mut().insert(SessionToken(token.clone()));

    let response = next.run(request).await;
    if !issued {
        return response;
    }

    debug!("issued new session");
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true);
    (jar.add(cookie), response).into_response()
}
