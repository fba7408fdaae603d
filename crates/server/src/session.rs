//! Request session: identity from the auth token, flash messages from the
//! `flash` cookie. The cookie holds URL-safe base64 of a JSON list, so its
//! value stays within the cookie-octet character set.

use std::convert::Infallible;

use async_trait::async_trait;
use base64::prelude::*;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;

use service::listings::session::{Flash, Session};

use crate::auth::{token_from_request, verify_token};
use crate::state::ServerState;

pub const FLASH_COOKIE: &str = "flash";

/// The caller's `Session`, built fresh for every request.
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<ServerState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let user = token_from_request(&parts.headers, &jar).and_then(|t| verify_token(&state.auth, &t));
        Ok(CurrentSession(Session::new(user, read_flashes(&jar))))
    }
}

/// Pending flashes from the cookie; an unreadable cookie counts as empty.
pub fn read_flashes(jar: &CookieJar) -> Vec<Flash> {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return Vec::new();
    };
    let decoded: Result<Vec<Flash>, String> = BASE64_URL_SAFE_NO_PAD
        .decode(cookie.value().as_bytes())
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice(&bytes).map_err(|e| e.to_string()));
    match decoded {
        Ok(flashes) => flashes,
        Err(e) => {
            warn!(error = %e, "discarding malformed flash cookie");
            Vec::new()
        }
    }
}

fn flash_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(FLASH_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// Carry `flashes` to the next request.
pub fn store_flashes(jar: CookieJar, flashes: &[Flash]) -> CookieJar {
    if flashes.is_empty() {
        return clear_flashes(jar);
    }
    match serde_json::to_string(flashes) {
        Ok(json) => jar.add(flash_cookie(BASE64_URL_SAFE_NO_PAD.encode(json))),
        Err(e) => {
            warn!(error = %e, "failed to encode flash messages");
            jar
        }
    }
}

/// Drop the flash cookie once its messages have been shown.
pub fn clear_flashes(jar: CookieJar) -> CookieJar {
    if jar.get(FLASH_COOKIE).is_none() {
        return jar;
    }
    jar.remove(flash_cookie(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::listings::session::FlashKind;

    #[test]
    fn stored_flashes_read_back() {
        let flashes = vec![Flash { kind: FlashKind::Success, message: "Listing created successfully".into() }];
        let jar = store_flashes(CookieJar::new(), &flashes);
        assert_eq!(read_flashes(&jar), flashes);
    }

    #[test]
    fn cookie_value_is_cookie_safe() {
        let flashes = vec![Flash { kind: FlashKind::Error, message: r#"bad; "quoted", value=1"#.into() }];
        let jar = store_flashes(CookieJar::new(), &flashes);
        let value = jar.get(FLASH_COOKIE).expect("flash cookie").value().to_string();
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'), "{value}");

        let header = Cookie::new(FLASH_COOKIE, value).to_string();
        let reread = CookieJar::from_headers(&{
            let mut headers = axum::http::HeaderMap::new();
            headers.insert(axum::http::header::COOKIE, header.parse().expect("header value"));
            headers
        });
        assert_eq!(read_flashes(&reread), flashes);
    }

    #[test]
    fn malformed_cookie_reads_as_empty() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "{not json"));
        assert!(read_flashes(&jar).is_empty());
        let not_json = BASE64_URL_SAFE_NO_PAD.encode("not json");
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, not_json));
        assert!(read_flashes(&jar).is_empty());
        assert!(read_flashes(&CookieJar::new()).is_empty());
    }

    #[test]
    fn clearing_removes_the_cookie() {
        let flashes = vec![Flash { kind: FlashKind::Error, message: "no".into() }];
        let jar = clear_flashes(store_flashes(CookieJar::new(), &flashes));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }
}
