use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use service::listings::session::UserId;

/// Cookie holding the identity token issued by the login service.
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

/// Token claims; `uid` carries the numeric user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: String,
    pub exp: usize,
}

/// Verified user id carried by `token`, or `None` when the token is
/// malformed, expired or signed with another key.
pub fn verify_token(cfg: &ServerAuthConfig, token: &str) -> Option<UserId> {
    let key = DecodingKey::from_secret(cfg.jwt_secret.as_bytes());
    match decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256)) {
        Ok(data) => data.claims.uid.parse::<i32>().ok().map(UserId),
        Err(e) => {
            debug!(error = %e, "rejected auth token");
            None
        }
    }
}

/// Read `Authorization: Bearer <token>`, falling back to the auth cookie.
pub fn token_from_request(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    bearer.or_else(|| jar.get(AUTH_COOKIE).map(|c| c.value().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;
    use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};

    fn cfg() -> ServerAuthConfig {
        ServerAuthConfig { jwt_secret: "test-secret".into() }
    }

    fn issue_token(cfg: &ServerAuthConfig, user: UserId, subject: &str, ttl: chrono::Duration) -> jsonwebtoken::errors::Result<String> {
        let exp = (chrono::Utc::now() + ttl).timestamp() as usize;
        let claims = Claims { sub: subject.to_string(), uid: user.to_string(), exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()))
    }

    #[test]
    fn issued_token_round_trips_user_id() {
        let token = issue_token(&cfg(), UserId(42), "u@e.com", chrono::Duration::hours(1)).unwrap();
        assert_eq!(verify_token(&cfg(), &token), Some(UserId(42)));
    }

    #[test]
    fn wrong_secret_and_expired_tokens_are_rejected() {
        let token = issue_token(&cfg(), UserId(1), "u@e.com", chrono::Duration::hours(1)).unwrap();
        let other = ServerAuthConfig { jwt_secret: "other".into() };
        assert_eq!(verify_token(&other, &token), None);

        let expired = issue_token(&cfg(), UserId(1), "u@e.com", chrono::Duration::hours(-2)).unwrap();
        assert_eq!(verify_token(&cfg(), &expired), None);
        assert_eq!(verify_token(&cfg(), "not-a-jwt"), None);
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, "from-cookie"));
        assert_eq!(token_from_request(&headers, &jar).as_deref(), Some("from-cookie"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(token_from_request(&headers, &jar).as_deref(), Some("from-header"));
        assert_eq!(token_from_request(&HeaderMap::new(), &CookieJar::new()), None);
    }
}
