use actix_web::cookie::{Cookie, time::Duration as CookieDuration};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::types::{AuthError, SessionClaims};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "trailside.sid";

/// Sessions (and their cookies) live for a week.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Codec for the signed session-id cookie.
///
/// The cookie value is an HS256 token whose subject is the session id, so a
/// tampered cookie fails verification instead of resolving to someone else's
/// session.
#[derive(Clone)]
pub struct SessionCookie {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionCookie {
    /// Creates a codec signing with the given secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Creates a codec from the `SESSION_SECRET` environment variable.
    pub fn from_env() -> Self {
        let secret = std::env::var("SESSION_SECRET")
            .unwrap_or_else(|_| "thisshouldbeabettersecret".to_string());
        Self::new(&secret)
    }

    /// Signs a session id into a cookie value.
    pub fn sign(&self, session_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::days(SESSION_TTL_DAYS))
            .ok_or_else(|| AuthError::Validation("Session expiry out of range".to_string()))?
            .timestamp() as usize;

        let claims = SessionClaims {
            sub: session_id.to_string(),
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies a cookie value and extracts the session id.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let token_data = decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Uuid::parse_str(&token_data.claims.sub).map_err(|_| {
            AuthError::Cookie(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ))
        })
    }

    /// Builds the HTTP-only session cookie for a session id.
    pub fn build_cookie(&self, session_id: &Uuid) -> Result<Cookie<'static>, AuthError> {
        let token = self.sign(session_id)?;
        Ok(Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .max_age(CookieDuration::days(SESSION_TTL_DAYS))
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_round_trip() {
        let codec = SessionCookie::new("test-secret");
        let session_id = Uuid::new_v4();

        let token = codec.sign(&session_id).unwrap();
        assert_eq!(codec.verify(&token).unwrap(), session_id);
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let codec = SessionCookie::new("test-secret");
        let other = SessionCookie::new("different-secret");
        let token = codec.sign(&Uuid::new_v4()).unwrap();

        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let codec = SessionCookie::new("test-secret");
        assert!(codec.verify("not-a-token").is_err());
    }

    #[test]
    fn test_cookie_is_http_only() {
        let codec = SessionCookie::new("test-secret");
        let cookie = codec.build_cookie(&Uuid::new_v4()).unwrap();

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(7)));
    }
}
