//! Token issuing/verification and the authenticated-user extractor.
//!
//! Access tokens are short-lived HS256 JWTs presented on every request, via
//! either the `access_token` cookie or an `Authorization: Bearer` header.
//! Refresh tokens are long-lived, signed with a separate secret, and valid
//! only while they match the single token stored for the user — issuing a
//! new one invalidates the old.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, HeaderValue, header, request::Parts};
use rand_core::OsRng;
use reel_core::{store::MediaStore, user::User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

// ─── Claims ──────────────────────────────────────────────────────────────────

/// What rides inside an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
  /// Subject — the user id.
  pub sub:      Uuid,
  pub username: String,
  pub email:    String,
  /// Issued at (unix timestamp).
  pub iat:      i64,
  /// Expiration (unix timestamp).
  pub exp:      i64,
}

/// What rides inside a refresh token — the subject only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
  pub sub: Uuid,
  pub iat: i64,
  pub exp: i64,
}

/// An access/refresh pair as returned in response bodies.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
  pub access_token:  String,
  pub refresh_token: String,
}

// ─── Issuer ──────────────────────────────────────────────────────────────────

/// Issues and verifies both token kinds. Shared process-wide.
pub struct TokenIssuer {
  access_encoding:  jsonwebtoken::EncodingKey,
  access_decoding:  jsonwebtoken::DecodingKey,
  refresh_encoding: jsonwebtoken::EncodingKey,
  refresh_decoding: jsonwebtoken::DecodingKey,
  validation:       jsonwebtoken::Validation,
  access_ttl_secs:  i64,
  refresh_ttl_secs: i64,
}

impl TokenIssuer {
  pub fn new(
    access_secret: &str,
    refresh_secret: &str,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
  ) -> Self {
    Self {
      access_encoding:  jsonwebtoken::EncodingKey::from_secret(access_secret.as_bytes()),
      access_decoding:  jsonwebtoken::DecodingKey::from_secret(access_secret.as_bytes()),
      refresh_encoding: jsonwebtoken::EncodingKey::from_secret(refresh_secret.as_bytes()),
      refresh_decoding: jsonwebtoken::DecodingKey::from_secret(refresh_secret.as_bytes()),
      validation:       jsonwebtoken::Validation::default(),
      access_ttl_secs,
      refresh_ttl_secs,
    }
  }

  pub fn issue_access(&self, user: &User) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessClaims {
      sub:      user.user_id,
      username: user.username.clone(),
      email:    user.email.clone(),
      iat:      now,
      exp:      now + self.access_ttl_secs,
    };
    jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &self.access_encoding)
      .map_err(ApiError::store)
  }

  pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let claims = RefreshClaims {
      sub: user_id,
      iat: now,
      exp: now + self.refresh_ttl_secs,
    };
    jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &self.refresh_encoding)
      .map_err(ApiError::store)
  }

  pub fn issue_pair(&self, user: &User) -> Result<TokenPair, ApiError> {
    Ok(TokenPair {
      access_token:  self.issue_access(user)?,
      refresh_token: self.issue_refresh(user.user_id)?,
    })
  }

  /// Verify signature and expiry; returns the claims on success.
  pub fn verify_access(&self, token: &str) -> Option<AccessClaims> {
    jsonwebtoken::decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
      .map(|data| data.claims)
      .ok()
  }

  pub fn verify_refresh(&self, token: &str) -> Option<RefreshClaims> {
    jsonwebtoken::decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
      .map(|data| data.claims)
      .ok()
  }
}

// ─── Cookies ─────────────────────────────────────────────────────────────────

/// Pull one cookie value out of the `Cookie` request header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get(header::COOKIE)?
    .to_str()
    .ok()?
    .split(';')
    .find_map(|pair| {
      let (k, v) = pair.trim().split_once('=')?;
      (k == name).then(|| v.to_owned())
    })
}

/// Build a `Set-Cookie` value for an auth token.
pub fn auth_cookie(name: &str, value: &str, max_age_secs: i64) -> HeaderValue {
  // Token values are base64url, safe to embed unquoted.
  HeaderValue::from_str(&format!(
    "{name}={value}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={max_age_secs}"
  ))
  .expect("cookie value is ascii")
}

/// Build a `Set-Cookie` value that expires the named cookie.
pub fn clear_cookie(name: &str) -> HeaderValue {
  HeaderValue::from_str(&format!(
    "{name}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0"
  ))
  .expect("cookie value is ascii")
}

/// The access credential presented on a request: the `access_token` cookie,
/// or a `Bearer` Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
  if let Some(token) = cookie_value(headers, ACCESS_COOKIE) {
    return Some(token);
  }
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::to_owned)
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The resolved caller identity. Present in a handler signature means the
/// request was authenticated; any failure short-circuits with 401 before
/// the handler runs.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or_else(|| ApiError::Unauthorized("no access token presented".into()))?;

    let claims = state
      .tokens
      .verify_access(&token)
      .ok_or_else(|| ApiError::Unauthorized("invalid or expired access token".into()))?;

    let user = state
      .store
      .get_user(claims.sub)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::Unauthorized("token subject no longer exists".into()))?;

    Ok(CurrentUser(user))
  }
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::PasswordHash(e.to_string()))
}

/// Constant-time verification against a stored PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn issuer() -> TokenIssuer {
    TokenIssuer::new("access-secret", "refresh-secret", 900, 3600)
  }

  fn user() -> User {
    User {
      user_id:         Uuid::new_v4(),
      username:        "alice".into(),
      email:           "alice@example.com".into(),
      full_name:       "Alice Liddell".into(),
      avatar_url:      "http://media.test/a.png".into(),
      cover_image_url: None,
      created_at:      Utc::now(),
      updated_at:      Utc::now(),
    }
  }

  #[test]
  fn access_roundtrip() {
    let issuer = issuer();
    let user = user();
    let token = issuer.issue_access(&user).unwrap();
    let claims = issuer.verify_access(&token).unwrap();
    assert_eq!(claims.sub, user.user_id);
    assert_eq!(claims.username, "alice");
  }

  #[test]
  fn token_kinds_do_not_cross_verify() {
    let issuer = issuer();
    let user = user();
    let access = issuer.issue_access(&user).unwrap();
    let refresh = issuer.issue_refresh(user.user_id).unwrap();
    assert!(issuer.verify_refresh(&access).is_none());
    assert!(issuer.verify_access(&refresh).is_none());
  }

  #[test]
  fn wrong_secret_rejected() {
    let user = user();
    let token = issuer().issue_access(&user).unwrap();
    let other = TokenIssuer::new("other", "other", 900, 3600);
    assert!(other.verify_access(&token).is_none());
  }

  #[test]
  fn expired_token_rejected() {
    // Expired two minutes ago, past the default leeway.
    let issuer = TokenIssuer::new("a", "r", -120, -120);
    let token = issuer.issue_access(&user()).unwrap();
    assert!(issuer.verify_access(&token).is_none());
  }

  #[test]
  fn cookie_parsing() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::COOKIE,
      HeaderValue::from_static("theme=dark; access_token=abc.def.ghi; other=1"),
    );
    assert_eq!(cookie_value(&headers, ACCESS_COOKIE).as_deref(), Some("abc.def.ghi"));
    assert!(cookie_value(&headers, REFRESH_COOKIE).is_none());
  }

  #[test]
  fn bearer_header_fallback() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_static("Bearer abc.def.ghi"),
    );
    assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

    let empty = HeaderMap::new();
    assert!(bearer_token(&empty).is_none());
  }

  #[test]
  fn password_hash_roundtrip() {
    let phc = hash_password("hunter2").unwrap();
    assert!(verify_password("hunter2", &phc));
    assert!(!verify_password("hunter3", &phc));
    assert!(!verify_password("hunter2", "not-a-phc-string"));
  }
}
