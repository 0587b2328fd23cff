//! Handlers for `/auth` endpoints: registration, sessions, profile.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/auth/register` | multipart; `avatar` required, `cover_image` optional |
//! | `POST`  | `/auth/login` | body: `{"username"\|"email", "password"}` |
//! | `POST`  | `/auth/logout` | clears the stored refresh token and cookies |
//! | `POST`  | `/auth/refresh-token` | rotates the refresh token |
//! | `GET`   | `/auth/me` | the authenticated user |
//! | `PATCH` | `/auth/password` | body: `{"old_password", "new_password"}` |
//! | `PATCH` | `/auth/avatar`, `/auth/cover-image` | multipart single file |
//! | `GET`   | `/auth/channel/:username` | channel profile + counts |
//! | `GET`   | `/auth/watch-history` | most recently watched first |

use axum::{
  Json,
  extract::{Multipart, Path, State},
  http::{HeaderMap, header::SET_COOKIE},
  response::{AppendHeaders, IntoResponse},
};
use reel_core::{
  store::MediaStore,
  user::{NewUser, User},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{
    ACCESS_COOKIE, CurrentUser, REFRESH_COOKIE, TokenPair, auth_cookie,
    clear_cookie, cookie_value, hash_password, verify_password,
  },
  error::ApiError,
  response::Envelope,
};

use super::{FormData, require_text};

// ─── Register ────────────────────────────────────────────────────────────────

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  multipart: Multipart,
) -> Result<Envelope<User>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut form = FormData::read(multipart).await?;

  let username  = require_text(form.text("username"), "username")?.to_lowercase();
  let email     = require_text(form.text("email"), "email")?.to_lowercase();
  let full_name = require_text(form.text("full_name"), "full_name")?;
  let password  = require_text(form.text("password"), "password")?;

  let (avatar_name, avatar_bytes) = form.require_file("avatar")?;
  let cover = form.take_file("cover_image");

  if state
    .store
    .find_login(&username)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict("username already registered".into()));
  }
  if state
    .store
    .find_login(&email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict("email already registered".into()));
  }

  let password_hash = hash_password(&password)?;

  // Assets land on the media host before the record that references them.
  let avatar_url = state.assets.store(&avatar_name, avatar_bytes).await?;
  let cover_image_url = match cover {
    Some((name, bytes)) => Some(state.assets.store(&name, bytes).await?),
    None => None,
  };

  let user = state
    .store
    .create_user(NewUser {
      username,
      email,
      full_name,
      password_hash,
      avatar_url,
      cover_image_url,
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::created(user, "User registered successfully"))
}

// ─── Login / logout ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: Option<String>,
  pub email:    Option<String>,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionData {
  pub user: User,
  #[serde(flatten)]
  pub tokens: TokenPair,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let identity = body
    .username
    .or(body.email)
    .filter(|s| !s.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("username or email is required".into()))?;

  let record = state
    .store
    .find_login(identity.trim())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("user does not exist".into()))?;

  if !verify_password(&body.password, &record.password_hash) {
    return Err(ApiError::Unauthorized("invalid password".into()));
  }

  let tokens = state.tokens.issue_pair(&record.user)?;
  state
    .store
    .set_refresh_token(record.user.user_id, Some(tokens.refresh_token.clone()))
    .await
    .map_err(ApiError::store)?;

  let cookies = session_cookies(&state, &tokens);
  let data = SessionData { user: record.user, tokens };

  Ok((cookies, Envelope::ok(data, "User logged in successfully")))
}

/// `POST /auth/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .set_refresh_token(user.user_id, None)
    .await
    .map_err(ApiError::store)?;

  let cookies = AppendHeaders([
    (SET_COOKIE, clear_cookie(ACCESS_COOKIE)),
    (SET_COOKIE, clear_cookie(REFRESH_COOKIE)),
  ]);

  Ok((
    cookies,
    Envelope::ok(serde_json::json!({}), "User logged out successfully"),
  ))
}

// ─── Refresh ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
  pub refresh_token: String,
}

/// `POST /auth/refresh-token`
///
/// The presented token must match the one currently stored for the user —
/// issuing a new pair invalidates every previously issued refresh token.
/// The token comes from the `refresh_token` cookie or, failing that, a JSON
/// body; the body is optional, so it is read raw rather than through the
/// `Json` extractor.
pub async fn refresh<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: axum::body::Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let from_body = (!body.is_empty())
    .then(|| serde_json::from_slice::<RefreshBody>(&body).ok())
    .flatten()
    .map(|b| b.refresh_token);

  let presented = cookie_value(&headers, REFRESH_COOKIE)
    .or(from_body)
    .ok_or_else(|| ApiError::Unauthorized("no refresh token presented".into()))?;

  let claims = state
    .tokens
    .verify_refresh(&presented)
    .ok_or_else(|| ApiError::Unauthorized("invalid or expired refresh token".into()))?;

  let record = state
    .store
    .get_user_record(claims.sub)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Unauthorized("token subject no longer exists".into()))?;

  if record.refresh_token.as_deref() != Some(presented.as_str()) {
    return Err(ApiError::Unauthorized("refresh token is no longer valid".into()));
  }

  let tokens = state.tokens.issue_pair(&record.user)?;
  state
    .store
    .set_refresh_token(record.user.user_id, Some(tokens.refresh_token.clone()))
    .await
    .map_err(ApiError::store)?;

  let cookies = session_cookies(&state, &tokens);
  Ok((cookies, Envelope::ok(tokens, "Access token refreshed")))
}

fn session_cookies<S: MediaStore>(
  state: &AppState<S>,
  tokens: &TokenPair,
) -> AppendHeaders<[(axum::http::HeaderName, axum::http::HeaderValue); 2]> {
  AppendHeaders([
    (
      SET_COOKIE,
      auth_cookie(
        ACCESS_COOKIE,
        &tokens.access_token,
        state.config.access_token_ttl_secs,
      ),
    ),
    (
      SET_COOKIE,
      auth_cookie(
        REFRESH_COOKIE,
        &tokens.refresh_token,
        state.config.refresh_token_ttl_secs,
      ),
    ),
  ])
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// `GET /auth/me`
pub async fn me<S>(
  CurrentUser(user): CurrentUser,
) -> Result<Envelope<User>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Envelope::ok(user, "Current user fetched"))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
  pub old_password: String,
  pub new_password: String,
}

/// `PATCH /auth/password`
pub async fn change_password<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<ChangePasswordBody>,
) -> Result<Envelope<serde_json::Value>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let new_password = require_text(Some(body.new_password), "new_password")?;

  let record = state
    .store
    .get_user_record(user.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

  if !verify_password(&body.old_password, &record.password_hash) {
    return Err(ApiError::Unauthorized("invalid password".into()));
  }

  let password_hash = hash_password(&new_password)?;
  state
    .store
    .update_password_hash(user.user_id, password_hash)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(serde_json::json!({}), "Password changed successfully"))
}

/// `PATCH /auth/avatar` — multipart single `avatar` file.
pub async fn update_avatar<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  multipart: Multipart,
) -> Result<Envelope<User>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut form = FormData::read(multipart).await?;
  let (name, bytes) = form.require_file("avatar")?;

  let avatar_url = state.assets.replace(&user.avatar_url, &name, bytes).await?;

  let updated = state
    .store
    .update_avatar(user.user_id, avatar_url)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

  Ok(Envelope::ok(updated, "Avatar updated successfully"))
}

/// `PATCH /auth/cover-image` — multipart single `cover_image` file.
pub async fn update_cover_image<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  multipart: Multipart,
) -> Result<Envelope<User>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut form = FormData::read(multipart).await?;
  let (name, bytes) = form.require_file("cover_image")?;

  let cover_image_url = match &user.cover_image_url {
    Some(old) => state.assets.replace(old, &name, bytes).await?,
    None => state.assets.store(&name, bytes).await?,
  };

  let updated = state
    .store
    .update_cover_image(user.user_id, cover_image_url)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

  Ok(Envelope::ok(updated, "Cover image updated successfully"))
}

/// `GET /auth/channel/:username`
pub async fn channel<S>(
  State(state): State<AppState<S>>,
  CurrentUser(viewer): CurrentUser,
  Path(username): Path<String>,
) -> Result<Envelope<reel_core::user::ChannelProfile>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = state
    .store
    .channel_profile(username.trim(), viewer.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("channel not found".into()))?;

  Ok(Envelope::ok(profile, "Channel profile fetched"))
}

/// `GET /auth/watch-history`
pub async fn watch_history<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Envelope<Vec<reel_core::video::WatchEntry>>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let history = state
    .store
    .watch_history(user.user_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(history, "Watch history fetched"))
}
