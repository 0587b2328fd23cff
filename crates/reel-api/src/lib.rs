//! HTTP surface for Reel.
//!
//! Exposes an axum [`Router`] backed by any [`reel_core::store::MediaStore`].
//! Every route except `GET /health` requires a valid access token; the
//! media root is served statically under `/media`.

pub mod assets;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod response;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, patch, post},
};
use reel_core::store::MediaStore;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use assets::AssetStore;
use auth::TokenIssuer;
use handlers::{
  comments, dashboard, health, likes, playlists, subscriptions, tweets, users,
  videos,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `REEL_`-prefixed environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  /// Public base URL clients reach this server at; asset URLs are minted
  /// under `{public_base_url}/media`.
  pub public_base_url:        String,
  pub store_path:             PathBuf,
  pub media_dir:              PathBuf,
  #[serde(default = "default_body_limit")]
  pub body_limit_bytes:       usize,
  pub access_token_secret:    String,
  pub refresh_token_secret:   String,
  #[serde(default = "default_access_ttl")]
  pub access_token_ttl_secs:  i64,
  #[serde(default = "default_refresh_ttl")]
  pub refresh_token_ttl_secs: i64,
}

fn default_body_limit() -> usize { 512 * 1024 * 1024 }

fn default_access_ttl() -> i64 { 15 * 60 }

fn default_refresh_ttl() -> i64 { 30 * 24 * 60 * 60 }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: MediaStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenIssuer>,
  pub assets: Arc<AssetStore>,
  pub config: Arc<ServerConfig>,
}

impl<S: MediaStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    let tokens = TokenIssuer::new(
      &config.access_token_secret,
      &config.refresh_token_secret,
      config.access_token_ttl_secs,
      config.refresh_token_ttl_secs,
    );
    let assets = AssetStore::new(
      &config.media_dir,
      format!("{}/media", config.public_base_url.trim_end_matches('/')),
    );
    Self {
      store:  Arc::new(store),
      tokens: Arc::new(tokens),
      assets: Arc::new(assets),
      config: Arc::new(config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let media_dir  = state.config.media_dir.clone();
  let body_limit = state.config.body_limit_bytes;

  Router::new()
    .route("/health", get(health::handler))
    // auth & profile
    .route("/auth/register", post(users::register::<S>))
    .route("/auth/login", post(users::login::<S>))
    .route("/auth/logout", post(users::logout::<S>))
    .route("/auth/refresh-token", post(users::refresh::<S>))
    .route("/auth/me", get(users::me::<S>))
    .route("/auth/password", patch(users::change_password::<S>))
    .route("/auth/avatar", patch(users::update_avatar::<S>))
    .route("/auth/cover-image", patch(users::update_cover_image::<S>))
    .route("/auth/channel/{username}", get(users::channel::<S>))
    .route("/auth/watch-history", get(users::watch_history::<S>))
    // videos
    .route("/videos", get(videos::list::<S>).post(videos::create::<S>))
    .route(
      "/videos/{id}",
      get(videos::get_one::<S>)
        .patch(videos::update_details::<S>)
        .delete(videos::delete::<S>),
    )
    .route("/videos/{id}/thumbnail", patch(videos::update_thumbnail::<S>))
    .route("/videos/toggle/publish/{id}", patch(videos::toggle_publish::<S>))
    .route("/videos/{id}/view", patch(videos::record_view::<S>))
    // likes
    .route("/likes/toggle/video/{id}", post(likes::toggle_video::<S>))
    .route("/likes/toggle/comment/{id}", post(likes::toggle_comment::<S>))
    .route("/likes/toggle/tweet/{id}", post(likes::toggle_tweet::<S>))
    .route("/likes/videos", get(likes::liked_videos::<S>))
    .route("/likes/tweets", get(likes::liked_tweets::<S>))
    // subscriptions
    .route(
      "/subscriptions/channel/{channel_id}",
      patch(subscriptions::toggle::<S>).get(subscriptions::channel_subscribers::<S>),
    )
    .route(
      "/subscriptions/user/{subscriber_id}",
      get(subscriptions::subscribed_channels::<S>),
    )
    // playlists
    .route("/playlists", post(playlists::create::<S>))
    .route("/playlists/user/{user_id}", get(playlists::by_user::<S>))
    .route(
      "/playlists/{id}",
      get(playlists::get_one::<S>)
        .patch(playlists::update::<S>)
        .delete(playlists::delete::<S>),
    )
    .route(
      "/playlists/add/{video_id}/{playlist_id}",
      patch(playlists::add_video::<S>),
    )
    .route(
      "/playlists/remove/{video_id}/{playlist_id}",
      patch(playlists::remove_video::<S>),
    )
    // comments
    .route(
      "/comments/{video_id}",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route(
      "/comments/channel/{comment_id}",
      patch(comments::update::<S>).delete(comments::delete::<S>),
    )
    // tweets
    .route("/tweets", post(tweets::create::<S>))
    .route("/tweets/user/{user_id}", get(tweets::by_user::<S>))
    .route("/tweets/{id}", patch(tweets::update::<S>).delete(tweets::delete::<S>))
    // dashboard
    .route("/dashboard/stats", get(dashboard::stats::<S>))
    .route("/dashboard/videos", get(dashboard::videos::<S>))
    // served media assets
    .nest_service("/media", ServeDir::new(media_dir))
    .layer(TraceLayer::new_for_http())
    .layer(DefaultBodyLimit::max(body_limit))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use reel_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  const BOUNDARY: &str = "reel-test-boundary";

  async fn make_state() -> (AppState<SqliteStore>, tempfile::TempDir) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
      host:                   "127.0.0.1".to_string(),
      port:                   0,
      public_base_url:        "http://localhost:8000".to_string(),
      store_path:             PathBuf::from(":memory:"),
      media_dir:              dir.path().to_path_buf(),
      body_limit_bytes:       32 * 1024 * 1024,
      access_token_secret:    "access-secret".to_string(),
      refresh_token_secret:   "refresh-secret".to_string(),
      access_token_ttl_secs:  900,
      refresh_token_ttl_secs: 86_400,
    };
    (AppState::new(store, config), dir)
  }

  /// Hand-rolled multipart/form-data body.
  fn multipart_body(
    texts: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
  ) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in texts {
      body.extend_from_slice(
        format!(
          "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .as_bytes(),
      );
    }
    for (name, file_name, bytes) in files {
      body.extend_from_slice(
        format!(
          "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
      );
      body.extend_from_slice(bytes);
      body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
  }

  async fn send(
    state: &AppState<SqliteStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: Vec<u8>,
  ) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(ct) = content_type {
      builder = builder.header(header::CONTENT_TYPE, ct);
    }
    let req = builder.body(Body::from(body)).unwrap();

    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      serde_json::Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
  }

  async fn send_json(
    state: &AppState<SqliteStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
  ) -> (StatusCode, serde_json::Value) {
    send(
      state,
      method,
      uri,
      token,
      Some("application/json"),
      body.to_string().into_bytes(),
    )
    .await
  }

  /// Register `name` (multipart with a stub avatar) and log in; returns
  /// `(user, access_token, refresh_token)`.
  async fn register_and_login(
    state: &AppState<SqliteStore>,
    name: &str,
  ) -> (serde_json::Value, String, String) {
    let body = multipart_body(
      &[
        ("username", name),
        ("email", &format!("{name}@example.com")),
        ("full_name", &format!("{name} surname")),
        ("password", "hunter2"),
      ],
      &[("avatar", "avatar.png", b"fake-png")],
    );
    let (status, _) = send(
      state,
      "POST",
      "/auth/register",
      None,
      Some(&format!("multipart/form-data; boundary={BOUNDARY}")),
      body,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send_json(
      state,
      "POST",
      "/auth/login",
      None,
      serde_json::json!({ "username": name, "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = json["data"].clone();
    let access = data["access_token"].as_str().unwrap().to_owned();
    let refresh = data["refresh_token"].as_str().unwrap().to_owned();
    (data["user"].clone(), access, refresh)
  }

  /// Upload a video titled `title`; returns its id.
  async fn upload_video(
    state: &AppState<SqliteStore>,
    token: &str,
    title: &str,
  ) -> String {
    let body = multipart_body(
      &[("title", title), ("description", "a description"), ("duration", "12.5")],
      &[
        ("video_file", "clip.mp4", b"fake-mp4"),
        ("thumbnail", "thumb.jpg", b"fake-jpg"),
      ],
    );
    let (status, json) = send(
      state,
      "POST",
      "/videos",
      Some(token),
      Some(&format!("multipart/form-data; boundary={BOUNDARY}")),
      body,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["video_id"].as_str().unwrap().to_owned()
  }

  // ── Health & auth gate ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_needs_no_auth() {
    let (state, _dir) = make_state().await;
    let (status, json) = send(&state, "GET", "/health", None, None, vec![]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["statusCode"], 200);
  }

  #[tokio::test]
  async fn unauthenticated_requests_get_the_error_envelope() {
    let (state, _dir) = make_state().await;
    let (status, json) = send(&state, "GET", "/videos", None, None, vec![]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["statusCode"], 401);
    assert!(json["data"].is_null());
    assert!(json["errors"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn garbage_token_is_rejected() {
    let (state, _dir) = make_state().await;
    let (status, _) =
      send(&state, "GET", "/auth/me", Some("not.a.jwt"), None, vec![]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Registration & sessions ────────────────────────────────────────────────

  #[tokio::test]
  async fn register_login_me_roundtrip() {
    let (state, _dir) = make_state().await;
    let (user, access, _refresh) = register_and_login(&state, "alice").await;
    assert_eq!(user["username"], "alice");

    let (status, json) =
      send(&state, "GET", "/auth/me", Some(&access), None, vec![]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["username"], "alice");
  }

  #[tokio::test]
  async fn credentials_never_leak_into_responses() {
    let (state, _dir) = make_state().await;
    let (_user, access, _refresh) = register_and_login(&state, "alice").await;

    let (_, json) = send(&state, "GET", "/auth/me", Some(&access), None, vec![]).await;
    let rendered = json.to_string();
    assert!(!rendered.contains("password"), "{rendered}");
    assert!(!rendered.contains("$argon2"), "{rendered}");
  }

  #[tokio::test]
  async fn duplicate_email_registration_conflicts() {
    let (state, _dir) = make_state().await;
    register_and_login(&state, "alice").await;

    let body = multipart_body(
      &[
        ("username", "alice2"),
        ("email", "alice@example.com"),
        ("full_name", "Second Alice"),
        ("password", "hunter2"),
      ],
      &[("avatar", "avatar.png", b"fake-png")],
    );
    let (status, json) = send(
      &state,
      "POST",
      "/auth/register",
      None,
      Some(&format!("multipart/form-data; boundary={BOUNDARY}")),
      body,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);

    // No second account: the new username cannot log in.
    let (status, _) = send_json(
      &state,
      "POST",
      "/auth/login",
      None,
      serde_json::json!({ "username": "alice2", "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn wrong_password_is_unauthorized() {
    let (state, _dir) = make_state().await;
    register_and_login(&state, "alice").await;

    let (status, _) = send_json(
      &state,
      "POST",
      "/auth/login",
      None,
      serde_json::json!({ "username": "alice", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn refresh_rotation_invalidates_the_old_token() {
    let (state, _dir) = make_state().await;
    let (_user, _access, refresh) = register_and_login(&state, "alice").await;

    let (status, json) = send_json(
      &state,
      "POST",
      "/auth/refresh-token",
      None,
      serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_refresh = json["data"]["refresh_token"].as_str().unwrap().to_owned();
    assert_ne!(new_refresh, refresh);

    // The superseded token no longer works…
    let (status, _) = send_json(
      &state,
      "POST",
      "/auth/refresh-token",
      None,
      serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // …but the replacement does.
    let (status, _) = send_json(
      &state,
      "POST",
      "/auth/refresh-token",
      None,
      serde_json::json!({ "refresh_token": new_refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn login_sets_http_only_cookies() {
    let (state, _dir) = make_state().await;
    register_and_login(&state, "alice").await;

    let req = Request::builder()
      .method("POST")
      .uri("/auth/login")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(
        serde_json::json!({ "username": "alice", "password": "hunter2" }).to_string(),
      ))
      .unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();

    let cookies: Vec<_> = resp
      .headers()
      .get_all(header::SET_COOKIE)
      .iter()
      .map(|v| v.to_str().unwrap().to_owned())
      .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly") && c.contains("Secure")));
  }

  // ── Videos ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn upload_listing_and_search() {
    let (state, _dir) = make_state().await;
    let (_user, access, _) = register_and_login(&state, "alice").await;

    upload_video(&state, &access, "Cats at play").await;
    upload_video(&state, &access, "Dogs running").await;

    let (status, json) =
      send(&state, "GET", "/videos", Some(&access), None, vec![]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["items"][0]["owner"]["username"], "alice");

    let (status, json) =
      send(&state, "GET", "/videos?query=cats", Some(&access), None, vec![]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["title"], "Cats at play");
  }

  #[tokio::test]
  async fn unknown_sort_key_is_rejected() {
    let (state, _dir) = make_state().await;
    let (_user, access, _) = register_and_login(&state, "alice").await;

    let (status, json) = send(
      &state,
      "GET",
      "/videos?sort_by=owner_id",
      Some(&access),
      None,
      vec![],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
  }

  #[tokio::test]
  async fn malformed_id_is_bad_request() {
    let (state, _dir) = make_state().await;
    let (_user, access, _) = register_and_login(&state, "alice").await;

    let (status, _) =
      send(&state, "GET", "/videos/not-a-uuid", Some(&access), None, vec![]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn non_owner_mutations_are_forbidden() {
    let (state, _dir) = make_state().await;
    let (_alice, alice_token, _) = register_and_login(&state, "alice").await;
    let (_bob, bob_token, _) = register_and_login(&state, "bob").await;

    let video_id = upload_video(&state, &alice_token, "Cats at play").await;

    let (status, _) = send_json(
      &state,
      "PATCH",
      &format!("/videos/{video_id}"),
      Some(&bob_token),
      serde_json::json!({ "title": "hijacked", "description": "still valid" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
      &state,
      "DELETE",
      &format!("/videos/{video_id}"),
      Some(&bob_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner can still edit.
    let (status, _) = send_json(
      &state,
      "PATCH",
      &format!("/videos/{video_id}"),
      Some(&alice_token),
      serde_json::json!({ "title": "renamed", "description": "desc" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn view_counting_is_idempotent_over_http() {
    let (state, _dir) = make_state().await;
    let (_alice, alice_token, _) = register_and_login(&state, "alice").await;
    let (_bob, bob_token, _) = register_and_login(&state, "bob").await;

    let video_id = upload_video(&state, &alice_token, "Cats at play").await;

    let uri = format!("/videos/{video_id}/view");
    let (status, json) = send(&state, "PATCH", &uri, Some(&bob_token), None, vec![]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["views"], 1);

    let (status, json) = send(&state, "PATCH", &uri, Some(&bob_token), None, vec![]).await;
    assert_eq!(status, StatusCode::OK, "repeat view still succeeds");
    assert_eq!(json["data"]["views"], 1, "counter unchanged");

    let (_, json) =
      send(&state, "GET", "/auth/watch-history", Some(&bob_token), None, vec![]).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
  }

  // ── Likes & subscriptions ──────────────────────────────────────────────────

  #[tokio::test]
  async fn like_toggle_over_http() {
    let (state, _dir) = make_state().await;
    let (_user, access, _) = register_and_login(&state, "alice").await;
    let video_id = upload_video(&state, &access, "Cats at play").await;

    let uri = format!("/likes/toggle/video/{video_id}");
    let (status, json) = send(&state, "POST", &uri, Some(&access), None, vec![]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["state"], "on");

    let (_, json) = send(&state, "GET", "/likes/videos", Some(&access), None, vec![]).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (status, json) = send(&state, "POST", &uri, Some(&access), None, vec![]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["state"], "off");

    let (_, json) = send(&state, "GET", "/likes/videos", Some(&access), None, vec![]).await;
    assert!(json["data"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn liking_a_missing_video_is_not_found() {
    let (state, _dir) = make_state().await;
    let (_user, access, _) = register_and_login(&state, "alice").await;

    let uri = format!("/likes/toggle/video/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&state, "POST", &uri, Some(&access), None, vec![]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn subscription_toggle_and_self_subscription_guard() {
    let (state, _dir) = make_state().await;
    let (alice, alice_token, _) = register_and_login(&state, "alice").await;
    let (bob, bob_token, _) = register_and_login(&state, "bob").await;
    let bob_id = bob["user_id"].as_str().unwrap();
    let alice_id = alice["user_id"].as_str().unwrap();

    let (status, json) = send(
      &state,
      "PATCH",
      &format!("/subscriptions/channel/{bob_id}"),
      Some(&alice_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["state"], "on");

    let (_, json) = send(
      &state,
      "GET",
      &format!("/subscriptions/channel/{bob_id}"),
      Some(&bob_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(json["data"][0]["username"], "alice");

    let (_, json) = send(
      &state,
      "GET",
      &format!("/subscriptions/user/{alice_id}"),
      Some(&alice_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(json["data"][0]["username"], "bob");

    let (status, _) = send(
      &state,
      "PATCH",
      &format!("/subscriptions/channel/{alice_id}"),
      Some(&alice_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Comments ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn comment_flow_with_ownership() {
    let (state, _dir) = make_state().await;
    let (_alice, alice_token, _) = register_and_login(&state, "alice").await;
    let (_bob, bob_token, _) = register_and_login(&state, "bob").await;
    let video_id = upload_video(&state, &alice_token, "Cats at play").await;

    let (status, json) = send_json(
      &state,
      "POST",
      &format!("/comments/{video_id}"),
      Some(&bob_token),
      serde_json::json!({ "content": "nice video" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = json["data"]["comment_id"].as_str().unwrap().to_owned();

    // Listing joins the author profile.
    let (_, json) = send(
      &state,
      "GET",
      &format!("/comments/{video_id}"),
      Some(&alice_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["owner"]["username"], "bob");

    // Only the author may edit or delete.
    let (status, _) = send_json(
      &state,
      "PATCH",
      &format!("/comments/channel/{comment_id}"),
      Some(&alice_token),
      serde_json::json!({ "content": "edited by a stranger" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
      &state,
      "PATCH",
      &format!("/comments/channel/{comment_id}"),
      Some(&bob_token),
      serde_json::json!({ "content": "edited" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
      &state,
      "DELETE",
      &format!("/comments/channel/{comment_id}"),
      Some(&bob_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  // ── Playlists ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn playlist_flow_over_http() {
    let (state, _dir) = make_state().await;
    let (_alice, alice_token, _) = register_and_login(&state, "alice").await;
    let (_bob, bob_token, _) = register_and_login(&state, "bob").await;
    let video_id = upload_video(&state, &alice_token, "Cats at play").await;

    let (status, json) = send_json(
      &state,
      "POST",
      "/playlists",
      Some(&alice_token),
      serde_json::json!({ "name": "favs", "description": "favorites" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let playlist_id = json["data"]["playlist_id"].as_str().unwrap().to_owned();

    let (status, json) = send(
      &state,
      "PATCH",
      &format!("/playlists/add/{video_id}/{playlist_id}"),
      Some(&alice_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["videos"].as_array().unwrap().len(), 1);

    // Membership is owner-gated.
    let (status, _) = send(
      &state,
      "PATCH",
      &format!("/playlists/remove/{video_id}/{playlist_id}"),
      Some(&bob_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(
      &state,
      "GET",
      &format!("/playlists/{playlist_id}"),
      Some(&bob_token),
      None,
      vec![],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "favs");
  }

  // ── Dashboard ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dashboard_stats_over_http() {
    let (state, _dir) = make_state().await;
    let (_alice, alice_token, _) = register_and_login(&state, "alice").await;
    let (_bob, bob_token, _) = register_and_login(&state, "bob").await;

    let video_id = upload_video(&state, &alice_token, "Cats at play").await;
    send(
      &state,
      "PATCH",
      &format!("/videos/{video_id}/view"),
      Some(&bob_token),
      None,
      vec![],
    )
    .await;

    let (status, json) =
      send(&state, "GET", "/dashboard/stats", Some(&alice_token), None, vec![]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_videos"], 1);
    assert_eq!(json["data"]["total_views"], 1);

    let (_, json) =
      send(&state, "GET", "/dashboard/videos", Some(&alice_token), None, vec![]).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
  }
}
