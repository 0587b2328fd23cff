//! Handlers for `/likes` endpoints.
//!
//! A toggle flips the relation each call: 201 when the like was created,
//! 200 when it was removed. Callers needing a specific state read first.

use axum::extract::{Path, State};
use reel_core::{
  relation::{LikeTarget, ToggleState},
  store::MediaStore,
  tweet::TweetView,
  video::VideoView,
};
use serde::Serialize;

use crate::{AppState, auth::CurrentUser, error::ApiError, response::Envelope};

use super::parse_id;

#[derive(Debug, Serialize)]
pub struct ToggleData {
  pub state: ToggleState,
}

fn toggle_envelope(state: ToggleState, target: &str) -> Envelope<ToggleData> {
  let (on, off) = match target {
    "video" => ("Video liked successfully", "Video unliked successfully"),
    "comment" => ("Comment liked successfully", "Comment unliked successfully"),
    _ => ("Tweet liked successfully", "Tweet unliked successfully"),
  };
  if state.is_on() {
    Envelope::created(ToggleData { state }, on)
  } else {
    Envelope::ok(ToggleData { state }, off)
  }
}

/// `POST /likes/toggle/video/:id`
pub async fn toggle_video<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<ToggleData>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "video")?;

  state
    .store
    .get_video(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

  let toggled = state
    .store
    .toggle_like(user.user_id, LikeTarget::Video, id)
    .await
    .map_err(ApiError::store)?;

  Ok(toggle_envelope(toggled, "video"))
}

/// `POST /likes/toggle/comment/:id`
pub async fn toggle_comment<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<ToggleData>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "comment")?;

  state
    .store
    .get_comment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("comment not found".into()))?;

  let toggled = state
    .store
    .toggle_like(user.user_id, LikeTarget::Comment, id)
    .await
    .map_err(ApiError::store)?;

  Ok(toggle_envelope(toggled, "comment"))
}

/// `POST /likes/toggle/tweet/:id`
pub async fn toggle_tweet<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<ToggleData>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "tweet")?;

  state
    .store
    .get_tweet(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("tweet not found".into()))?;

  let toggled = state
    .store
    .toggle_like(user.user_id, LikeTarget::Tweet, id)
    .await
    .map_err(ApiError::store)?;

  Ok(toggle_envelope(toggled, "tweet"))
}

/// `GET /likes/videos`
pub async fn liked_videos<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Envelope<Vec<VideoView>>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let videos = state
    .store
    .liked_videos(user.user_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(videos, "Liked videos fetched successfully"))
}

/// `GET /likes/tweets`
pub async fn liked_tweets<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Envelope<Vec<TweetView>>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let tweets = state
    .store
    .liked_tweets(user.user_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(tweets, "Liked tweets fetched successfully"))
}
