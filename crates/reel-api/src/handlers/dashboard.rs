//! Handlers for `/dashboard` endpoints — the authenticated channel's own
//! aggregates and uploads, published or not.

use axum::extract::State;
use reel_core::{store::MediaStore, user::ChannelStats, video::Video};

use crate::{AppState, auth::CurrentUser, error::ApiError, response::Envelope};

/// `GET /dashboard/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Envelope<ChannelStats>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let stats = state
    .store
    .channel_stats(user.user_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(stats, "Channel stats fetched successfully"))
}

/// `GET /dashboard/videos`
pub async fn videos<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Envelope<Vec<Video>>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let videos = state
    .store
    .videos_by_owner(user.user_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(videos, "Channel videos fetched successfully"))
}
