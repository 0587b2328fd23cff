//! Handlers for `/subscriptions` endpoints.

use axum::extract::{Path, State};
use reel_core::{
  relation::{SubscriptionEntry, ToggleState},
  store::MediaStore,
};
use serde::Serialize;

use crate::{AppState, auth::CurrentUser, error::ApiError, response::Envelope};

use super::parse_id;

#[derive(Debug, Serialize)]
pub struct ToggleData {
  pub state: ToggleState,
}

/// `PATCH /subscriptions/channel/:channel_id` — subscribe/unsubscribe.
pub async fn toggle<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(channel_id): Path<String>,
) -> Result<Envelope<ToggleData>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let channel_id = parse_id(&channel_id, "channel")?;

  if channel_id == user.user_id {
    return Err(ApiError::BadRequest("cannot subscribe to your own channel".into()));
  }

  state
    .store
    .get_user(channel_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("channel not found".into()))?;

  let toggled = state
    .store
    .toggle_subscription(user.user_id, channel_id)
    .await
    .map_err(ApiError::store)?;

  let data = ToggleData { state: toggled };
  Ok(if toggled.is_on() {
    Envelope::created(data, "Subscribed successfully")
  } else {
    Envelope::ok(data, "Unsubscribed successfully")
  })
}

/// `GET /subscriptions/channel/:channel_id` — the channel's subscribers.
pub async fn channel_subscribers<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
  Path(channel_id): Path<String>,
) -> Result<Envelope<Vec<SubscriptionEntry>>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let channel_id = parse_id(&channel_id, "channel")?;

  state
    .store
    .get_user(channel_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("channel not found".into()))?;

  let subscribers = state
    .store
    .channel_subscribers(channel_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(subscribers, "Subscribers fetched successfully"))
}

/// `GET /subscriptions/user/:subscriber_id` — channels the user follows.
pub async fn subscribed_channels<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
  Path(subscriber_id): Path<String>,
) -> Result<Envelope<Vec<SubscriptionEntry>>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subscriber_id = parse_id(&subscriber_id, "subscriber")?;

  state
    .store
    .get_user(subscriber_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

  let channels = state
    .store
    .subscribed_channels(subscriber_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(channels, "Subscribed channels fetched successfully"))
}
