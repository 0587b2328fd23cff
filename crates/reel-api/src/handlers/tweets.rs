//! Handlers for `/tweets` endpoints.

use axum::{
  Json,
  extract::{Path, State},
};
use reel_core::{
  store::MediaStore,
  tweet::{NewTweet, Tweet, TweetView},
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError, response::Envelope};

use super::{ensure_owner, parse_id, require_text};

#[derive(Debug, Deserialize)]
pub struct TweetBody {
  pub content: Option<String>,
}

/// `POST /tweets`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<TweetBody>,
) -> Result<Envelope<Tweet>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let content = require_text(body.content, "content")?;

  let tweet = state
    .store
    .create_tweet(NewTweet { owner_id: user.user_id, content })
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::created(tweet, "Tweet created successfully"))
}

/// `GET /tweets/user/:user_id`
pub async fn by_user<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
  Path(user_id): Path<String>,
) -> Result<Envelope<Vec<TweetView>>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user_id = parse_id(&user_id, "user")?;

  state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

  let tweets = state
    .store
    .tweets_by_user(user_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(tweets, "User tweets fetched successfully"))
}

/// `PATCH /tweets/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
  Json(body): Json<TweetBody>,
) -> Result<Envelope<Tweet>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "tweet")?;
  let content = require_text(body.content, "content")?;

  let tweet = state
    .store
    .get_tweet(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("tweet not found".into()))?;
  ensure_owner(tweet.owner_id, user.user_id, "tweet")?;

  let updated = state
    .store
    .update_tweet(id, content)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("tweet not found".into()))?;

  Ok(Envelope::ok(updated, "Tweet updated successfully"))
}

/// `DELETE /tweets/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<serde_json::Value>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "tweet")?;

  let tweet = state
    .store
    .get_tweet(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("tweet not found".into()))?;
  ensure_owner(tweet.owner_id, user.user_id, "tweet")?;

  state
    .store
    .delete_tweet(id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(serde_json::json!({}), "Tweet deleted successfully"))
}
