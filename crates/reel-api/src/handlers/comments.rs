//! Handlers for `/comments` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/comments/:video_id` | paginated, author-joined, newest first |
//! | `POST`  | `/comments/:video_id` | body: `{"content"}` |
//! | `PATCH` | `/comments/channel/:comment_id` | owner only |
//! | `DELETE`| `/comments/channel/:comment_id` | owner only |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use reel_core::{
  comment::{Comment, CommentView, NewComment},
  page::{Page, PageRequest},
  store::MediaStore,
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError, response::Envelope};

use super::{ensure_owner, parse_id, require_text};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub page:  Option<u32>,
  pub limit: Option<u32>,
}

/// `GET /comments/:video_id`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
  Path(video_id): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Envelope<Page<CommentView>>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let video_id = parse_id(&video_id, "video")?;
  let page = PageRequest::new(params.page.unwrap_or(1), params.limit.unwrap_or(10))
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  state
    .store
    .get_video(video_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

  let comments = state
    .store
    .comments_for_video(video_id, page)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(comments, "Comments fetched successfully"))
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub content: Option<String>,
}

/// `POST /comments/:video_id`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(video_id): Path<String>,
  Json(body): Json<CommentBody>,
) -> Result<Envelope<Comment>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let video_id = parse_id(&video_id, "video")?;
  let content = require_text(body.content, "content")?;

  state
    .store
    .get_video(video_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

  let comment = state
    .store
    .create_comment(NewComment {
      video_id,
      owner_id: user.user_id,
      content,
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::created(comment, "Comment added successfully"))
}

/// `PATCH /comments/channel/:comment_id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(comment_id): Path<String>,
  Json(body): Json<CommentBody>,
) -> Result<Envelope<Comment>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let comment_id = parse_id(&comment_id, "comment")?;
  let content = require_text(body.content, "content")?;

  let comment = state
    .store
    .get_comment(comment_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("comment not found".into()))?;
  ensure_owner(comment.owner_id, user.user_id, "comment")?;

  let updated = state
    .store
    .update_comment(comment_id, content)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("comment not found".into()))?;

  Ok(Envelope::ok(updated, "Comment updated successfully"))
}

/// `DELETE /comments/channel/:comment_id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(comment_id): Path<String>,
) -> Result<Envelope<serde_json::Value>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let comment_id = parse_id(&comment_id, "comment")?;

  let comment = state
    .store
    .get_comment(comment_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("comment not found".into()))?;
  ensure_owner(comment.owner_id, user.user_id, "comment")?;

  state
    .store
    .delete_comment(comment_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(serde_json::json!({}), "Comment deleted successfully"))
}
