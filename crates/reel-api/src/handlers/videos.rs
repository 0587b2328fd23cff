//! Handlers for `/videos` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/videos` | `?page&limit&query&sort_by&sort_type&user_id` |
//! | `POST`  | `/videos` | multipart: `video_file`, `thumbnail`, `title`, `description`, optional `duration` |
//! | `GET`   | `/videos/:id` | published only, owner-joined |
//! | `PATCH` | `/videos/:id` | owner only; title + description |
//! | `DELETE`| `/videos/:id` | owner only; cascades, then drops assets |
//! | `PATCH` | `/videos/:id/thumbnail` | owner only; multipart single file |
//! | `PATCH` | `/videos/toggle/publish/:id` | owner only |
//! | `PATCH` | `/videos/:id/view` | idempotent per viewer |

use axum::{
  Json,
  extract::{Multipart, Path, Query, State},
};
use reel_core::{
  page::{Page, PageRequest, SortDirection, VideoQuery, VideoSortKey},
  store::MediaStore,
  video::{NewVideo, Video, VideoView},
};
use serde::Deserialize;

use crate::{
  AppState, auth::CurrentUser, error::ApiError, response::Envelope,
};

use super::{FormData, ensure_owner, parse_id, require_text};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub page:      Option<u32>,
  pub limit:     Option<u32>,
  /// Case-insensitive substring over title and description.
  pub query:     Option<String>,
  /// One of `created_at`, `views`, `duration`, `title`.
  pub sort_by:   Option<String>,
  /// `asc` or `desc`.
  pub sort_type: Option<String>,
  /// Restrict to one owner's videos.
  pub user_id:   Option<String>,
}

/// `GET /videos`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Envelope<Page<VideoView>>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let page = PageRequest::new(params.page.unwrap_or(1), params.limit.unwrap_or(10))
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let sort_key = match params.sort_by.as_deref() {
    Some(s) => VideoSortKey::parse(s).map_err(|e| ApiError::BadRequest(e.to_string()))?,
    None => VideoSortKey::default(),
  };
  let direction = match params.sort_type.as_deref() {
    Some(s) => {
      SortDirection::parse(s).map_err(|e| ApiError::BadRequest(e.to_string()))?
    }
    None => SortDirection::default(),
  };

  let owner_id = params
    .user_id
    .as_deref()
    .map(|s| parse_id(s, "user"))
    .transpose()?;

  let query = VideoQuery {
    text: params.query.filter(|q| !q.trim().is_empty()),
    owner_id,
    sort_key,
    direction,
    page,
  };

  let videos = state
    .store
    .list_videos(query)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(videos, "Videos fetched successfully"))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /videos`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  multipart: Multipart,
) -> Result<Envelope<Video>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut form = FormData::read(multipart).await?;

  let title       = require_text(form.text("title"), "title")?;
  let description = require_text(form.text("description"), "description")?;
  let duration_secs = match form.text("duration") {
    Some(raw) => raw
      .trim()
      .parse::<f64>()
      .map_err(|_| ApiError::BadRequest("duration must be a number of seconds".into()))?,
    None => 0.0,
  };

  let (video_name, video_bytes) = form.require_file("video_file")?;
  let (thumb_name, thumb_bytes) = form.require_file("thumbnail")?;

  // Both assets are on the media host before the record exists; if the
  // second upload fails the first is rolled back so nothing is orphaned.
  let video_url = state.assets.store(&video_name, video_bytes).await?;
  let thumbnail_url = match state.assets.store(&thumb_name, thumb_bytes).await {
    Ok(url) => url,
    Err(e) => {
      let _ = state.assets.delete(&video_url).await;
      return Err(e.into());
    }
  };

  let video = state
    .store
    .create_video(NewVideo {
      owner_id: user.user_id,
      title,
      description,
      video_url,
      thumbnail_url,
      duration_secs,
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::created(video, "Video published successfully"))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /videos/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<VideoView>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "video")?;

  let video = state
    .store
    .get_video_with_owner(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

  Ok(Envelope::ok(video, "Video fetched successfully"))
}

// ─── Update details ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateDetailsBody {
  pub title:       Option<String>,
  pub description: Option<String>,
}

/// `PATCH /videos/:id`
pub async fn update_details<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
  Json(body): Json<UpdateDetailsBody>,
) -> Result<Envelope<Video>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "video")?;
  let title       = require_text(body.title, "title")?;
  let description = require_text(body.description, "description")?;

  let video = state
    .store
    .get_video(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;
  ensure_owner(video.owner_id, user.user_id, "video")?;

  let updated = state
    .store
    .update_video_details(id, title, description)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

  Ok(Envelope::ok(updated, "Video details updated successfully"))
}

// ─── Thumbnail ───────────────────────────────────────────────────────────────

/// `PATCH /videos/:id/thumbnail` — multipart single `thumbnail` file.
pub async fn update_thumbnail<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
  multipart: Multipart,
) -> Result<Envelope<Video>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "video")?;

  let mut form = FormData::read(multipart).await?;
  let (name, bytes) = form.require_file("thumbnail")?;

  let video = state
    .store
    .get_video(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;
  ensure_owner(video.owner_id, user.user_id, "video")?;

  let thumbnail_url = state.assets.replace(&video.thumbnail_url, &name, bytes).await?;

  let updated = state
    .store
    .update_video_thumbnail(id, thumbnail_url)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

  Ok(Envelope::ok(updated, "Thumbnail updated successfully"))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /videos/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<serde_json::Value>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "video")?;

  let video = state
    .store
    .get_video(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;
  ensure_owner(video.owner_id, user.user_id, "video")?;

  if !state.store.delete_video(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound("video not found".into()));
  }

  // Record first, assets after: a leftover media file is recoverable, a
  // record pointing at nothing is not.
  if let Err(e) = state.assets.delete(&video.video_url).await {
    tracing::warn!(url = %video.video_url, error = %e, "failed to delete video asset");
  }
  if let Err(e) = state.assets.delete(&video.thumbnail_url).await {
    tracing::warn!(url = %video.thumbnail_url, error = %e, "failed to delete thumbnail asset");
  }

  Ok(Envelope::ok(serde_json::json!({}), "Video deleted successfully"))
}

// ─── Publish toggle ──────────────────────────────────────────────────────────

/// `PATCH /videos/toggle/publish/:id`
pub async fn toggle_publish<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<Video>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "video")?;

  let video = state
    .store
    .get_video(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;
  ensure_owner(video.owner_id, user.user_id, "video")?;

  let updated = state
    .store
    .toggle_publish(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

  let message = if updated.is_published {
    "Video published"
  } else {
    "Video unpublished"
  };
  Ok(Envelope::ok(updated, message))
}

// ─── View counting ───────────────────────────────────────────────────────────

/// `PATCH /videos/:id/view`
pub async fn record_view<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<Video>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "video")?;

  let (video, counted) = state
    .store
    .record_view(user.user_id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

  let message = if counted {
    "View counted"
  } else {
    "View already counted"
  };
  Ok(Envelope::ok(video, message))
}
