//! Handlers for `/playlists` endpoints.
//!
//! Membership changes go through the same ownership gate as update/delete:
//! only the playlist owner may add or remove videos.

use axum::{
  Json,
  extract::{Path, State},
};
use reel_core::{
  playlist::{NewPlaylist, Playlist, PlaylistView},
  store::MediaStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError, response::Envelope};

use super::{ensure_owner, parse_id, require_text};

#[derive(Debug, Deserialize)]
pub struct PlaylistBody {
  pub name:        Option<String>,
  pub description: Option<String>,
}

/// `POST /playlists`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<PlaylistBody>,
) -> Result<Envelope<Playlist>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let name        = require_text(body.name, "name")?;
  let description = require_text(body.description, "description")?;

  let playlist = state
    .store
    .create_playlist(NewPlaylist {
      owner_id: user.user_id,
      name,
      description,
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::created(playlist, "Playlist created successfully"))
}

/// `GET /playlists/user/:user_id`
pub async fn by_user<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
  Path(user_id): Path<String>,
) -> Result<Envelope<Vec<PlaylistView>>, ApiError>
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

  let playlists = state
    .store
    .playlists_by_owner(user_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(playlists, "Playlists fetched successfully"))
}

/// `GET /playlists/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<PlaylistView>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "playlist")?;

  let playlist = state
    .store
    .get_playlist_view(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("playlist not found".into()))?;

  Ok(Envelope::ok(playlist, "Playlist fetched successfully"))
}

/// `PATCH /playlists/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
  Json(body): Json<PlaylistBody>,
) -> Result<Envelope<Playlist>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "playlist")?;
  let name        = require_text(body.name, "name")?;
  let description = require_text(body.description, "description")?;

  require_playlist_owner(&state, id, user.user_id).await?;

  let updated = state
    .store
    .update_playlist(id, name, description)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("playlist not found".into()))?;

  Ok(Envelope::ok(updated, "Playlist updated successfully"))
}

/// `DELETE /playlists/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<String>,
) -> Result<Envelope<serde_json::Value>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = parse_id(&id, "playlist")?;

  require_playlist_owner(&state, id, user.user_id).await?;

  state
    .store
    .delete_playlist(id)
    .await
    .map_err(ApiError::store)?;

  Ok(Envelope::ok(serde_json::json!({}), "Playlist deleted successfully"))
}

/// `PATCH /playlists/add/:video_id/:playlist_id`
pub async fn add_video<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<Envelope<PlaylistView>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let video_id    = parse_id(&video_id, "video")?;
  let playlist_id = parse_id(&playlist_id, "playlist")?;

  require_playlist_owner(&state, playlist_id, user.user_id).await?;

  state
    .store
    .get_video(video_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("video not found".into()))?;

  let view = state
    .store
    .add_playlist_video(playlist_id, video_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("playlist not found".into()))?;

  Ok(Envelope::ok(view, "Video added to playlist successfully"))
}

/// `PATCH /playlists/remove/:video_id/:playlist_id`
pub async fn remove_video<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<Envelope<PlaylistView>, ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let video_id    = parse_id(&video_id, "video")?;
  let playlist_id = parse_id(&playlist_id, "playlist")?;

  require_playlist_owner(&state, playlist_id, user.user_id).await?;

  let view = state
    .store
    .remove_playlist_video(playlist_id, video_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("playlist not found".into()))?;

  Ok(Envelope::ok(view, "Video removed from playlist successfully"))
}

async fn require_playlist_owner<S>(
  state: &AppState<S>,
  playlist_id: Uuid,
  actor_id: Uuid,
) -> Result<(), ApiError>
where
  S: MediaStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let playlist = state
    .store
    .get_playlist(playlist_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("playlist not found".into()))?;
  ensure_owner(playlist.owner_id, actor_id, "playlist")
}
