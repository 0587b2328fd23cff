//! Playlist — a named, ordered collection of videos.
//!
//! Membership is a relation keyed by (playlist, video), not an id array
//! embedded in the playlist row; add and remove are single-row operations
//! and a video appears in a playlist at most once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
  pub playlist_id: Uuid,
  pub owner_id:    Uuid,
  pub name:        String,
  pub description: String,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::MediaStore::create_playlist`].
#[derive(Debug, Clone)]
pub struct NewPlaylist {
  pub owner_id:    Uuid,
  pub name:        String,
  pub description: String,
}

/// A playlist with its member videos materialised, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistView {
  #[serde(flatten)]
  pub playlist: Playlist,
  pub videos:   Vec<crate::video::Video>,
}
