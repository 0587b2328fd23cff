//! Video — the primary content entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::OwnerProfile;

/// A stored video. Asset fields hold public URLs on the media host; the
/// record is only ever created after both uploads have completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
  pub video_id:      Uuid,
  pub owner_id:      Uuid,
  pub title:         String,
  pub description:   String,
  pub video_url:     String,
  pub thumbnail_url: String,
  pub duration_secs: f64,
  pub views:         i64,
  pub is_published:  bool,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Input to [`crate::store::MediaStore::create_video`].
#[derive(Debug, Clone)]
pub struct NewVideo {
  pub owner_id:      Uuid,
  pub title:         String,
  pub description:   String,
  pub video_url:     String,
  pub thumbnail_url: String,
  pub duration_secs: f64,
}

/// A video joined with its owner's public profile — one owner per row by
/// construction (inner join on a NOT NULL foreign key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoView {
  #[serde(flatten)]
  pub video: Video,
  pub owner: OwnerProfile,
}

/// A watch-history entry: the joined video plus when it was first watched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEntry {
  #[serde(flatten)]
  pub view:       VideoView,
  pub watched_at: DateTime<Utc>,
}
