//! Comment — user text attached to a video.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::OwnerProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub video_id:   Uuid,
  pub owner_id:   Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::MediaStore::create_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub video_id: Uuid,
  pub owner_id: Uuid,
  pub content:  String,
}

/// A comment joined with its author's public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
  #[serde(flatten)]
  pub comment: Comment,
  pub owner:   OwnerProfile,
}
