//! Tweet — a short free-standing post on a user's channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::OwnerProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
  pub tweet_id:   Uuid,
  pub owner_id:   Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::MediaStore::create_tweet`].
#[derive(Debug, Clone)]
pub struct NewTweet {
  pub owner_id: Uuid,
  pub content:  String,
}

/// A tweet joined with its author's public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetView {
  #[serde(flatten)]
  pub tweet: Tweet,
  pub owner: OwnerProfile,
}
