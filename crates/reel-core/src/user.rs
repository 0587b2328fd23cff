//! User — the account and channel identity.
//!
//! A user doubles as a channel: subscriptions point at a user id, and every
//! content entity carries an `owner_id` referencing one. Credential fields
//! live in [`UserRecord`], which is deliberately not serialisable so a
//! password hash or refresh token can never leak into a response body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The public account view. Safe to serialise into responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:         Uuid,
  pub username:        String,
  pub email:           String,
  pub full_name:       String,
  pub avatar_url:      String,
  pub cover_image_url: Option<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// A user row including credential fields. Never serialised.
#[derive(Debug, Clone)]
pub struct UserRecord {
  pub user:          User,
  /// Argon2 PHC string.
  pub password_hash: String,
  /// The single currently-valid refresh token, if any. Replaced wholesale
  /// on every refresh; a presented token that no longer matches is stale.
  pub refresh_token: Option<String>,
}

/// Input to [`crate::store::MediaStore::create_user`].
/// Timestamps and the id are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:        String,
  pub email:           String,
  pub full_name:       String,
  pub password_hash:   String,
  pub avatar_url:      String,
  pub cover_image_url: Option<String>,
}

/// The owner projection joined into content listings: just enough to render
/// an attribution line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerProfile {
  pub user_id:    Uuid,
  pub username:   String,
  pub full_name:  String,
  pub avatar_url: String,
}

/// A channel page: the owner's public profile plus subscription aggregates,
/// computed relative to the viewing user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelProfile {
  pub user:                User,
  pub subscriber_count:    u64,
  pub subscribed_to_count: u64,
  /// Whether the viewer currently subscribes to this channel.
  pub is_subscribed:       bool,
}

/// Aggregate figures for a channel dashboard. Sum fields are zero when the
/// channel owns no videos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStats {
  pub total_likes:       u64,
  pub total_subscribers: u64,
  pub total_videos:      u64,
  pub total_views:       u64,
}
