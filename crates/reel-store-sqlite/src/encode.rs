//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Booleans ride SQLite's native integer
//! affinity. Row-reading helpers live here too so every query that selects
//! the same column list shares one decoder.

use chrono::{DateTime, Utc};
use reel_core::{
  comment::{Comment, CommentView},
  playlist::Playlist,
  relation::SubscriptionEntry,
  tweet::{Tweet, TweetView},
  user::{OwnerProfile, User, UserRecord},
  video::{Video, VideoView, WatchEntry},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Build an unanchored, escaped pattern for `LIKE ?x ESCAPE '\'`.
/// SQLite's LIKE is case-insensitive for ASCII, which is the contract.
pub fn like_pattern(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len() + 2);
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  format!("%{escaped}%")
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row (public columns).
pub struct RawUser {
  pub user_id:         String,
  pub username:        String,
  pub email:           String,
  pub full_name:       String,
  pub avatar_url:      String,
  pub cover_image_url: Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

/// Column list matching [`read_user`]; unprefixed, for queries over `users`
/// alone.
pub const USER_COLS: &str = "user_id, username, email, full_name, avatar_url, \
                             cover_image_url, created_at, updated_at";

pub fn read_user(row: &rusqlite::Row, base: usize) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:         row.get(base)?,
    username:        row.get(base + 1)?,
    email:           row.get(base + 2)?,
    full_name:       row.get(base + 3)?,
    avatar_url:      row.get(base + 4)?,
    cover_image_url: row.get(base + 5)?,
    created_at:      row.get(base + 6)?,
    updated_at:      row.get(base + 7)?,
  })
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:         decode_uuid(&self.user_id)?,
      username:        self.username,
      email:           self.email,
      full_name:       self.full_name,
      avatar_url:      self.avatar_url,
      cover_image_url: self.cover_image_url,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// A `users` row with credential columns appended.
pub struct RawUserRecord {
  pub user:          RawUser,
  pub password_hash: String,
  pub refresh_token: Option<String>,
}

impl RawUserRecord {
  pub fn into_record(self) -> Result<UserRecord> {
    Ok(UserRecord {
      user:          self.user.into_user()?,
      password_hash: self.password_hash,
      refresh_token: self.refresh_token,
    })
  }
}

/// The owner projection joined into content rows.
pub struct RawOwnerProfile {
  pub user_id:    String,
  pub username:   String,
  pub full_name:  String,
  pub avatar_url: String,
}

pub fn read_owner(
  row: &rusqlite::Row,
  base: usize,
) -> rusqlite::Result<RawOwnerProfile> {
  Ok(RawOwnerProfile {
    user_id:    row.get(base)?,
    username:   row.get(base + 1)?,
    full_name:  row.get(base + 2)?,
    avatar_url: row.get(base + 3)?,
  })
}

impl RawOwnerProfile {
  pub fn into_profile(self) -> Result<OwnerProfile> {
    Ok(OwnerProfile {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      full_name:  self.full_name,
      avatar_url: self.avatar_url,
    })
  }
}

/// Raw values read directly from a `videos` row.
pub struct RawVideo {
  pub video_id:      String,
  pub owner_id:      String,
  pub title:         String,
  pub description:   String,
  pub video_url:     String,
  pub thumbnail_url: String,
  pub duration_secs: f64,
  pub views:         i64,
  pub is_published:  bool,
  pub created_at:    String,
  pub updated_at:    String,
}

/// Column list matching [`read_video`], prefixed with the `v` alias.
pub const VIDEO_COLS: &str =
  "v.video_id, v.owner_id, v.title, v.description, v.video_url, \
   v.thumbnail_url, v.duration_secs, v.views, v.is_published, v.created_at, \
   v.updated_at";

pub fn read_video(row: &rusqlite::Row, base: usize) -> rusqlite::Result<RawVideo> {
  Ok(RawVideo {
    video_id:      row.get(base)?,
    owner_id:      row.get(base + 1)?,
    title:         row.get(base + 2)?,
    description:   row.get(base + 3)?,
    video_url:     row.get(base + 4)?,
    thumbnail_url: row.get(base + 5)?,
    duration_secs: row.get(base + 6)?,
    views:         row.get(base + 7)?,
    is_published:  row.get(base + 8)?,
    created_at:    row.get(base + 9)?,
    updated_at:    row.get(base + 10)?,
  })
}

impl RawVideo {
  pub fn into_video(self) -> Result<Video> {
    Ok(Video {
      video_id:      decode_uuid(&self.video_id)?,
      owner_id:      decode_uuid(&self.owner_id)?,
      title:         self.title,
      description:   self.description,
      video_url:     self.video_url,
      thumbnail_url: self.thumbnail_url,
      duration_secs: self.duration_secs,
      views:         self.views,
      is_published:  self.is_published,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// A video row joined with its owner's profile columns.
pub struct RawVideoView {
  pub video: RawVideo,
  pub owner: RawOwnerProfile,
}

impl RawVideoView {
  pub fn into_view(self) -> Result<VideoView> {
    Ok(VideoView {
      video: self.video.into_video()?,
      owner: self.owner.into_profile()?,
    })
  }
}

/// A joined watch-history row: video + owner + watched_at.
pub struct RawWatchEntry {
  pub view:       RawVideoView,
  pub watched_at: String,
}

impl RawWatchEntry {
  pub fn into_entry(self) -> Result<WatchEntry> {
    Ok(WatchEntry {
      view:       self.view.into_view()?,
      watched_at: decode_dt(&self.watched_at)?,
    })
  }
}

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub video_id:   String,
  pub owner_id:   String,
  pub content:    String,
  pub created_at: String,
  pub updated_at: String,
}

/// Column list matching [`read_comment`], prefixed with the `c` alias.
pub const COMMENT_COLS: &str =
  "c.comment_id, c.video_id, c.owner_id, c.content, c.created_at, c.updated_at";

pub fn read_comment(
  row: &rusqlite::Row,
  base: usize,
) -> rusqlite::Result<RawComment> {
  Ok(RawComment {
    comment_id: row.get(base)?,
    video_id:   row.get(base + 1)?,
    owner_id:   row.get(base + 2)?,
    content:    row.get(base + 3)?,
    created_at: row.get(base + 4)?,
    updated_at: row.get(base + 5)?,
  })
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      video_id:   decode_uuid(&self.video_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawCommentView {
  pub comment: RawComment,
  pub owner:   RawOwnerProfile,
}

impl RawCommentView {
  pub fn into_view(self) -> Result<CommentView> {
    Ok(CommentView {
      comment: self.comment.into_comment()?,
      owner:   self.owner.into_profile()?,
    })
  }
}

/// Raw strings read directly from a `tweets` row.
pub struct RawTweet {
  pub tweet_id:   String,
  pub owner_id:   String,
  pub content:    String,
  pub created_at: String,
  pub updated_at: String,
}

/// Column list matching [`read_tweet`], prefixed with the `t` alias.
pub const TWEET_COLS: &str =
  "t.tweet_id, t.owner_id, t.content, t.created_at, t.updated_at";

pub fn read_tweet(row: &rusqlite::Row, base: usize) -> rusqlite::Result<RawTweet> {
  Ok(RawTweet {
    tweet_id:   row.get(base)?,
    owner_id:   row.get(base + 1)?,
    content:    row.get(base + 2)?,
    created_at: row.get(base + 3)?,
    updated_at: row.get(base + 4)?,
  })
}

impl RawTweet {
  pub fn into_tweet(self) -> Result<Tweet> {
    Ok(Tweet {
      tweet_id:   decode_uuid(&self.tweet_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawTweetView {
  pub tweet: RawTweet,
  pub owner: RawOwnerProfile,
}

impl RawTweetView {
  pub fn into_view(self) -> Result<TweetView> {
    Ok(TweetView {
      tweet: self.tweet.into_tweet()?,
      owner: self.owner.into_profile()?,
    })
  }
}

/// Raw strings read directly from a `playlists` row.
pub struct RawPlaylist {
  pub playlist_id: String,
  pub owner_id:    String,
  pub name:        String,
  pub description: String,
  pub created_at:  String,
  pub updated_at:  String,
}

/// Column list matching [`read_playlist`], prefixed with the `p` alias.
pub const PLAYLIST_COLS: &str =
  "p.playlist_id, p.owner_id, p.name, p.description, p.created_at, p.updated_at";

pub fn read_playlist(
  row: &rusqlite::Row,
  base: usize,
) -> rusqlite::Result<RawPlaylist> {
  Ok(RawPlaylist {
    playlist_id: row.get(base)?,
    owner_id:    row.get(base + 1)?,
    name:        row.get(base + 2)?,
    description: row.get(base + 3)?,
    created_at:  row.get(base + 4)?,
    updated_at:  row.get(base + 5)?,
  })
}

impl RawPlaylist {
  pub fn into_playlist(self) -> Result<Playlist> {
    Ok(Playlist {
      playlist_id: decode_uuid(&self.playlist_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// A subscription listing row: the counterpart profile plus when the
/// subscription was created.
pub struct RawSubscriptionEntry {
  pub profile:       RawOwnerProfile,
  pub subscribed_at: String,
}

impl RawSubscriptionEntry {
  pub fn into_entry(self) -> Result<SubscriptionEntry> {
    Ok(SubscriptionEntry {
      profile:       self.profile.into_profile()?,
      subscribed_at: decode_dt(&self.subscribed_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::like_pattern;

  #[test]
  fn like_pattern_is_unanchored() {
    assert_eq!(like_pattern("cats"), "%cats%");
  }

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
    assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
  }
}
