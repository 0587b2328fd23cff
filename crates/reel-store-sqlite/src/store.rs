//! [`SqliteStore`] — the SQLite implementation of [`MediaStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use reel_core::{
  comment::{Comment, CommentView, NewComment},
  page::{Page, PageRequest, SortDirection, VideoQuery, VideoSortKey},
  playlist::{NewPlaylist, Playlist, PlaylistView},
  relation::{LikeTarget, SubscriptionEntry, ToggleState},
  store::MediaStore,
  tweet::{NewTweet, Tweet, TweetView},
  user::{ChannelProfile, ChannelStats, NewUser, User, UserRecord},
  video::{NewVideo, Video, VideoView, WatchEntry},
};

use crate::{
  encode::{
    COMMENT_COLS, PLAYLIST_COLS, RawComment, RawCommentView, RawPlaylist,
    RawSubscriptionEntry, RawTweet, RawTweetView, RawUser, RawUserRecord,
    RawVideo, RawVideoView, RawWatchEntry, TWEET_COLS, USER_COLS, VIDEO_COLS,
    encode_dt, encode_uuid, like_pattern, read_comment, read_owner,
    read_playlist, read_tweet, read_user, read_video,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Owner profile columns appended after a content entity's own columns.
const OWNER_COLS: &str = "u.user_id, u.username, u.full_name, u.avatar_url";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Reel media store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// for one store run serialised on the connection's worker thread, so the
/// multi-statement operations below (toggles, view counting, cascading
/// deletes) are atomic with respect to each other; each additionally runs
/// inside an explicit transaction so a crash cannot leave a half-applied
/// flip.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one video row by id, any publication state.
  async fn fetch_video(&self, id: Uuid) -> Result<Option<Video>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawVideo> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {VIDEO_COLS} FROM videos v WHERE v.video_id = ?1"),
              rusqlite::params![id_str],
              |row| read_video(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVideo::into_video).transpose()
  }

  /// Flip one relation row inside a transaction: delete if present,
  /// insert if absent. The UNIQUE constraint on the tuple is the backstop
  /// that makes a racing double-insert collapse into one row.
  async fn toggle_relation(
    &self,
    delete_sql: &'static str,
    insert_sql: &'static str,
    a: String,
    b: String,
    c: Option<String>,
  ) -> Result<ToggleState> {
    let row_id = encode_uuid(Uuid::new_v4());
    let now = encode_dt(Utc::now());

    let state = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let deleted = match &c {
          Some(c) => tx.execute(delete_sql, rusqlite::params![a, b, c])?,
          None => tx.execute(delete_sql, rusqlite::params![a, b])?,
        };

        let state = if deleted > 0 {
          ToggleState::Off
        } else {
          match &c {
            Some(c) => {
              tx.execute(insert_sql, rusqlite::params![row_id, a, b, c, now])?
            }
            None => tx.execute(insert_sql, rusqlite::params![row_id, a, b, now])?,
          };
          ToggleState::On
        };

        tx.commit()?;
        Ok(state)
      })
      .await?;

    Ok(state)
  }

  /// Member videos of one playlist, insertion order. Takes the caller's
  /// connection so it also works inside a transaction.
  fn playlist_videos(
    conn: &rusqlite::Connection,
    playlist_id: &str,
  ) -> rusqlite::Result<Vec<RawVideo>> {
    let mut stmt = conn.prepare(&format!(
      "SELECT {VIDEO_COLS}
       FROM playlist_videos pv
       JOIN videos v ON v.video_id = pv.video_id
       WHERE pv.playlist_id = ?1
       ORDER BY pv.added_at, v.video_id"
    ))?;
    stmt
      .query_map(rusqlite::params![playlist_id], |row| read_video(row, 0))?
      .collect()
  }

  fn playlist_view(
    conn: &rusqlite::Connection,
    id_str: &str,
  ) -> rusqlite::Result<Option<(RawPlaylist, Vec<RawVideo>)>> {
    let playlist = conn
      .query_row(
        &format!("SELECT {PLAYLIST_COLS} FROM playlists p WHERE p.playlist_id = ?1"),
        rusqlite::params![id_str],
        |row| read_playlist(row, 0),
      )
      .optional()?;

    match playlist {
      Some(p) => {
        let videos = Self::playlist_videos(conn, id_str)?;
        Ok(Some((p, videos)))
      }
      None => Ok(None),
    }
  }

  fn assemble_playlist_view(
    raw: (RawPlaylist, Vec<RawVideo>),
  ) -> Result<PlaylistView> {
    let (playlist, videos) = raw;
    Ok(PlaylistView {
      playlist: playlist.into_playlist()?,
      videos:   videos
        .into_iter()
        .map(RawVideo::into_video)
        .collect::<Result<_>>()?,
    })
  }
}

// ─── MediaStore impl ─────────────────────────────────────────────────────────

impl MediaStore for SqliteStore {
  type Error = Error;

  // ── Users ──────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let now = Utc::now();
    let user = User {
      user_id:         Uuid::new_v4(),
      username:        input.username,
      email:           input.email,
      full_name:       input.full_name,
      avatar_url:      input.avatar_url,
      cover_image_url: input.cover_image_url,
      created_at:      now,
      updated_at:      now,
    };

    let id_str   = encode_uuid(user.user_id);
    let username = user.username.clone();
    let email    = user.email.clone();
    let name     = user.full_name.clone();
    let hash     = input.password_hash;
    let avatar   = user.avatar_url.clone();
    let cover    = user.cover_image_url.clone();
    let at_str   = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, username, email, full_name, password_hash,
             avatar_url, cover_image_url, refresh_token, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?8)",
          rusqlite::params![id_str, username, email, name, hash, avatar, cover, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              |row| read_user(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_login(&self, identity: &str) -> Result<Option<UserRecord>> {
    let identity = identity.to_owned();

    let raw: Option<RawUserRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLS}, password_hash, refresh_token
                 FROM users WHERE username = ?1 OR email = ?1"
              ),
              rusqlite::params![identity],
              |row| {
                Ok(RawUserRecord {
                  user:          read_user(row, 0)?,
                  password_hash: row.get(8)?,
                  refresh_token: row.get(9)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUserRecord::into_record).transpose()
  }

  async fn get_user_record(&self, id: Uuid) -> Result<Option<UserRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUserRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLS}, password_hash, refresh_token
                 FROM users WHERE user_id = ?1"
              ),
              rusqlite::params![id_str],
              |row| {
                Ok(RawUserRecord {
                  user:          read_user(row, 0)?,
                  password_hash: row.get(8)?,
                  refresh_token: row.get(9)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUserRecord::into_record).transpose()
  }

  async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> Result<()> {
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET refresh_token = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, token],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn update_password_hash(&self, id: Uuid, password_hash: String) -> Result<()> {
    let id_str = encode_uuid(id);
    let now    = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE user_id = ?1",
          rusqlite::params![id_str, password_hash, now],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn update_avatar(&self, id: Uuid, avatar_url: String) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let now    = encode_dt(Utc::now());

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users SET avatar_url = ?2, updated_at = ?3 WHERE user_id = ?1",
          rusqlite::params![id_str, avatar_url, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              |row| read_user(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn update_cover_image(
    &self,
    id: Uuid,
    cover_image_url: String,
  ) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let now    = encode_dt(Utc::now());

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users SET cover_image_url = ?2, updated_at = ?3 WHERE user_id = ?1",
          rusqlite::params![id_str, cover_image_url, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              |row| read_user(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn channel_profile(
    &self,
    username: &str,
    viewer: Uuid,
  ) -> Result<Option<ChannelProfile>> {
    let username   = username.to_owned();
    let viewer_str = encode_uuid(viewer);

    let raw: Option<(RawUser, u64, u64, bool)> = self
      .conn
      .call(move |conn| {
        let user = conn
          .query_row(
            &format!("SELECT {USER_COLS} FROM users WHERE username = ?1"),
            rusqlite::params![username],
            |row| read_user(row, 0),
          )
          .optional()?;

        let user = match user {
          Some(u) => u,
          None => return Ok(None),
        };

        let channel_str = user.user_id.clone();

        let subscriber_count: u64 = conn.query_row(
          "SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1",
          rusqlite::params![channel_str],
          |r| r.get(0),
        )?;

        let subscribed_to_count: u64 = conn.query_row(
          "SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = ?1",
          rusqlite::params![channel_str],
          |r| r.get(0),
        )?;

        let is_subscribed: bool = conn.query_row(
          "SELECT EXISTS(
             SELECT 1 FROM subscriptions
             WHERE subscriber_id = ?1 AND channel_id = ?2
           )",
          rusqlite::params![viewer_str, channel_str],
          |r| r.get(0),
        )?;

        Ok(Some((user, subscriber_count, subscribed_to_count, is_subscribed)))
      })
      .await?;

    match raw {
      Some((user, subscriber_count, subscribed_to_count, is_subscribed)) => {
        Ok(Some(ChannelProfile {
          user: user.into_user()?,
          subscriber_count,
          subscribed_to_count,
          is_subscribed,
        }))
      }
      None => Ok(None),
    }
  }

  async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchEntry>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawWatchEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VIDEO_COLS}, {OWNER_COLS}, w.watched_at
           FROM watch_history w
           JOIN videos v ON v.video_id = w.video_id
           JOIN users u ON u.user_id = v.owner_id
           WHERE w.user_id = ?1
           ORDER BY w.watched_at DESC, v.video_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawWatchEntry {
              view:       RawVideoView {
                video: read_video(row, 0)?,
                owner: read_owner(row, 11)?,
              },
              watched_at: row.get(15)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWatchEntry::into_entry).collect()
  }

  async fn record_view(
    &self,
    user_id: Uuid,
    video_id: Uuid,
  ) -> Result<Option<(Video, bool)>> {
    let user_str  = encode_uuid(user_id);
    let video_str = encode_uuid(video_id);
    let now       = encode_dt(Utc::now());

    let raw: Option<(RawVideo, bool)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM videos WHERE video_id = ?1",
            rusqlite::params![video_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !exists {
          return Ok(None);
        }

        let inserted = tx.execute(
          "INSERT OR IGNORE INTO watch_history (user_id, video_id, watched_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_str, video_str, now],
        )?;

        if inserted > 0 {
          tx.execute(
            "UPDATE videos SET views = views + 1 WHERE video_id = ?1",
            rusqlite::params![video_str],
          )?;
        }

        let video = tx.query_row(
          &format!("SELECT {VIDEO_COLS} FROM videos v WHERE v.video_id = ?1"),
          rusqlite::params![video_str],
          |row| read_video(row, 0),
        )?;

        tx.commit()?;
        Ok(Some((video, inserted > 0)))
      })
      .await?;

    match raw {
      Some((video, counted)) => Ok(Some((video.into_video()?, counted))),
      None => Ok(None),
    }
  }

  // ── Videos ─────────────────────────────────────────────────────────────────

  async fn create_video(&self, input: NewVideo) -> Result<Video> {
    let now = Utc::now();
    let video = Video {
      video_id:      Uuid::new_v4(),
      owner_id:      input.owner_id,
      title:         input.title,
      description:   input.description,
      video_url:     input.video_url,
      thumbnail_url: input.thumbnail_url,
      duration_secs: input.duration_secs,
      views:         0,
      is_published:  true,
      created_at:    now,
      updated_at:    now,
    };

    let id_str    = encode_uuid(video.video_id);
    let owner_str = encode_uuid(video.owner_id);
    let title     = video.title.clone();
    let desc      = video.description.clone();
    let video_url = video.video_url.clone();
    let thumb_url = video.thumbnail_url.clone();
    let duration  = video.duration_secs;
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO videos (
             video_id, owner_id, title, description, video_url, thumbnail_url,
             duration_secs, views, is_published, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 1, ?8, ?8)",
          rusqlite::params![id_str, owner_str, title, desc, video_url, thumb_url, duration, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(video)
  }

  async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
    self.fetch_video(id).await
  }

  async fn get_video_with_owner(&self, id: Uuid) -> Result<Option<VideoView>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawVideoView> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {VIDEO_COLS}, {OWNER_COLS}
                 FROM videos v
                 JOIN users u ON u.user_id = v.owner_id
                 WHERE v.video_id = ?1 AND v.is_published = 1"
              ),
              rusqlite::params![id_str],
              |row| {
                Ok(RawVideoView {
                  video: read_video(row, 0)?,
                  owner: read_owner(row, 11)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVideoView::into_view).transpose()
  }

  async fn list_videos(&self, query: VideoQuery) -> Result<Page<VideoView>> {
    let owner_str = query.owner_id.map(encode_uuid);
    let pattern   = query.text.as_deref().map(like_pattern);
    let limit     = i64::from(query.page.limit());
    let offset    = query.page.offset() as i64;

    // Null-tolerant predicates keep the SQL static; the allow-listed sort
    // key is the only interpolated fragment and never caller text.
    let order_col = match query.sort_key {
      VideoSortKey::CreatedAt => "v.created_at",
      VideoSortKey::Views => "v.views",
      VideoSortKey::Duration => "v.duration_secs",
      VideoSortKey::Title => "v.title",
    };
    let order_dir = match query.direction {
      SortDirection::Asc => "ASC",
      SortDirection::Desc => "DESC",
    };

    const WHERE: &str = "v.is_published = 1
        AND (?1 IS NULL OR v.owner_id = ?1)
        AND (?2 IS NULL
             OR v.title LIKE ?2 ESCAPE '\\'
             OR v.description LIKE ?2 ESCAPE '\\')";

    let (total, raws): (u64, Vec<RawVideoView>) = self
      .conn
      .call(move |conn| {
        let total: u64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM videos v WHERE {WHERE}"),
          rusqlite::params![owner_str.as_deref(), pattern.as_deref()],
          |r| r.get(0),
        )?;

        let sql = format!(
          "SELECT {VIDEO_COLS}, {OWNER_COLS}
           FROM videos v
           JOIN users u ON u.user_id = v.owner_id
           WHERE {WHERE}
           ORDER BY {order_col} {order_dir}, v.video_id {order_dir}
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str.as_deref(), pattern.as_deref(), limit, offset],
            |row| {
              Ok(RawVideoView {
                video: read_video(row, 0)?,
                owner: read_owner(row, 11)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawVideoView::into_view)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(items, total, query.page))
  }

  async fn update_video_details(
    &self,
    id: Uuid,
    title: String,
    description: String,
  ) -> Result<Option<Video>> {
    let id_str = encode_uuid(id);
    let now    = encode_dt(Utc::now());

    let raw: Option<RawVideo> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE videos SET title = ?2, description = ?3, updated_at = ?4
           WHERE video_id = ?1",
          rusqlite::params![id_str, title, description, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {VIDEO_COLS} FROM videos v WHERE v.video_id = ?1"),
              rusqlite::params![id_str],
              |row| read_video(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVideo::into_video).transpose()
  }

  async fn update_video_thumbnail(
    &self,
    id: Uuid,
    thumbnail_url: String,
  ) -> Result<Option<Video>> {
    let id_str = encode_uuid(id);
    let now    = encode_dt(Utc::now());

    let raw: Option<RawVideo> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE videos SET thumbnail_url = ?2, updated_at = ?3 WHERE video_id = ?1",
          rusqlite::params![id_str, thumbnail_url, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {VIDEO_COLS} FROM videos v WHERE v.video_id = ?1"),
              rusqlite::params![id_str],
              |row| read_video(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVideo::into_video).transpose()
  }

  async fn toggle_publish(&self, id: Uuid) -> Result<Option<Video>> {
    let id_str = encode_uuid(id);
    let now    = encode_dt(Utc::now());

    let raw: Option<RawVideo> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE videos SET is_published = 1 - is_published, updated_at = ?2
           WHERE video_id = ?1",
          rusqlite::params![id_str, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {VIDEO_COLS} FROM videos v WHERE v.video_id = ?1"),
              rusqlite::params![id_str],
              |row| read_video(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVideo::into_video).transpose()
  }

  async fn delete_video(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Like rows are polymorphic and carry no FK, so clear them by hand:
        // first the likes on this video's comments, then on the video
        // itself. The FK cascade handles comments, playlist memberships
        // and watch-history rows when the video row goes.
        tx.execute(
          "DELETE FROM likes
           WHERE target_kind = 'comment'
             AND target_id IN (SELECT comment_id FROM comments WHERE video_id = ?1)",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM likes WHERE target_kind = 'video' AND target_id = ?1",
          rusqlite::params![id_str],
        )?;
        let deleted = tx.execute(
          "DELETE FROM videos WHERE video_id = ?1",
          rusqlite::params![id_str],
        )?;

        tx.commit()?;
        Ok(deleted > 0)
      })
      .await?;

    Ok(deleted)
  }

  async fn videos_by_owner(&self, owner_id: Uuid) -> Result<Vec<Video>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawVideo> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VIDEO_COLS} FROM videos v
           WHERE v.owner_id = ?1
           ORDER BY v.created_at DESC, v.video_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], |row| read_video(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVideo::into_video).collect()
  }

  async fn channel_stats(&self, owner_id: Uuid) -> Result<ChannelStats> {
    let owner_str = encode_uuid(owner_id);

    let stats = self
      .conn
      .call(move |conn| {
        let total_likes: u64 = conn.query_row(
          "SELECT COUNT(*) FROM likes WHERE actor_id = ?1",
          rusqlite::params![owner_str],
          |r| r.get(0),
        )?;

        let total_subscribers: u64 = conn.query_row(
          "SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1",
          rusqlite::params![owner_str],
          |r| r.get(0),
        )?;

        let (total_videos, total_views): (u64, u64) = conn.query_row(
          "SELECT COUNT(*), COALESCE(SUM(views), 0) FROM videos WHERE owner_id = ?1",
          rusqlite::params![owner_str],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        Ok(ChannelStats {
          total_likes,
          total_subscribers,
          total_videos,
          total_views,
        })
      })
      .await?;

    Ok(stats)
  }

  // ── Relation toggles ───────────────────────────────────────────────────────

  async fn toggle_like(
    &self,
    actor_id: Uuid,
    target_kind: LikeTarget,
    target_id: Uuid,
  ) -> Result<ToggleState> {
    self
      .toggle_relation(
        "DELETE FROM likes
         WHERE actor_id = ?1 AND target_kind = ?2 AND target_id = ?3",
        "INSERT OR IGNORE INTO likes
           (like_id, actor_id, target_kind, target_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        encode_uuid(actor_id),
        target_kind.discriminant().to_owned(),
        Some(encode_uuid(target_id)),
      )
      .await
  }

  async fn toggle_subscription(
    &self,
    subscriber_id: Uuid,
    channel_id: Uuid,
  ) -> Result<ToggleState> {
    self
      .toggle_relation(
        "DELETE FROM subscriptions
         WHERE subscriber_id = ?1 AND channel_id = ?2",
        "INSERT OR IGNORE INTO subscriptions
           (subscription_id, subscriber_id, channel_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        encode_uuid(subscriber_id),
        encode_uuid(channel_id),
        None,
      )
      .await
  }

  async fn liked_videos(&self, actor_id: Uuid) -> Result<Vec<VideoView>> {
    let actor_str = encode_uuid(actor_id);

    let raws: Vec<RawVideoView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VIDEO_COLS}, {OWNER_COLS}
           FROM likes l
           JOIN videos v ON v.video_id = l.target_id
           JOIN users u ON u.user_id = v.owner_id
           WHERE l.actor_id = ?1
             AND l.target_kind = 'video'
             AND v.is_published = 1
           ORDER BY l.created_at DESC, v.video_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![actor_str], |row| {
            Ok(RawVideoView {
              video: read_video(row, 0)?,
              owner: read_owner(row, 11)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVideoView::into_view).collect()
  }

  async fn liked_tweets(&self, actor_id: Uuid) -> Result<Vec<TweetView>> {
    let actor_str = encode_uuid(actor_id);

    let raws: Vec<RawTweetView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TWEET_COLS}, {OWNER_COLS}
           FROM likes l
           JOIN tweets t ON t.tweet_id = l.target_id
           JOIN users u ON u.user_id = t.owner_id
           WHERE l.actor_id = ?1 AND l.target_kind = 'tweet'
           ORDER BY l.created_at DESC, t.tweet_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![actor_str], |row| {
            Ok(RawTweetView {
              tweet: read_tweet(row, 0)?,
              owner: read_owner(row, 5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTweetView::into_view).collect()
  }

  async fn channel_subscribers(
    &self,
    channel_id: Uuid,
  ) -> Result<Vec<SubscriptionEntry>> {
    let channel_str = encode_uuid(channel_id);

    let raws: Vec<RawSubscriptionEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {OWNER_COLS}, s.created_at
           FROM subscriptions s
           JOIN users u ON u.user_id = s.subscriber_id
           WHERE s.channel_id = ?1
           ORDER BY s.created_at DESC, u.user_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![channel_str], |row| {
            Ok(RawSubscriptionEntry {
              profile:       read_owner(row, 0)?,
              subscribed_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubscriptionEntry::into_entry)
      .collect()
  }

  async fn subscribed_channels(
    &self,
    subscriber_id: Uuid,
  ) -> Result<Vec<SubscriptionEntry>> {
    let sub_str = encode_uuid(subscriber_id);

    let raws: Vec<RawSubscriptionEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {OWNER_COLS}, s.created_at
           FROM subscriptions s
           JOIN users u ON u.user_id = s.channel_id
           WHERE s.subscriber_id = ?1
           ORDER BY s.created_at DESC, u.user_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![sub_str], |row| {
            Ok(RawSubscriptionEntry {
              profile:       read_owner(row, 0)?,
              subscribed_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubscriptionEntry::into_entry)
      .collect()
  }

  // ── Comments ───────────────────────────────────────────────────────────────

  async fn create_comment(&self, input: NewComment) -> Result<Comment> {
    let now = Utc::now();
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      video_id:   input.video_id,
      owner_id:   input.owner_id,
      content:    input.content,
      created_at: now,
      updated_at: now,
    };

    let id_str    = encode_uuid(comment.comment_id);
    let video_str = encode_uuid(comment.video_id);
    let owner_str = encode_uuid(comment.owner_id);
    let content   = comment.content.clone();
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, video_id, owner_id, content, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, video_str, owner_str, content, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMMENT_COLS} FROM comments c WHERE c.comment_id = ?1"),
              rusqlite::params![id_str],
              |row| read_comment(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn comments_for_video(
    &self,
    video_id: Uuid,
    page: PageRequest,
  ) -> Result<Page<CommentView>> {
    let video_str = encode_uuid(video_id);
    let limit     = i64::from(page.limit());
    let offset    = page.offset() as i64;

    let (total, raws): (u64, Vec<RawCommentView>) = self
      .conn
      .call(move |conn| {
        let total: u64 = conn.query_row(
          "SELECT COUNT(*) FROM comments WHERE video_id = ?1",
          rusqlite::params![video_str],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLS}, {OWNER_COLS}
           FROM comments c
           JOIN users u ON u.user_id = c.owner_id
           WHERE c.video_id = ?1
           ORDER BY c.created_at DESC, c.comment_id
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![video_str, limit, offset], |row| {
            Ok(RawCommentView {
              comment: read_comment(row, 0)?,
              owner:   read_owner(row, 6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawCommentView::into_view)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(items, total, page))
  }

  async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);
    let now    = encode_dt(Utc::now());

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE comments SET content = ?2, updated_at = ?3 WHERE comment_id = ?1",
          rusqlite::params![id_str, content, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMMENT_COLS} FROM comments c WHERE c.comment_id = ?1"),
              rusqlite::params![id_str],
              |row| read_comment(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn delete_comment(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM likes WHERE target_kind = 'comment' AND target_id = ?1",
          rusqlite::params![id_str],
        )?;
        let deleted = tx.execute(
          "DELETE FROM comments WHERE comment_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
      })
      .await?;

    Ok(deleted)
  }

  // ── Tweets ─────────────────────────────────────────────────────────────────

  async fn create_tweet(&self, input: NewTweet) -> Result<Tweet> {
    let now = Utc::now();
    let tweet = Tweet {
      tweet_id:   Uuid::new_v4(),
      owner_id:   input.owner_id,
      content:    input.content,
      created_at: now,
      updated_at: now,
    };

    let id_str    = encode_uuid(tweet.tweet_id);
    let owner_str = encode_uuid(tweet.owner_id);
    let content   = tweet.content.clone();
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tweets (tweet_id, owner_id, content, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![id_str, owner_str, content, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(tweet)
  }

  async fn get_tweet(&self, id: Uuid) -> Result<Option<Tweet>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTweet> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TWEET_COLS} FROM tweets t WHERE t.tweet_id = ?1"),
              rusqlite::params![id_str],
              |row| read_tweet(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTweet::into_tweet).transpose()
  }

  async fn tweets_by_user(&self, owner_id: Uuid) -> Result<Vec<TweetView>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawTweetView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TWEET_COLS}, {OWNER_COLS}
           FROM tweets t
           JOIN users u ON u.user_id = t.owner_id
           WHERE t.owner_id = ?1
           ORDER BY t.created_at DESC, t.tweet_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], |row| {
            Ok(RawTweetView {
              tweet: read_tweet(row, 0)?,
              owner: read_owner(row, 5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTweetView::into_view).collect()
  }

  async fn update_tweet(&self, id: Uuid, content: String) -> Result<Option<Tweet>> {
    let id_str = encode_uuid(id);
    let now    = encode_dt(Utc::now());

    let raw: Option<RawTweet> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE tweets SET content = ?2, updated_at = ?3 WHERE tweet_id = ?1",
          rusqlite::params![id_str, content, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {TWEET_COLS} FROM tweets t WHERE t.tweet_id = ?1"),
              rusqlite::params![id_str],
              |row| read_tweet(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTweet::into_tweet).transpose()
  }

  async fn delete_tweet(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM likes WHERE target_kind = 'tweet' AND target_id = ?1",
          rusqlite::params![id_str],
        )?;
        let deleted = tx.execute(
          "DELETE FROM tweets WHERE tweet_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
      })
      .await?;

    Ok(deleted)
  }

  // ── Playlists ──────────────────────────────────────────────────────────────

  async fn create_playlist(&self, input: NewPlaylist) -> Result<Playlist> {
    let now = Utc::now();
    let playlist = Playlist {
      playlist_id: Uuid::new_v4(),
      owner_id:    input.owner_id,
      name:        input.name,
      description: input.description,
      created_at:  now,
      updated_at:  now,
    };

    let id_str    = encode_uuid(playlist.playlist_id);
    let owner_str = encode_uuid(playlist.owner_id);
    let name      = playlist.name.clone();
    let desc      = playlist.description.clone();
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO playlists (playlist_id, owner_id, name, description, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, owner_str, name, desc, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(playlist)
  }

  async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPlaylist> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PLAYLIST_COLS} FROM playlists p WHERE p.playlist_id = ?1"),
              rusqlite::params![id_str],
              |row| read_playlist(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlaylist::into_playlist).transpose()
  }

  async fn get_playlist_view(&self, id: Uuid) -> Result<Option<PlaylistView>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(Self::playlist_view(conn, &id_str)?))
      .await?;

    raw.map(Self::assemble_playlist_view).transpose()
  }

  async fn playlists_by_owner(&self, owner_id: Uuid) -> Result<Vec<PlaylistView>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<(RawPlaylist, Vec<RawVideo>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PLAYLIST_COLS} FROM playlists p
           WHERE p.owner_id = ?1
           ORDER BY p.created_at DESC, p.playlist_id"
        ))?;
        let playlists = stmt
          .query_map(rusqlite::params![owner_str], |row| read_playlist(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(playlists.len());
        for playlist in playlists {
          let videos = Self::playlist_videos(conn, &playlist.playlist_id)?;
          out.push((playlist, videos));
        }
        Ok(out)
      })
      .await?;

    raws.into_iter().map(Self::assemble_playlist_view).collect()
  }

  async fn update_playlist(
    &self,
    id: Uuid,
    name: String,
    description: String,
  ) -> Result<Option<Playlist>> {
    let id_str = encode_uuid(id);
    let now    = encode_dt(Utc::now());

    let raw: Option<RawPlaylist> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE playlists SET name = ?2, description = ?3, updated_at = ?4
           WHERE playlist_id = ?1",
          rusqlite::params![id_str, name, description, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {PLAYLIST_COLS} FROM playlists p WHERE p.playlist_id = ?1"),
              rusqlite::params![id_str],
              |row| read_playlist(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlaylist::into_playlist).transpose()
  }

  async fn delete_playlist(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        // Memberships go with the playlist via FK cascade.
        let deleted = conn.execute(
          "DELETE FROM playlists WHERE playlist_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(deleted > 0)
      })
      .await?;

    Ok(deleted)
  }

  async fn add_playlist_video(
    &self,
    playlist_id: Uuid,
    video_id: Uuid,
  ) -> Result<Option<PlaylistView>> {
    let playlist_str = encode_uuid(playlist_id);
    let video_str    = encode_uuid(video_id);
    let now          = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM playlists WHERE playlist_id = ?1",
            rusqlite::params![playlist_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        tx.execute(
          "INSERT OR IGNORE INTO playlist_videos (playlist_id, video_id, added_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![playlist_str, video_str, now],
        )?;

        let view = Self::playlist_view(&tx, &playlist_str)?;
        tx.commit()?;
        Ok(view)
      })
      .await?;

    raw.map(Self::assemble_playlist_view).transpose()
  }

  async fn remove_playlist_video(
    &self,
    playlist_id: Uuid,
    video_id: Uuid,
  ) -> Result<Option<PlaylistView>> {
    let playlist_str = encode_uuid(playlist_id);
    let video_str    = encode_uuid(video_id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM playlists WHERE playlist_id = ?1",
            rusqlite::params![playlist_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        tx.execute(
          "DELETE FROM playlist_videos WHERE playlist_id = ?1 AND video_id = ?2",
          rusqlite::params![playlist_str, video_str],
        )?;

        let view = Self::playlist_view(&tx, &playlist_str)?;
        tx.commit()?;
        Ok(view)
      })
      .await?;

    raw.map(Self::assemble_playlist_view).transpose()
  }
}
