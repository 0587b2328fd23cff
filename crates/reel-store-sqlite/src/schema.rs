//! SQL schema for the Reel SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id         TEXT PRIMARY KEY,
    username        TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL UNIQUE,
    full_name       TEXT NOT NULL,
    password_hash   TEXT NOT NULL,   -- argon2 PHC string
    avatar_url      TEXT NOT NULL,
    cover_image_url TEXT,
    refresh_token   TEXT,            -- single active refresh token, or NULL
    created_at      TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS videos (
    video_id      TEXT PRIMARY KEY,
    owner_id      TEXT NOT NULL REFERENCES users(user_id),
    title         TEXT NOT NULL,
    description   TEXT NOT NULL,
    video_url     TEXT NOT NULL,
    thumbnail_url TEXT NOT NULL,
    duration_secs REAL NOT NULL DEFAULT 0,
    views         INTEGER NOT NULL DEFAULT 0,
    is_published  INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    video_id   TEXT NOT NULL REFERENCES videos(video_id) ON DELETE CASCADE,
    owner_id   TEXT NOT NULL REFERENCES users(user_id),
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tweets (
    tweet_id   TEXT PRIMARY KEY,
    owner_id   TEXT NOT NULL REFERENCES users(user_id),
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS playlists (
    playlist_id TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES users(user_id),
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Membership relation; a video appears in a playlist at most once.
CREATE TABLE IF NOT EXISTS playlist_videos (
    playlist_id TEXT NOT NULL REFERENCES playlists(playlist_id) ON DELETE CASCADE,
    video_id    TEXT NOT NULL REFERENCES videos(video_id) ON DELETE CASCADE,
    added_at    TEXT NOT NULL,
    PRIMARY KEY (playlist_id, video_id)
);

-- One row per (actor, kind, target); existence encodes the liked state.
-- target_id is polymorphic over videos/comments/tweets, so it carries no
-- foreign key; the owning entity's delete clears its like rows.
CREATE TABLE IF NOT EXISTS likes (
    like_id     TEXT PRIMARY KEY,
    actor_id    TEXT NOT NULL REFERENCES users(user_id),
    target_kind TEXT NOT NULL,   -- 'video' | 'comment' | 'tweet'
    target_id   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (actor_id, target_kind, target_id)
);

-- One row per (subscriber, channel); existence encodes the subscribed state.
CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id TEXT PRIMARY KEY,
    subscriber_id   TEXT NOT NULL REFERENCES users(user_id),
    channel_id      TEXT NOT NULL REFERENCES users(user_id),
    created_at      TEXT NOT NULL,
    UNIQUE (subscriber_id, channel_id)
);

-- The primary key doubles as the existence check that makes view counting
-- idempotent per (user, video).
CREATE TABLE IF NOT EXISTS watch_history (
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    video_id   TEXT NOT NULL REFERENCES videos(video_id) ON DELETE CASCADE,
    watched_at TEXT NOT NULL,
    PRIMARY KEY (user_id, video_id)
);

CREATE INDEX IF NOT EXISTS videos_owner_idx        ON videos(owner_id);
CREATE INDEX IF NOT EXISTS videos_created_idx      ON videos(created_at);
CREATE INDEX IF NOT EXISTS comments_video_idx      ON comments(video_id);
CREATE INDEX IF NOT EXISTS tweets_owner_idx        ON tweets(owner_id);
CREATE INDEX IF NOT EXISTS playlists_owner_idx     ON playlists(owner_id);
CREATE INDEX IF NOT EXISTS likes_target_idx        ON likes(target_kind, target_id);
CREATE INDEX IF NOT EXISTS subscriptions_chan_idx  ON subscriptions(channel_id);

PRAGMA user_version = 1;
";
